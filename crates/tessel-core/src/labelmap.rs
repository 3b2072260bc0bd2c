use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array2;

use crate::error::{Result, TesselError};

/// An owned superpixel label grid, decoupled from the segmenter that
/// produced it. Serializes to a plain text format: a `width height` header
/// line, then one line of space-separated label ids per image row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    labels: Array2<u32>,
}

impl LabelMap {
    pub fn new(labels: Array2<u32>) -> Self {
        Self { labels }
    }

    pub fn width(&self) -> usize {
        self.labels.ncols()
    }

    pub fn height(&self) -> usize {
        self.labels.nrows()
    }

    pub fn label(&self, x: usize, y: usize) -> u32 {
        self.labels[(y, x)]
    }

    pub fn labels(&self) -> &Array2<u32> {
        &self.labels
    }

    /// Number of distinct labels actually present in the grid.
    pub fn count_distinct(&self) -> usize {
        let max = self.labels.iter().copied().max().unwrap_or(0) as usize;
        let mut seen = vec![false; max + 1];
        for &label in self.labels.iter() {
            seen[label as usize] = true;
        }
        seen.iter().filter(|&&s| s).count()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} {}\n", self.width(), self.height()));
        for row in self.labels.rows() {
            let line = row
                .iter()
                .map(|label| label.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| TesselError::InvalidLabelMap("empty input".into()))?;
        let mut parts = header.split_whitespace();
        let width = parse_dimension(parts.next(), "width")?;
        let height = parse_dimension(parts.next(), "height")?;
        if parts.next().is_some() {
            return Err(TesselError::InvalidLabelMap(
                "header has more than two fields".into(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(TesselError::InvalidLabelMap(format!(
                "degenerate dimensions {width}x{height}"
            )));
        }

        let mut labels = Array2::<u32>::zeros((height, width));
        for y in 0..height {
            let line = lines.next().ok_or_else(|| {
                TesselError::InvalidLabelMap(format!("expected {height} rows, got {y}"))
            })?;
            let mut x = 0;
            for token in line.split_whitespace() {
                if x >= width {
                    return Err(TesselError::InvalidLabelMap(format!(
                        "row {y} has more than {width} labels"
                    )));
                }
                let label = token.parse::<u32>().map_err(|_| {
                    TesselError::InvalidLabelMap(format!("bad label {token:?} in row {y}"))
                })?;
                labels[(y, x)] = label;
                x += 1;
            }
            if x != width {
                return Err(TesselError::InvalidLabelMap(format!(
                    "row {y} has {x} labels, expected {width}"
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn write_text(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.to_text().as_bytes())?;
        Ok(())
    }

    pub fn read_text(path: impl AsRef<Path>) -> Result<Self> {
        let mut text = String::new();
        BufReader::new(File::open(path)?).read_to_string(&mut text)?;
        Self::from_text(&text)
    }
}

fn parse_dimension(token: Option<&str>, name: &str) -> Result<usize> {
    let token =
        token.ok_or_else(|| TesselError::InvalidLabelMap(format!("header missing {name}")))?;
    token
        .parse::<usize>()
        .map_err(|_| TesselError::InvalidLabelMap(format!("bad {name} {token:?}")))
}
