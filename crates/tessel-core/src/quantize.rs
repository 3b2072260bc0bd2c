use image::RgbImage;
use ndarray::Array2;

use crate::config::ColorSpace;
use crate::consts::{CUTOFF_SAMPLE_STRIDE, CUTOFF_SENTINEL};

/// Per-pixel quantization result for one image: a joint histogram bin id and
/// a continuous 3-channel descriptor, both derived once at load time.
#[derive(Clone, Debug)]
pub struct QuantizedImage {
    /// Joint bin id per pixel, in `[0, bins^3)`. Shape = (height, width).
    pub bins: Array2<usize>,
    /// Continuous channel descriptor per pixel, each channel in ~[0, 1].
    pub descriptors: Array2<[f32; 3]>,
}

impl QuantizedImage {
    pub fn width(&self) -> usize {
        self.bins.ncols()
    }

    pub fn height(&self) -> usize {
        self.bins.nrows()
    }

    pub fn bin(&self, x: usize, y: usize) -> usize {
        self.bins[(y, x)]
    }

    pub fn descriptor(&self, x: usize, y: usize) -> [f32; 3] {
        self.descriptors[(y, x)]
    }
}

/// Color quantization strategy. Both variants map a raw RGB sample to a
/// (bin id, descriptor) pair and are pure once constructed; the Lab variant
/// carries per-image cutoff tables computed from the channel distributions.
#[derive(Clone, Debug)]
pub enum Quantizer {
    Hsv {
        bins: usize,
    },
    Lab {
        bins: usize,
        /// Ascending per-channel upper bin limits (L, a, b), one entry per bin.
        cutoffs: [Vec<f32>; 3],
    },
}

impl Quantizer {
    /// Build a quantizer for `image`. HSV needs no per-image state; Lab
    /// samples the image to place one cutoff at every `1/bins` quantile.
    pub fn new(color_space: ColorSpace, bins: usize, image: &RgbImage) -> Self {
        match color_space {
            ColorSpace::Hsv => Self::Hsv { bins },
            ColorSpace::Lab => Self::Lab {
                bins,
                cutoffs: lab_cutoffs(image, bins),
            },
        }
    }

    pub fn bins_per_channel(&self) -> usize {
        match self {
            Self::Hsv { bins } | Self::Lab { bins, .. } => *bins,
        }
    }

    /// Joint histogram size.
    pub fn bin_count(&self) -> usize {
        let b = self.bins_per_channel();
        b * b * b
    }

    /// Quantize one raw sample into (joint bin id, continuous descriptor).
    pub fn quantize(&self, rgb: [u8; 3]) -> (usize, [f32; 3]) {
        match self {
            Self::Hsv { bins } => {
                let [h, s, v] = rgb_to_hsv(rgb);
                let hbin = (h * *bins as f32) as usize;
                let mut sbin = (s * *bins as f32) as usize;
                let vbin = (v * *bins as f32) as usize;
                // S can reach exactly 1.0; fold it into the last bin.
                if sbin == *bins {
                    sbin -= 1;
                }
                (hbin + bins * (sbin + bins * vbin), [h, s, v])
            }
            Self::Lab { bins, cutoffs } => {
                let [l, a, b] = rgb_to_lab(rgb);
                let bin_l = channel_bin(&cutoffs[0], l);
                let bin_a = channel_bin(&cutoffs[1], a);
                let bin_b = channel_bin(&cutoffs[2], b);
                let descriptor = [l / 100.0, (a + 128.0) / 255.0, (b + 128.0) / 255.0];
                (bin_l + bins * bin_a + bins * bins * bin_b, descriptor)
            }
        }
    }

    /// Invert a (mean) descriptor back to RGB, for the mean-color map.
    pub fn descriptor_to_rgb(&self, c: [f32; 3]) -> [u8; 3] {
        match self {
            Self::Hsv { .. } => hsv_to_rgb(c),
            Self::Lab { .. } => {
                let l = 100.0 * c[0];
                let a = 255.0 * c[1] - 128.0;
                let b = 255.0 * c[2] - 128.0;
                lab_to_rgb(l, a, b)
            }
        }
    }
}

/// Quantize every pixel of `image`.
pub fn quantize_image(image: &RgbImage, quantizer: &Quantizer) -> QuantizedImage {
    let (w, h) = image.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut bins = Array2::<usize>::zeros((h, w));
    let mut descriptors = Array2::<[f32; 3]>::from_elem((h, w), [0.0; 3]);
    for y in 0..h {
        for x in 0..w {
            let p = image.get_pixel(x as u32, y as u32).0;
            let (bin, descriptor) = quantizer.quantize(p);
            bins[(y, x)] = bin;
            descriptors[(y, x)] = descriptor;
        }
    }
    QuantizedImage { bins, descriptors }
}

/// First cutoff index the value does not exceed. The last cutoff is a
/// sentinel above any attainable value, so the scan always terminates in
/// range.
fn channel_bin(cutoffs: &[f32], value: f32) -> usize {
    let mut bin = 0;
    while value > cutoffs[bin] {
        bin += 1;
    }
    bin
}

/// Per-channel quantile cutoffs from a stride-sampled Lab conversion of the
/// image: `cutoff[i-1]` is the `i/bins` quantile of the sampled channel.
fn lab_cutoffs(image: &RgbImage, bins: usize) -> [Vec<f32>; 3] {
    let (w, h) = image.dimensions();
    let mut samples: [Vec<f32>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for x in (0..w).step_by(CUTOFF_SAMPLE_STRIDE) {
        for y in (0..h).step_by(CUTOFF_SAMPLE_STRIDE) {
            let [l, a, b] = rgb_to_lab(image.get_pixel(x, y).0);
            samples[0].push(l);
            samples[1].push(a);
            samples[2].push(b);
        }
    }
    let count = samples[0].len();
    let mut cutoffs: [Vec<f32>; 3] = [
        vec![CUTOFF_SENTINEL; bins],
        vec![CUTOFF_SENTINEL; bins],
        vec![CUTOFF_SENTINEL; bins],
    ];
    for (channel, sample) in samples.iter_mut().enumerate() {
        sample.sort_by(|a, b| a.total_cmp(b));
        for i in 1..bins {
            let n = i * count / bins;
            cutoffs[channel][i - 1] = sample[n];
        }
    }
    cutoffs
}

fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [f32; 3] {
    let r = r as f32 / 256.0;
    let g = g as f32 / 256.0;
    let b = b as f32 / 256.0;

    let min_rgb = r.min(g.min(b));
    let max_rgb = r.max(g.max(b));
    let v = max_rgb;
    let delta = max_rgb - min_rgb;

    let mut h = 0.0;
    let mut s = 0.0;
    if delta > 0.0 && max_rgb > 0.0 {
        s = delta / max_rgb;
        if max_rgb == r {
            h = (g - b) / delta;
        } else if max_rgb == g {
            h = 2.0 + (b - r) / delta;
        } else {
            h = 4.0 + (r - g) / delta;
        }
    }
    h /= 6.0;
    if h < 0.0 {
        h += 1.0;
    }
    [h, s, v]
}

fn hsv_to_rgb([h, s, v]: [f32; 3]) -> [u8; 3] {
    let to_u8 = |c: f32| (c * 255.0).clamp(0.0, 255.0) as u8;
    if s <= 0.0 {
        let v = to_u8(v);
        return [v, v, v];
    }
    let h6 = (h * 6.0).rem_euclid(6.0);
    let sector = h6 as usize % 6;
    let f = h6 - sector as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [to_u8(r), to_u8(g), to_u8(b)]
}

fn rgb_to_lab([r, g, b]: [u8; 3]) -> [f32; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let mut x = 0.412453 * r + 0.357580 * g + 0.180423 * b;
    let mut y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let mut z = 0.019334 * r + 0.119193 * g + 0.950227 * b;

    x /= 255.0 * 0.950456;
    y /= 255.0;
    z /= 255.0 * 1.088754;

    let t = 0.008856;
    let f = |v: f32| {
        if v > t {
            v.powf(1.0 / 3.0)
        } else {
            7.787 * v + 16.0 / 116.0
        }
    };

    let fx = f(x);
    let fy = f(y);
    let fz = f(z);

    let l = if y > t {
        116.0 * y.powf(1.0 / 3.0) - 16.0
    } else {
        903.3 * y
    };
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);
    [l, a, b]
}

fn lab_to_rgb(l: f32, a: f32, b: f32) -> [u8; 3] {
    let t1 = 0.008856;
    let t2 = 0.206893;

    let mut fy = ((l + 16.0) / 116.0).powi(3);
    let yt = fy > t1;
    if !yt {
        fy = l / 903.3;
    }
    let y = fy;
    fy = if yt {
        fy.powf(1.0 / 3.0)
    } else {
        7.787 * fy + 16.0 / 116.0
    };

    let fx = a / 500.0 + fy;
    let x = if fx > t2 {
        fx.powi(3)
    } else {
        (fx - 16.0 / 116.0) / 7.787
    };

    let fz = fy - b / 200.0;
    let z = if fz > t2 {
        fz.powi(3)
    } else {
        (fz - 16.0 / 116.0) / 7.787
    };

    let x = x * 0.950456 * 255.0;
    let y = y * 255.0;
    let z = z * 1.088754 * 255.0;

    let clamp = |c: f32| c.clamp(0.0, 255.0) as u8;
    [
        clamp(3.240479 * x - 1.537150 * y - 0.498535 * z),
        clamp(-0.969256 * x + 1.875992 * y + 0.041556 * z),
        clamp(0.055648 * x - 0.204043 * y + 1.057311 * z),
    ]
}
