/// Boundary axis of a candidate move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which side of the boundary gives up its cell: `Forward` moves the
/// left/top cell, `Backward` the right/bottom one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    Forward,
    Backward,
}

/// Topology guard for a candidate move. `window` is the 3x3 label
/// neighborhood around the cell that would change owner, row-major. Returns
/// true when removing the center cell could split its region in two, in
/// which case the move must be vetoed.
///
/// The patterns are asymmetric on purpose: each (orientation, order) pair
/// only inspects the half of the neighborhood behind the move direction, so
/// a move vetoed from one side may be legal from the other. The surrounding
/// scans rely on that to keep boundaries mobile.
pub fn splits_region(window: &[u32; 9], orientation: Orientation, order: ScanOrder) -> bool {
    let [a11, a12, a13, a21, a22, a23, a31, a32, a33] = *window;
    match (orientation, order) {
        (Orientation::Horizontal, ScanOrder::Forward) => {
            (a22 != a21 && a22 == a12 && a22 == a32)
                || (a22 != a11 && a22 == a12 && a22 == a21)
                || (a22 != a31 && a22 == a32 && a22 == a21)
        }
        (Orientation::Horizontal, ScanOrder::Backward) => {
            (a22 != a23 && a22 == a12 && a22 == a32)
                || (a22 != a13 && a22 == a12 && a22 == a23)
                || (a22 != a33 && a22 == a32 && a22 == a23)
        }
        (Orientation::Vertical, ScanOrder::Forward) => {
            (a22 != a12 && a22 == a21 && a22 == a23)
                || (a22 != a11 && a22 == a21 && a22 == a12)
                || (a22 != a13 && a22 == a23 && a22 == a12)
        }
        (Orientation::Vertical, ScanOrder::Backward) => {
            (a22 != a32 && a22 == a21 && a22 == a23)
                || (a22 != a31 && a22 == a21 && a22 == a32)
                || (a22 != a33 && a22 == a23 && a22 == a32)
        }
    }
}
