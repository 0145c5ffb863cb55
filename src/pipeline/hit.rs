//! Pointer hit-testing over retained element regions.

use crate::foundation::core::ElementBox;

/// Canvas-space box an element occupied in the last draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HitRegion {
    /// Index into the draw list.
    pub index: usize,
    /// Absolute box including container offsets.
    pub bounds: ElementBox,
}

/// Topmost region containing `(x, y)` whose element accepts clicks.
///
/// Regions are stored in paint order, so the scan runs in reverse: the
/// last-painted (visually topmost) interactive element wins. Rotation is
/// ignored; the unrotated box is what gets tested.
pub(crate) fn topmost_hit(
    regions: &[HitRegion],
    x: f64,
    y: f64,
    accepts: impl Fn(usize) -> bool,
) -> Option<usize> {
    regions
        .iter()
        .rev()
        .find(|r| r.bounds.contains(x, y) && accepts(r.index))
        .map(|r| r.index)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/hit.rs"]
mod tests;
