//! Container-relative box resolution.
//!
//! Resolution order per axis: an explicit extent (`width`/`height`) always
//! wins; otherwise the extent fills the span left between the near and far
//! offsets. A far offset (`right`/`bottom`) only positions the box when the
//! near offset is absent. Every absent property defaults to the container
//! edge, so a fully-unset box collapses to the whole container.

use crate::config::model::{Axis, BoxProps, Dimension, FitMode, ImageConfig, LineConfig};
use crate::foundation::core::{ElementBox, Point, Size};

/// Resolve the six box properties to a concrete box inside `container`.
///
/// Coordinates are relative to the container origin. Non-finite or negative
/// extents sanitize to zero.
pub fn resolve_box(props: &BoxProps, container: Size) -> ElementBox {
    let resolve = |d: &Option<Dimension>, axis: Axis| d.as_ref().map(|d| d.resolve(container, axis));

    let top = resolve(&props.top, Axis::Vertical);
    let right = resolve(&props.right, Axis::Horizontal);
    let bottom = resolve(&props.bottom, Axis::Vertical);
    let left = resolve(&props.left, Axis::Horizontal);
    let width = resolve(&props.width, Axis::Horizontal);
    let height = resolve(&props.height, Axis::Vertical);

    let (x, w) = resolve_axis(left, right, width, container.width);
    let (y, h) = resolve_axis(top, bottom, height, container.height);
    ElementBox::new(x, y, w, h)
}

fn resolve_axis(near: Option<f64>, far: Option<f64>, extent: Option<f64>, span: f64) -> (f64, f64) {
    match extent {
        Some(e) => {
            let pos = match (near, far) {
                (Some(n), _) => n,
                (None, Some(f)) => span - f - e,
                (None, None) => 0.0,
            };
            (pos, e)
        }
        None => {
            let pos = near.unwrap_or(0.0);
            (pos, span - pos - far.unwrap_or(0.0))
        }
    }
}

/// Fully resolved drawing geometry for an image element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ImageGeometry {
    /// Destination box actually painted (differs from the element box under
    /// `aspectFit`).
    pub draw: ElementBox,
    /// Source crop window in natural pixels (tightened under `aspectFill`).
    pub crop: ElementBox,
}

/// Map the configured crop and fit mode onto concrete source/dest rects.
///
/// `bounds` is the element's resolved box, `natural` the decoded image size.
/// A degenerate crop or box yields an empty `draw` rect the renderer skips.
pub(crate) fn resolve_image_geometry(
    cfg: &ImageConfig,
    bounds: ElementBox,
    natural: Size,
) -> ImageGeometry {
    let cx = cfg.crop.x.unwrap_or(0.0).clamp(0.0, natural.width);
    let cy = cfg.crop.y.unwrap_or(0.0).clamp(0.0, natural.height);
    let cw = cfg
        .crop
        .width
        .unwrap_or(natural.width - cx)
        .clamp(0.0, natural.width - cx);
    let ch = cfg
        .crop
        .height
        .unwrap_or(natural.height - cy)
        .clamp(0.0, natural.height - cy);

    let mut crop = ElementBox::new(cx, cy, cw, ch);
    let mut draw = bounds;
    if crop.is_empty() || bounds.is_empty() {
        return ImageGeometry {
            draw: ElementBox::default(),
            crop,
        };
    }

    let box_ratio = bounds.width / bounds.height;
    let src_ratio = crop.width / crop.height;
    match cfg.mode {
        FitMode::ScaleToFill => {}
        FitMode::AspectFill => {
            // Tighten the source window to the box ratio, keeping its center.
            if src_ratio > box_ratio {
                let w = crop.height * box_ratio;
                crop.x += (crop.width - w) / 2.0;
                crop.width = w;
            } else {
                let h = crop.width / box_ratio;
                crop.y += (crop.height - h) / 2.0;
                crop.height = h;
            }
        }
        FitMode::AspectFit => {
            // Shrink the drawn rect to the source ratio, centered in the box.
            let (w, h) = if src_ratio > box_ratio {
                (bounds.width, bounds.width / src_ratio)
            } else {
                (bounds.height * src_ratio, bounds.height)
            };
            draw = ElementBox::new(
                bounds.x + (bounds.width - w) / 2.0,
                bounds.y + (bounds.height - h) / 2.0,
                w,
                h,
            );
        }
    }

    ImageGeometry { draw, crop }
}

/// Resolved line geometry: absolute canvas-space vertices plus a bounding
/// box inflated by half the stroke width.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineGeometry {
    pub points: Vec<Point>,
    pub bounds: ElementBox,
}

/// Resolve line vertices against the root canvas.
pub(crate) fn resolve_line_geometry(cfg: &LineConfig, canvas: Size) -> LineGeometry {
    let points: Vec<Point> = cfg
        .points
        .iter()
        .map(|[x, y]| {
            Point::new(
                x.resolve(canvas, Axis::Horizontal),
                y.resolve(canvas, Axis::Vertical),
            )
        })
        .collect();

    let bounds = if points.len() < 2 {
        ElementBox::default()
    } else {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let half = cfg.style.line_width / 2.0;
        ElementBox::new(
            min_x - half,
            min_y - half,
            (max_x - min_x) + cfg.style.line_width,
            (max_y - min_y) + cfg.style.line_width,
        )
    };

    LineGeometry { points, bounds }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolver.rs"]
mod tests;
