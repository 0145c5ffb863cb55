//! The drawing surface abstraction the pipeline paints against.

use kurbo::BezPath;

use crate::assets::loader::PreparedImage;
use crate::foundation::core::{ColorDef, ElementBox, Size};
use crate::foundation::error::PlacardResult;

/// A pointer interaction in display (node) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Horizontal position relative to the node's left edge.
    pub x: f64,
    /// Vertical position relative to the node's top edge.
    pub y: f64,
}

/// Style of a single measured or painted text segment.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in design pixels.
    pub font_size: f64,
    /// Registered font family; the surface's default family when `None`.
    pub font_family: Option<String>,
    /// Fill paint.
    pub color: ColorDef,
}

/// Immediate-mode 2D surface the render stage draws through.
///
/// Implementations keep a state stack: `save`/`restore` must scope the
/// current transform, global alpha, and shadow together, and the pipeline
/// brackets every element in exactly one save/restore pair. Coordinates are
/// design pixels; device-pixel-ratio scaling is the implementation's
/// concern.
pub trait Surface2D {
    /// Design-space canvas size.
    fn size(&self) -> Size;

    /// Reset per-frame state before the first element draws.
    fn begin_frame(&mut self) -> PlacardResult<()>;

    /// Flush buffered drawing after the last element.
    fn end_frame(&mut self) -> PlacardResult<()>;

    /// Push the current transform/alpha/shadow state.
    fn save(&mut self);

    /// Pop back to the most recently saved state.
    fn restore(&mut self);

    /// Translate subsequent drawing by `(dx, dy)`.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Rotate subsequent drawing about the current origin.
    fn rotate(&mut self, radians: f64);

    /// Scale subsequent drawing about the current origin.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Multiply subsequent fills/strokes by `alpha` (clamped to `[0, 1]`).
    fn set_global_alpha(&mut self, alpha: f64);

    /// Arm a drop shadow for subsequent fills; cleared by `restore`.
    fn set_shadow(&mut self, color: ColorDef, blur: f64, offset_x: f64, offset_y: f64);

    /// Fill a path with a solid color.
    fn fill_path(&mut self, path: &BezPath, color: ColorDef);

    /// Stroke a path's outline.
    fn stroke_path(&mut self, path: &BezPath, color: ColorDef, width: f64);

    /// Paint `crop` (source pixels) of an image into `dest` (design pixels),
    /// optionally clipped to rounded corners of `radius`.
    fn draw_image(
        &mut self,
        image: &PreparedImage,
        crop: ElementBox,
        dest: ElementBox,
        radius: f64,
    ) -> PlacardResult<()>;

    /// Advance width of `text` in one style, without painting.
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> PlacardResult<f64>;

    /// Paint a single line of text with its top-left corner at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> PlacardResult<()>;
}
