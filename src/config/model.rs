use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{ColorDef, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::render::backend::{PointerEvent, Surface2D};

/// A length along one container axis.
///
/// Serializes as a bare number (pixels) or a `"NN%"` string (percentage of
/// the container axis). Callback dimensions exist only at runtime and fail
/// serialization.
#[derive(Clone)]
pub enum Dimension {
    /// Absolute design pixels.
    Px(f64),
    /// Percentage of the container's extent on the dimension's axis.
    Percent(f64),
    /// Runtime callback receiving the container size.
    Calc(Arc<dyn Fn(Size) -> f64 + Send + Sync>),
}

/// Container axis a [`Dimension`] resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Resolves percentages against the container width.
    Horizontal,
    /// Resolves percentages against the container height.
    Vertical,
}

impl Dimension {
    /// Resolve to design pixels against `container`.
    ///
    /// Non-finite results (from callbacks or authored values) collapse to 0.
    pub fn resolve(&self, container: Size, axis: Axis) -> f64 {
        let v = match self {
            Self::Px(v) => *v,
            Self::Percent(p) => {
                let extent = match axis {
                    Axis::Horizontal => container.width,
                    Axis::Vertical => container.height,
                };
                p / 100.0 * extent
            }
            Self::Calc(f) => f(container),
        };
        if v.is_finite() { v } else { 0.0 }
    }

    pub(crate) fn callback_identity(&self) -> Option<usize> {
        match self {
            Self::Calc(f) => Some(Arc::as_ptr(f) as *const () as usize),
            _ => None,
        }
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "Px({v})"),
            Self::Percent(p) => write!(f, "Percent({p}%)"),
            Self::Calc(_) => f.write_str("Calc(..)"),
        }
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Px(a), Self::Px(b)) => a == b,
            (Self::Percent(a), Self::Percent(b)) => a == b,
            (Self::Calc(a), Self::Calc(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for Dimension {
    fn from(v: f64) -> Self {
        Self::Px(v)
    }
}

impl serde::Serialize for Dimension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Px(v) => serializer.serialize_f64(*v),
            Self::Percent(p) => serializer.serialize_str(&format!("{p}%")),
            Self::Calc(_) => Err(serde::ser::Error::custom(
                "callback dimensions cannot be serialized",
            )),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Px(v)),
            Repr::Str(s) => parse_percent(&s).map_err(serde::de::Error::custom),
        }
    }
}

fn parse_percent(s: &str) -> Result<Dimension, String> {
    let t = s.trim();
    let Some(body) = t.strip_suffix('%') else {
        return Err(format!("dimension string must end in '%', got \"{s}\""));
    };
    body.trim()
        .parse::<f64>()
        .map(Dimension::Percent)
        .map_err(|_| format!("invalid percentage \"{s}\""))
}

/// Positional box properties shared by every element kind.
///
/// All six are optional; the resolver in [`crate::resolve_box`] fills the
/// gaps (absent position snaps to the container origin, absent extent fills
/// the remaining span).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoxProps {
    /// Offset from the container's top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Dimension>,
    /// Offset from the container's right edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Dimension>,
    /// Offset from the container's bottom edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Dimension>,
    /// Offset from the container's left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Dimension>,
    /// Explicit width, which wins over a `left`+`right` derived width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    /// Explicit height, which wins over a `top`+`bottom` derived height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
}

/// Offset drop shadow applied around an element's fills.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Shadow {
    /// Shadow paint.
    pub color: ColorDef,
    /// Blur radius in design pixels.
    pub blur: f64,
    /// Horizontal shadow offset.
    pub offset_x: f64,
    /// Vertical shadow offset.
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: ColorDef::rgba(0.0, 0.0, 0.0, 0.5),
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Stroked border around a rect or image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Border {
    /// Stroke width in design pixels.
    pub width: f64,
    /// Stroke paint.
    pub color: ColorDef,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 1.0,
            color: ColorDef::BLACK,
        }
    }
}

/// Corner radius for rects and images.
///
/// Percentages resolve against the element's own width; the resolved value
/// is clamped to half the shorter side.
#[derive(Clone)]
pub enum RadiusSpec {
    /// Absolute design pixels.
    Px(f64),
    /// Percentage of the element's own width.
    Percent(f64),
    /// Runtime callback receiving the container size and the element's
    /// resolved size.
    Calc(Arc<dyn Fn(Size, Size) -> f64 + Send + Sync>),
}

impl RadiusSpec {
    /// Resolve against the element's own box and clamp to a drawable range.
    pub fn resolve(&self, container: Size, own: Size) -> f64 {
        let v = match self {
            Self::Px(v) => *v,
            Self::Percent(p) => p / 100.0 * own.width,
            Self::Calc(f) => f(container, own),
        };
        let v = if v.is_finite() { v.max(0.0) } else { 0.0 };
        v.min((own.width.min(own.height) / 2.0).max(0.0))
    }

    pub(crate) fn callback_identity(&self) -> Option<usize> {
        match self {
            Self::Calc(f) => Some(Arc::as_ptr(f) as *const () as usize),
            _ => None,
        }
    }
}

impl fmt::Debug for RadiusSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "Px({v})"),
            Self::Percent(p) => write!(f, "Percent({p}%)"),
            Self::Calc(_) => f.write_str("Calc(..)"),
        }
    }
}

impl PartialEq for RadiusSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Px(a), Self::Px(b)) => a == b,
            (Self::Percent(a), Self::Percent(b)) => a == b,
            (Self::Calc(a), Self::Calc(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl serde::Serialize for RadiusSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Px(v) => serializer.serialize_f64(*v),
            Self::Percent(p) => serializer.serialize_str(&format!("{p}%")),
            Self::Calc(_) => Err(serde::ser::Error::custom(
                "callback radii cannot be serialized",
            )),
        }
    }
}

impl<'de> serde::Deserialize<'de> for RadiusSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Dimension::deserialize(deserializer)? {
            Dimension::Px(v) => Ok(Self::Px(v)),
            Dimension::Percent(p) => Ok(Self::Percent(p)),
            Dimension::Calc(_) => unreachable!("dimensions never deserialize into callbacks"),
        }
    }
}

/// Stroke styling for line elements.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineStyle {
    /// Stroke width in design pixels.
    pub line_width: f64,
    /// Stroke paint.
    pub color: ColorDef,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            color: ColorDef::BLACK,
        }
    }
}

/// How an image maps its (cropped) source pixels into its resolved box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FitMode {
    /// Stretch the source to fill the box exactly.
    #[default]
    ScaleToFill,
    /// Shrink the drawn box to the source aspect ratio, centered.
    AspectFit,
    /// Tighten the source crop to the box aspect ratio, centered.
    AspectFill,
}

/// Source-space crop window in natural image pixels.
///
/// Absent fields default to the full natural extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceCrop {
    /// Left edge of the crop, natural pixels.
    pub x: Option<f64>,
    /// Top edge of the crop, natural pixels.
    pub y: Option<f64>,
    /// Crop width, natural pixels.
    pub width: Option<f64>,
    /// Crop height, natural pixels.
    pub height: Option<f64>,
}

/// Image element payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Source locator handed to the [`crate::ImageLoader`].
    pub src: String,
    /// Source-space crop window.
    #[serde(default)]
    pub crop: SourceCrop,
    /// Fit mode, `scaleToFill` by default.
    #[serde(default)]
    pub mode: FitMode,
    /// Optional stroked border over the box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    /// Optional corner rounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<RadiusSpec>,
    /// Mirror horizontally about the box center.
    #[serde(default)]
    pub flip_x: bool,
    /// Mirror vertically about the box center.
    #[serde(default)]
    pub flip_y: bool,
}

/// Rect element payload.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectConfig {
    /// Fill paint; no fill when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorDef>,
    /// Optional stroked border.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    /// Optional corner rounding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<RadiusSpec>,
}

/// Line element payload.
///
/// Point coordinates resolve against the root canvas, never against a
/// `relative_to` parent.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Polyline vertices as `[x, y]` dimension pairs; at least two required.
    pub points: Vec<[Dimension; 2]>,
    /// Connect the last vertex back to the first.
    #[serde(default)]
    pub close_path: bool,
    /// Stroke styling.
    #[serde(default)]
    pub style: LineStyle,
}

/// Horizontal alignment of wrapped text lines inside the element box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    /// Lines start at the box's left edge.
    #[default]
    Left,
    /// Lines center within the box width.
    Center,
    /// Lines end at the box's right edge.
    Right,
}

/// Line height of a styled run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineHeight {
    /// Absolute design pixels.
    Px(f64),
    /// Percentage of the run's font size.
    Percent(f64),
}

impl LineHeight {
    /// Resolve to pixels for a given font size.
    pub fn resolve(&self, font_size: f64) -> f64 {
        match self {
            Self::Px(v) => *v,
            Self::Percent(p) => p / 100.0 * font_size,
        }
    }
}

impl serde::Serialize for LineHeight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Px(v) => serializer.serialize_f64(*v),
            Self::Percent(p) => serializer.serialize_str(&format!("{p}%")),
        }
    }
}

impl<'de> serde::Deserialize<'de> for LineHeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Dimension::deserialize(deserializer)? {
            Dimension::Px(v) => Ok(Self::Px(v)),
            Dimension::Percent(p) => Ok(Self::Percent(p)),
            Dimension::Calc(_) => unreachable!("dimensions never deserialize into callbacks"),
        }
    }
}

/// Per-run text styling; absent fields inherit the element's base style.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunStyle {
    /// Font size in design pixels (16 when unset anywhere in the chain).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font family name as registered with the surface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Fill paint (black when unset anywhere in the chain).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorDef>,
    /// Line height (120% of font size when unset anywhere in the chain).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<LineHeight>,
}

/// One styled span of a rich-text element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextRun {
    /// The span's characters.
    pub text: String,
    /// Style overrides for this span.
    #[serde(flatten)]
    pub style: RunStyle,
}

/// Text payload: a plain string or a list of styled runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum TextContent {
    /// Single-style text using the element's base style.
    Plain(String),
    /// Mixed-style runs wrapped as one flow.
    Runs(Vec<TextRun>),
}

impl Default for TextContent {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

/// Text element payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    /// The text to lay out.
    pub content: TextContent,
    /// Base style; runs inherit fields they leave unset.
    #[serde(flatten)]
    pub style: RunStyle,
    /// Maximum number of wrapped lines before truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_clamp: Option<u32>,
    /// Marker appended when `line_clamp` truncates, `"..."` by default.
    #[serde(default = "default_ellipsis")]
    pub ellipsis_content: String,
    /// Horizontal alignment of each wrapped line.
    #[serde(default)]
    pub text_align: TextAlign,
}

fn default_ellipsis() -> String {
    "...".to_owned()
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: TextContent::default(),
            style: RunStyle::default(),
            line_clamp: None,
            ellipsis_content: default_ellipsis(),
            text_align: TextAlign::default(),
        }
    }
}

/// Kind-specific payload of a configured element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    /// Filled/stroked rectangle.
    Rect(RectConfig),
    /// Stroked polyline in canvas coordinates.
    Line(LineConfig),
    /// Bitmap image.
    Image(ImageConfig),
    /// Wrapped text block.
    Text(TextConfig),
}

/// Pointer callback attached to an element.
///
/// Receives the pointer event exactly as the host delivered it (display
/// coordinates) and the hit element's config.
pub type ClickHandler = Arc<dyn Fn(&PointerEvent, &ElementConfig) + Send + Sync>;

/// Full configuration of one drawable element.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConfig {
    /// Stable identity for caching and `relative_to` targeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of an earlier element this one positions against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<String>,
    /// Box model properties.
    #[serde(flatten)]
    pub box_props: BoxProps,
    /// Rotation in degrees about the box center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    /// Uniform opacity in `[0, 1]`; out-of-range values are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_alpha: Option<f64>,
    /// Optional drop shadow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    /// Pointer callback; runtime-only, never serialized.
    #[serde(skip)]
    pub on_click: Option<ClickHandler>,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl fmt::Debug for ElementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementConfig")
            .field("id", &self.id)
            .field("relative_to", &self.relative_to)
            .field("box_props", &self.box_props)
            .field("rotate", &self.rotate)
            .field("global_alpha", &self.global_alpha)
            .field("shadow", &self.shadow)
            .field("on_click", &self.on_click.is_some())
            .field("kind", &self.kind)
            .finish()
    }
}

impl ElementConfig {
    /// Minimal config of the given kind with every box property unset.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: None,
            relative_to: None,
            box_props: BoxProps::default(),
            rotate: None,
            global_alpha: None,
            shadow: None,
            on_click: None,
            kind,
        }
    }

    /// Human-readable label used in logs and cycle errors.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("#{index}"),
        }
    }

    /// Check structural validity of the configuration.
    ///
    /// The pipeline skips (and logs) elements that fail here rather than
    /// aborting the whole draw.
    pub fn validate(&self) -> PlacardResult<()> {
        if let Some(r) = self.rotate
            && !r.is_finite()
        {
            return Err(PlacardError::element("rotate must be finite degrees"));
        }
        if let Some(a) = self.global_alpha
            && a.is_nan()
        {
            return Err(PlacardError::element("globalAlpha must not be NaN"));
        }
        match &self.kind {
            ElementKind::Image(img) => {
                if img.src.trim().is_empty() {
                    return Err(PlacardError::element("image src must not be empty"));
                }
            }
            ElementKind::Line(line) => {
                if line.points.len() < 2 {
                    return Err(PlacardError::element("line needs at least two points"));
                }
                if !line.style.line_width.is_finite() || line.style.line_width <= 0.0 {
                    return Err(PlacardError::element("lineWidth must be finite and > 0"));
                }
            }
            ElementKind::Text(text) => {
                if let Some(fs) = text.style.font_size
                    && (!fs.is_finite() || fs <= 0.0)
                {
                    return Err(PlacardError::element("fontSize must be finite and > 0"));
                }
                if text.line_clamp == Some(0) {
                    return Err(PlacardError::element("lineClamp must be >= 1"));
                }
            }
            ElementKind::Rect(_) => {}
        }
        Ok(())
    }
}

/// Escape hatch painter drawing straight onto the surface.
///
/// Invoked inside its own save/restore scope with the canvas size.
pub type CustomPainter = Arc<dyn Fn(&mut dyn Surface2D, Size) -> PlacardResult<()> + Send + Sync>;

/// One entry of a poster's draw list.
#[derive(Clone)]
pub enum Element {
    /// Declaratively configured element.
    Node(ElementConfig),
    /// Imperative painter callback.
    Custom(CustomPainter),
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(cfg) => f.debug_tuple("Node").field(cfg).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<ElementConfig> for Element {
    fn from(cfg: ElementConfig) -> Self {
        Self::Node(cfg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
