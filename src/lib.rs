//! Placard is a declarative canvas poster layout and render engine.
//!
//! A poster is an ordered list of element configurations (text, image, rect,
//! line) drawn onto a 2D surface. Elements position themselves against the
//! canvas or against another element's resolved box (`relative_to`), with
//! numeric, percentage, or callback-based sizing.
//!
//! # Pipeline overview
//!
//! 1. **Prepare**: container-independent resource resolution (image decode
//!    through an [`ImageLoader`]), memoized per element by config content.
//! 2. **Calculate**: container-dependent box resolution, walking
//!    `relative_to` chains down to the canvas root.
//! 3. **Render**: immediate-mode drawing against a [`Surface2D`] backend,
//!    with scoped save/restore around every element.
//!
//! Resolved boxes are retained for pointer hit-testing in reverse paint
//! order ([`Poster::handle_pointer_event`]).
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic layout**: box resolution is pure for a given input.
//! - **No platform branching in the core**: canvas acquisition, image and
//!   font IO live behind the narrow collaborator traits in
//!   [`Surface2D`], [`ImageLoader`], and [`FontLoader`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod layout;
mod pipeline;
mod render;
mod text;

pub use assets::loader::{
    FontLoader, FsFontLoader, FsImageLoader, ImageLoader, LruImageCache, PreparedImage,
    decode_image,
};
pub use config::model::{
    Axis, Border, BoxProps, ClickHandler, CustomPainter, Dimension, Element, ElementConfig,
    ElementKind,
    FitMode, ImageConfig, LineConfig, LineHeight, LineStyle, RadiusSpec, RectConfig, RunStyle,
    Shadow, SourceCrop, TextAlign, TextConfig, TextContent, TextRun,
};
pub use foundation::core::{ColorDef, ElementBox, Rgba8Premul, Size};
pub use foundation::error::{PlacardError, PlacardResult};
pub use layout::resolver::resolve_box;
pub use pipeline::poster::{CanvasTarget, Poster, PosterOptions};
pub use render::backend::{PointerEvent, Surface2D, TextStyle};
pub use render::cpu::{CpuSurface, FramePixels, save_png};
