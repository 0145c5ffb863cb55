//! CPU rasterizing [`Surface2D`] backed by `vello_cpu` and `parley`.
//!
//! Vector paths, images, and glyph runs all rasterize into one premultiplied
//! RGBA8 pixmap. Strokes are expanded to fill outlines with `kurbo::stroke`,
//! and decoded images are wrapped into `vello_cpu` pixmap paints memoized by
//! pixel-buffer identity.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use kurbo::{Affine, BezPath, PathEl, Rect, RoundedRect, Shape as _, Stroke, StrokeOpts};

use crate::assets::loader::{FontLoader, PreparedImage};
use crate::foundation::core::{ColorDef, ElementBox, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::render::backend::{Surface2D, TextStyle};

const PATH_TOLERANCE: f64 = 0.1;

/// Unit brush for Parley layout; glyph paint comes from the [`TextStyle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct GlyphBrush;

#[derive(Clone, Copy, Debug)]
struct ShadowState {
    color: ColorDef,
    offset_x: f64,
    offset_y: f64,
}

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Affine,
    alpha: f64,
    shadow: Option<ShadowState>,
}

impl DrawState {
    fn base() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            shadow: None,
        }
    }
}

/// One rendered frame, premultiplied RGBA8 row-major.
#[derive(Clone, Debug)]
pub struct FramePixels {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// `width * height * 4` premultiplied bytes.
    pub data: Vec<u8>,
}

/// CPU rasterizer implementing [`Surface2D`].
///
/// Operates in physical pixels: size the surface `canvas * dpr` and let the
/// poster apply the scale. Fonts must be registered before text draws.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    state: DrawState,
    saved: Vec<DrawState>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    fonts: Vec<(String, vello_cpu::peniko::FontData)>,
    image_paints: HashMap<usize, vello_cpu::Image>,
}

impl CpuSurface {
    /// Surface of `width` x `height` physical pixels.
    pub fn new(width: u32, height: u32) -> PlacardResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| PlacardError::configuration("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| PlacardError::configuration("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(PlacardError::configuration("surface must be non-empty"));
        }
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            state: DrawState::base(),
            saved: Vec::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: Vec::new(),
            image_paints: HashMap::new(),
        })
    }

    /// Register raw TTF/OTF bytes; returns the discovered family name.
    ///
    /// The first registered family is the fallback for styles that name no
    /// family or name an unknown one.
    pub fn register_font_bytes(&mut self, bytes: Vec<u8>) -> PlacardResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PlacardError::resource_load("no font families in font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlacardError::resource_load("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        self.fonts.push((name.clone(), font));
        Ok(name)
    }

    /// Register `family` through a [`FontLoader`].
    pub fn register_font(
        &mut self,
        loader: &mut dyn FontLoader,
        family: &str,
    ) -> PlacardResult<String> {
        let bytes = loader.load(family)?;
        self.register_font_bytes(bytes)
    }

    /// Copy out the last rendered frame.
    pub fn to_frame(&self) -> FramePixels {
        FramePixels {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
        }
    }

    fn resolve_font(
        &self,
        family: Option<&str>,
    ) -> PlacardResult<(String, vello_cpu::peniko::FontData)> {
        if let Some(name) = family
            && let Some((n, f)) = self.fonts.iter().find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            return Ok((n.clone(), f.clone()));
        }
        self.fonts
            .first()
            .map(|(n, f)| (n.clone(), f.clone()))
            .ok_or_else(|| {
                PlacardError::resource_load("no fonts registered; call register_font_bytes first")
            })
    }

    fn layout_line(
        &mut self,
        text: &str,
        style: &TextStyle,
    ) -> PlacardResult<(parley::Layout<GlyphBrush>, vello_cpu::peniko::FontData)> {
        let (family, font) = self.resolve_font(style.font_family.as_deref())?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(
            style.font_size as f32,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush));
        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok((layout, font))
    }

    fn image_paint(&mut self, image: &PreparedImage) -> PlacardResult<vello_cpu::Image> {
        let key = image.buffer_identity();
        if let Some(paint) = self.image_paints.get(&key) {
            return Ok(paint.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&image.pixels, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_paints.insert(key, paint.clone());
        Ok(paint)
    }

    fn set_solid_paint(&mut self, color: ColorDef) {
        let [r, g, b, a] = ColorDef {
            a: color.a * self.state.alpha,
            ..color
        }
        .to_rgba8_straight();
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn fill_with_transform(&mut self, path: &BezPath, color: ColorDef, transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.set_solid_paint(color);
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn fill_shadowed(&mut self, path: &BezPath, color: ColorDef) {
        // TODO: rasterize shadow blur with a separable gaussian pass; only
        // the offset silhouette is drawn today.
        if let Some(shadow) = self.state.shadow {
            let tr = self.state.transform
                * Affine::translate((shadow.offset_x, shadow.offset_y));
            self.fill_with_transform(path, shadow.color, tr);
        }
        self.fill_with_transform(path, color, self.state.transform);
    }
}

impl Surface2D for CpuSurface {
    fn size(&self) -> Size {
        Size {
            width: f64::from(self.width),
            height: f64::from(self.height),
        }
    }

    fn begin_frame(&mut self) -> PlacardResult<()> {
        self.ctx.reset();
        self.state = DrawState::base();
        self.saved.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> PlacardResult<()> {
        self.ctx.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform * Affine::translate((dx, dy));
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform * Affine::rotate(radians);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform * Affine::scale_non_uniform(sx, sy);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_shadow(&mut self, color: ColorDef, _blur: f64, offset_x: f64, offset_y: f64) {
        self.state.shadow = Some(ShadowState {
            color,
            offset_x,
            offset_y,
        });
    }

    fn fill_path(&mut self, path: &BezPath, color: ColorDef) {
        self.fill_shadowed(path, color);
    }

    fn stroke_path(&mut self, path: &BezPath, color: ColorDef, width: f64) {
        if !width.is_finite() || width <= 0.0 {
            return;
        }
        let outline = kurbo::stroke(
            path.iter(),
            &Stroke::new(width),
            &StrokeOpts::default(),
            PATH_TOLERANCE,
        );
        self.fill_shadowed(&outline, color);
    }

    fn draw_image(
        &mut self,
        image: &PreparedImage,
        crop: ElementBox,
        dest: ElementBox,
        radius: f64,
    ) -> PlacardResult<()> {
        if crop.is_empty() || dest.is_empty() {
            return Ok(());
        }
        let paint = self.image_paint(image)?;

        // Paint transform maps source pixels onto the dest rect.
        let paint_tr = Affine::translate((dest.x, dest.y))
            * Affine::scale_non_uniform(dest.width / crop.width, dest.height / crop.height)
            * Affine::translate((-crop.x, -crop.y));

        self.ctx.set_transform(affine_to_cpu(self.state.transform));
        self.ctx.set_paint(paint);
        self.ctx.set_paint_transform(affine_to_cpu(paint_tr));

        let opacity = self.state.alpha as f32;
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        if radius > 0.0 {
            let rect = Rect::new(dest.x, dest.y, dest.x + dest.width, dest.y + dest.height);
            let path = RoundedRect::from_rect(rect, radius).to_path(PATH_TOLERANCE);
            self.ctx.fill_path(&bezpath_to_cpu(&path));
        } else {
            self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                dest.x,
                dest.y,
                dest.x + dest.width,
                dest.y + dest.height,
            ));
        }
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> PlacardResult<f64> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let (layout, _) = self.layout_line(text, style)?;
        Ok(f64::from(layout.width()))
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> PlacardResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let (layout, font) = self.layout_line(text, style)?;

        let mut passes = Vec::new();
        if let Some(shadow) = self.state.shadow {
            passes.push((
                Affine::translate((shadow.offset_x, shadow.offset_y)),
                shadow.color,
            ));
        }
        passes.push((Affine::IDENTITY, style.color));

        for (extra, color) in passes {
            let tr = self.state.transform * extra * Affine::translate((x, y));
            self.ctx.set_transform(affine_to_cpu(tr));
            let [r, g, b, a] = ColorDef {
                a: color.a * self.state.alpha,
                ..color
            }
            .to_rgba8_straight();
            self.ctx
                .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    self.ctx
                        .glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        Ok(())
    }
}

/// Write a rendered frame as a straight-alpha PNG.
pub fn save_png(frame: &FramePixels, path: impl AsRef<Path>) -> PlacardResult<()> {
    let mut rgba = frame.data.clone();
    unpremultiply_rgba8_in_place(&mut rgba);
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| PlacardError::resource_load("frame buffer length mismatch"))?;
    img.save(path.as_ref())
        .map_err(|e| PlacardError::resource_load(format!("write png: {e}")))
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PlacardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PlacardError::resource_load("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PlacardError::resource_load("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PlacardError::resource_load("image byte length mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
