//! The poster instance: owns the surface, the loader, and the per-element
//! cache, and runs the prepare → calculate → render pipeline over a draw
//! list.

use std::collections::HashSet;

use kurbo::{BezPath, Rect, RoundedRect, Shape as _};

use crate::assets::loader::ImageLoader;
use crate::config::fingerprint::fingerprint_config;
use crate::config::model::{Element, ElementConfig, ElementKind, TextConfig};
use crate::foundation::core::{ColorDef, ElementBox, Size, Vec2};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::layout::container;
use crate::layout::resolver::{resolve_image_geometry, resolve_line_geometry};
use crate::pipeline::cache::{CacheEntry, CacheKey, ElementCache, Prepared, cache_key};
use crate::pipeline::hit::{HitRegion, topmost_hit};
use crate::render::backend::{PointerEvent, Surface2D};
use crate::text::shaper;

const DEBUG_OUTLINE: ColorDef = ColorDef {
    r: 1.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// Instance options; unset fields fall back to the [`CanvasTarget`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PosterOptions {
    /// Design canvas width, defaults to the node's display width.
    pub width: Option<f64>,
    /// Design canvas height, defaults to the node's display height.
    pub height: Option<f64>,
    /// Device pixel ratio override.
    pub dpr: Option<f64>,
    /// Stroke a magenta outline around every resolved element box.
    pub debug: bool,
}

/// A host-acquired drawing node: the surface plus its display metrics.
#[derive(Debug)]
pub struct CanvasTarget<S> {
    /// Drawing backend for this node.
    pub surface: S,
    /// On-screen width in display pixels.
    pub display_width: f64,
    /// On-screen height in display pixels.
    pub display_height: f64,
    /// Physical pixels per display pixel.
    pub device_pixel_ratio: f64,
}

/// A configured poster bound to one surface.
///
/// `draw` replaces the current draw list and repaints the whole canvas;
/// element resources survive between draws through the fingerprint-guarded
/// cache. Taking `&mut self` serializes draws on one instance by
/// construction.
pub struct Poster<S, L> {
    surface: S,
    loader: L,
    canvas: Size,
    display: Size,
    dpr: f64,
    debug: bool,
    elements: Vec<Element>,
    cache: ElementCache,
    regions: Vec<HitRegion>,
}

impl<S: Surface2D, L: ImageLoader> Poster<S, L> {
    /// Bind a poster to a target node.
    pub fn new(target: CanvasTarget<S>, options: PosterOptions, loader: L) -> PlacardResult<Self> {
        let display = Size::new(target.display_width, target.display_height)?;
        let canvas = Size::new(
            options.width.unwrap_or(display.width),
            options.height.unwrap_or(display.height),
        )?;
        let dpr = options.dpr.unwrap_or(target.device_pixel_ratio);
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(PlacardError::configuration(
                "device pixel ratio must be finite and > 0",
            ));
        }
        Ok(Self {
            surface: target.surface,
            loader,
            canvas,
            display,
            dpr,
            debug: options.debug,
            elements: Vec::new(),
            cache: ElementCache::default(),
            regions: Vec::new(),
        })
    }

    /// Design canvas size percentages and callbacks resolve against.
    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    /// Borrow the drawing backend.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Tear down the poster, releasing the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Replace the draw list and repaint the whole canvas.
    ///
    /// Elements render in array order; an element with invalid config is
    /// skipped with a warning, while resource and cycle failures abort the
    /// draw. Resolved boxes are retained for pointer dispatch.
    #[tracing::instrument(skip_all, fields(elements = elements.len()))]
    pub fn draw(&mut self, elements: Vec<Element>) -> PlacardResult<()> {
        self.elements = elements;
        self.regions.clear();

        self.surface.begin_frame()?;
        self.surface.save();
        if self.dpr != 1.0 {
            self.surface.scale(self.dpr, self.dpr);
        }
        let mut live = HashSet::new();
        let drawn = self.draw_all(&mut live);
        self.surface.restore();
        let flushed = self.surface.end_frame();
        self.cache.prune(&live);
        drawn?;
        flushed
    }

    fn draw_all(&mut self, live: &mut HashSet<CacheKey>) -> PlacardResult<()> {
        for index in 0..self.elements.len() {
            match self.elements[index].clone() {
                Element::Custom(paint) => {
                    self.surface.save();
                    let painted = paint(&mut self.surface, self.canvas);
                    self.surface.restore();
                    painted?;
                }
                Element::Node(cfg) => self.draw_node(index, &cfg, live)?,
            }
        }
        Ok(())
    }

    fn draw_node(
        &mut self,
        index: usize,
        cfg: &ElementConfig,
        live: &mut HashSet<CacheKey>,
    ) -> PlacardResult<()> {
        if let Err(err) = cfg.validate() {
            tracing::warn!(element = %cfg.label(index), %err, "skipping invalid element");
            return Ok(());
        }

        // Prepare: memoized by config content, so an unchanged element never
        // re-consults the loader.
        let key = cache_key(cfg, index);
        let fingerprint = fingerprint_config(cfg);
        let prepared = match self.cache.prepared_if_current(&key, fingerprint) {
            Some(prepared) => prepared,
            None => prepare(cfg, &mut self.loader)?,
        };
        self.cache.insert(
            key.clone(),
            CacheEntry {
                fingerprint,
                prepared: prepared.clone(),
            },
        );
        live.insert(key);

        // Calculate: resolve the container chain down to the canvas root.
        let mut resolving = Vec::new();
        let stack = container::resolve_stack(
            &self.elements,
            self.canvas,
            index,
            &mut self.surface,
            &mut resolving,
        )?;
        let offset = container::stack_offset(&stack);
        let bounds = stack.last().copied().unwrap_or_default();
        let parent = match stack.len() {
            0 | 1 => self.canvas,
            n => stack[n - 2].size(),
        };

        self.regions.push(HitRegion {
            index,
            bounds: bounds.translated(offset.x, offset.y),
        });

        self.surface.save();
        let rendered = self.render_node(cfg, &prepared, bounds, parent, offset);
        self.surface.restore();
        rendered
    }

    fn render_node(
        &mut self,
        cfg: &ElementConfig,
        prepared: &Prepared,
        bounds: ElementBox,
        parent: Size,
        offset: Vec2,
    ) -> PlacardResult<()> {
        self.surface.translate(offset.x, offset.y);

        if let Some(degrees) = cfg.rotate
            && degrees != 0.0
        {
            let cx = bounds.x + bounds.width / 2.0;
            let cy = bounds.y + bounds.height / 2.0;
            self.surface.translate(cx, cy);
            self.surface.rotate(degrees.to_radians());
            self.surface.translate(-cx, -cy);
        }
        if let Some(alpha) = cfg.global_alpha
            && (0.0..=1.0).contains(&alpha)
        {
            self.surface.set_global_alpha(alpha);
        }
        if let Some(shadow) = &cfg.shadow {
            self.surface
                .set_shadow(shadow.color, shadow.blur, shadow.offset_x, shadow.offset_y);
        }
        if self.debug && !bounds.is_empty() {
            let outline = Rect::new(
                bounds.x,
                bounds.y,
                bounds.x + bounds.width,
                bounds.y + bounds.height,
            )
            .to_path(0.1);
            self.surface.stroke_path(&outline, DEBUG_OUTLINE, 1.0);
        }

        match &cfg.kind {
            ElementKind::Rect(rect) => {
                if bounds.is_empty() {
                    return Ok(());
                }
                let radius = rect
                    .border_radius
                    .as_ref()
                    .map_or(0.0, |r| r.resolve(parent, bounds.size()));
                let path = rounded_rect_path(bounds, radius);
                if let Some(bg) = rect.background_color {
                    self.surface.fill_path(&path, bg);
                }
                if let Some(border) = rect.border {
                    self.surface.stroke_path(&path, border.color, border.width);
                }
            }
            ElementKind::Image(img) => {
                if bounds.is_empty() {
                    return Ok(());
                }
                let Prepared::Image(bitmap) = prepared else {
                    return Ok(());
                };
                let natural = Size {
                    width: f64::from(bitmap.width),
                    height: f64::from(bitmap.height),
                };
                let geometry = resolve_image_geometry(img, bounds, natural);
                let radius = img
                    .border_radius
                    .as_ref()
                    .map_or(0.0, |r| r.resolve(parent, geometry.draw.size()));

                if !geometry.draw.is_empty() {
                    if img.flip_x || img.flip_y {
                        let cx = geometry.draw.x + geometry.draw.width / 2.0;
                        let cy = geometry.draw.y + geometry.draw.height / 2.0;
                        self.surface.translate(cx, cy);
                        self.surface.scale(
                            if img.flip_x { -1.0 } else { 1.0 },
                            if img.flip_y { -1.0 } else { 1.0 },
                        );
                        self.surface.translate(-cx, -cy);
                    }
                    self.surface
                        .draw_image(bitmap, geometry.crop, geometry.draw, radius)?;
                }
                if let Some(border) = img.border {
                    let path = rounded_rect_path(geometry.draw, radius);
                    self.surface.stroke_path(&path, border.color, border.width);
                }
            }
            ElementKind::Line(line) => {
                let geometry = resolve_line_geometry(line, self.canvas);
                let mut path = BezPath::new();
                let mut vertices = geometry.points.iter();
                if let Some(first) = vertices.next() {
                    path.move_to(*first);
                    for p in vertices {
                        path.line_to(*p);
                    }
                    if line.close_path {
                        path.close_path();
                    }
                }
                self.surface
                    .stroke_path(&path, line.style.color, line.style.line_width);
            }
            ElementKind::Text(text) => {
                if bounds.is_empty() {
                    return Ok(());
                }
                shaper::draw(&mut self.surface, text, bounds.x, bounds.y, bounds.width)?;
            }
        }
        Ok(())
    }

    /// Measure the wrapped height of a text config without drawing it.
    ///
    /// `max_width` defaults to the full canvas width.
    pub fn measure_text_height(
        &mut self,
        text: &TextConfig,
        max_width: Option<f64>,
    ) -> PlacardResult<f64> {
        shaper::measure_height(
            &mut self.surface,
            text,
            max_width.unwrap_or(self.canvas.width),
        )
    }

    /// Dispatch a pointer event to the topmost clickable element under it.
    ///
    /// Display coordinates scale into design space for the region scan only;
    /// the handler receives the caller's event untouched. Returns whether a
    /// handler ran.
    pub fn handle_pointer_event(&self, event: &PointerEvent) -> bool {
        let px = event.x * self.canvas.width / self.display.width;
        let py = event.y * self.canvas.height / self.display.height;

        let hit = topmost_hit(&self.regions, px, py, |index| {
            matches!(
                self.elements.get(index),
                Some(Element::Node(cfg)) if cfg.on_click.is_some()
            )
        });
        let Some(index) = hit else {
            return false;
        };
        if let Some(Element::Node(cfg)) = self.elements.get(index)
            && let Some(handler) = &cfg.on_click
        {
            handler(event, cfg);
            return true;
        }
        false
    }
}

fn prepare(cfg: &ElementConfig, loader: &mut dyn ImageLoader) -> PlacardResult<Prepared> {
    match &cfg.kind {
        ElementKind::Image(img) => Ok(Prepared::Image(loader.load(&img.src)?)),
        ElementKind::Rect(_) | ElementKind::Line(_) | ElementKind::Text(_) => Ok(Prepared::None),
    }
}

fn rounded_rect_path(b: ElementBox, radius: f64) -> BezPath {
    let rect = Rect::new(b.x, b.y, b.x + b.width, b.y + b.height);
    if radius > 0.0 {
        RoundedRect::from_rect(rect, radius).to_path(0.1)
    } else {
        rect.to_path(0.1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/poster.rs"]
mod tests;
