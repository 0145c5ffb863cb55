//! Content fingerprints over element configurations.
//!
//! The element cache treats two configs as equal when their fingerprints
//! match, replacing structural deep-equality. Every cache-relevant field is
//! hashed with a domain tag per enum arm so that differently-shaped configs
//! cannot collide by field reordering. `on_click` is deliberately excluded:
//! swapping a pointer handler must not invalidate prepared resources.
//! Callback dimensions hash by callback identity, so a freshly allocated
//! closure counts as a config change.

use crate::config::model::{
    Border, BoxProps, Dimension, ElementConfig, ElementKind, FitMode, ImageConfig, LineConfig,
    LineHeight, LineStyle, RadiusSpec, RectConfig, RunStyle, Shadow, SourceCrop, TextAlign,
    TextConfig, TextContent,
};
use crate::foundation::core::ColorDef;
use crate::foundation::math::Fnv1a64;

/// Hash every cache-relevant field of `cfg`.
pub(crate) fn fingerprint_config(cfg: &ElementConfig) -> u64 {
    let mut h = Fnv1a64::new_default();
    write_opt(&mut h, cfg.id.as_deref(), |h, v| h.write_str(v));
    write_opt(&mut h, cfg.relative_to.as_deref(), |h, v| h.write_str(v));
    write_box_props(&mut h, &cfg.box_props);
    write_opt(&mut h, cfg.rotate, |h, v| h.write_f64(v));
    write_opt(&mut h, cfg.global_alpha, |h, v| h.write_f64(v));
    write_opt(&mut h, cfg.shadow.as_ref(), write_shadow);
    match &cfg.kind {
        ElementKind::Rect(rect) => {
            h.write_u8(0);
            write_rect(&mut h, rect);
        }
        ElementKind::Line(line) => {
            h.write_u8(1);
            write_line(&mut h, line);
        }
        ElementKind::Image(img) => {
            h.write_u8(2);
            write_image(&mut h, img);
        }
        ElementKind::Text(text) => {
            h.write_u8(3);
            write_text(&mut h, text);
        }
    }
    h.finish()
}

fn write_opt<T>(h: &mut Fnv1a64, v: Option<T>, write: impl FnOnce(&mut Fnv1a64, T)) {
    match v {
        None => h.write_u8(0),
        Some(v) => {
            h.write_u8(1);
            write(h, v);
        }
    }
}

fn write_dimension(h: &mut Fnv1a64, d: &Dimension) {
    match d {
        Dimension::Px(v) => {
            h.write_u8(0);
            h.write_f64(*v);
        }
        Dimension::Percent(p) => {
            h.write_u8(1);
            h.write_f64(*p);
        }
        Dimension::Calc(_) => {
            h.write_u8(2);
            // Identity, not content: closures only compare equal to themselves.
            h.write_usize(d.callback_identity().unwrap_or(0));
        }
    }
}

fn write_box_props(h: &mut Fnv1a64, b: &BoxProps) {
    for side in [&b.top, &b.right, &b.bottom, &b.left, &b.width, &b.height] {
        write_opt(h, side.as_ref(), write_dimension);
    }
}

fn write_color(h: &mut Fnv1a64, c: &ColorDef) {
    h.write_f64(c.r);
    h.write_f64(c.g);
    h.write_f64(c.b);
    h.write_f64(c.a);
}

fn write_shadow(h: &mut Fnv1a64, s: &Shadow) {
    write_color(h, &s.color);
    h.write_f64(s.blur);
    h.write_f64(s.offset_x);
    h.write_f64(s.offset_y);
}

fn write_border(h: &mut Fnv1a64, b: &Border) {
    h.write_f64(b.width);
    write_color(h, &b.color);
}

fn write_radius(h: &mut Fnv1a64, r: &RadiusSpec) {
    match r {
        RadiusSpec::Px(v) => {
            h.write_u8(0);
            h.write_f64(*v);
        }
        RadiusSpec::Percent(p) => {
            h.write_u8(1);
            h.write_f64(*p);
        }
        RadiusSpec::Calc(_) => {
            h.write_u8(2);
            h.write_usize(r.callback_identity().unwrap_or(0));
        }
    }
}

fn write_rect(h: &mut Fnv1a64, rect: &RectConfig) {
    write_opt(h, rect.background_color.as_ref(), write_color);
    write_opt(h, rect.border.as_ref(), write_border);
    write_opt(h, rect.border_radius.as_ref(), write_radius);
}

fn write_line(h: &mut Fnv1a64, line: &LineConfig) {
    h.write_usize(line.points.len());
    for [x, y] in &line.points {
        write_dimension(h, x);
        write_dimension(h, y);
    }
    h.write_bool(line.close_path);
    write_line_style(h, &line.style);
}

fn write_line_style(h: &mut Fnv1a64, s: &LineStyle) {
    h.write_f64(s.line_width);
    write_color(h, &s.color);
}

fn write_crop(h: &mut Fnv1a64, c: &SourceCrop) {
    write_opt(h, c.x, |h, v| h.write_f64(v));
    write_opt(h, c.y, |h, v| h.write_f64(v));
    write_opt(h, c.width, |h, v| h.write_f64(v));
    write_opt(h, c.height, |h, v| h.write_f64(v));
}

fn write_image(h: &mut Fnv1a64, img: &ImageConfig) {
    h.write_str(&img.src);
    write_crop(h, &img.crop);
    h.write_u8(match img.mode {
        FitMode::ScaleToFill => 0,
        FitMode::AspectFit => 1,
        FitMode::AspectFill => 2,
    });
    write_opt(h, img.border.as_ref(), write_border);
    write_opt(h, img.border_radius.as_ref(), write_radius);
    h.write_bool(img.flip_x);
    h.write_bool(img.flip_y);
}

fn write_line_height(h: &mut Fnv1a64, lh: &LineHeight) {
    match lh {
        LineHeight::Px(v) => {
            h.write_u8(0);
            h.write_f64(*v);
        }
        LineHeight::Percent(p) => {
            h.write_u8(1);
            h.write_f64(*p);
        }
    }
}

fn write_run_style(h: &mut Fnv1a64, s: &RunStyle) {
    write_opt(h, s.font_size, |h, v| h.write_f64(v));
    write_opt(h, s.font_family.as_deref(), |h, v| h.write_str(v));
    write_opt(h, s.color.as_ref(), write_color);
    write_opt(h, s.line_height.as_ref(), write_line_height);
}

fn write_text(h: &mut Fnv1a64, text: &TextConfig) {
    match &text.content {
        TextContent::Plain(s) => {
            h.write_u8(0);
            h.write_str(s);
        }
        TextContent::Runs(runs) => {
            h.write_u8(1);
            h.write_usize(runs.len());
            for run in runs {
                h.write_str(&run.text);
                write_run_style(h, &run.style);
            }
        }
    }
    write_run_style(h, &text.style);
    write_opt(h, text.line_clamp, |h, v| h.write_u64(u64::from(v)));
    h.write_str(&text.ellipsis_content);
    h.write_u8(match text.text_align {
        TextAlign::Left => 0,
        TextAlign::Center => 1,
        TextAlign::Right => 2,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/config/fingerprint.rs"]
mod tests;
