use std::sync::Arc;

use super::*;
use crate::config::model::{LineStyle, SourceCrop};

fn sz(w: f64, h: f64) -> Size {
    Size {
        width: w,
        height: h,
    }
}

fn props(
    top: Option<Dimension>,
    right: Option<Dimension>,
    bottom: Option<Dimension>,
    left: Option<Dimension>,
    width: Option<Dimension>,
    height: Option<Dimension>,
) -> BoxProps {
    BoxProps {
        top,
        right,
        bottom,
        left,
        width,
        height,
    }
}

#[test]
fn opposing_offsets_derive_the_extent() {
    let b = resolve_box(
        &props(
            None,
            Some(Dimension::Px(5.0)),
            None,
            Some(Dimension::Px(10.0)),
            None,
            None,
        ),
        sz(100.0, 100.0),
    );
    assert_eq!(b.x, 10.0);
    assert_eq!(b.width, 85.0);
    assert_eq!(b.y, 0.0);
    assert_eq!(b.height, 100.0);
}

#[test]
fn explicit_extent_wins_over_far_offset() {
    let b = resolve_box(
        &props(
            None,
            Some(Dimension::Px(10.0)),
            None,
            Some(Dimension::Px(10.0)),
            Some(Dimension::Px(50.0)),
            None,
        ),
        sz(100.0, 100.0),
    );
    assert_eq!(b.x, 10.0);
    assert_eq!(b.width, 50.0);
}

#[test]
fn far_offset_positions_when_near_is_absent() {
    let b = resolve_box(
        &props(
            Some(Dimension::Px(20.0)),
            Some(Dimension::Px(5.0)),
            None,
            None,
            Some(Dimension::Px(20.0)),
            Some(Dimension::Px(30.0)),
        ),
        sz(100.0, 100.0),
    );
    assert_eq!(b.x, 75.0);
    assert_eq!(b.y, 20.0);
}

#[test]
fn all_absent_covers_the_container() {
    let b = resolve_box(&BoxProps::default(), sz(120.0, 80.0));
    assert_eq!(b, ElementBox::new(0.0, 0.0, 120.0, 80.0));
}

#[test]
fn percentages_resolve_against_their_axis() {
    let b = resolve_box(
        &props(
            Some(Dimension::Percent(10.0)),
            None,
            None,
            None,
            Some(Dimension::Percent(50.0)),
            Some(Dimension::Percent(50.0)),
        ),
        sz(200.0, 100.0),
    );
    assert_eq!(b.y, 10.0);
    assert_eq!(b.width, 100.0);
    assert_eq!(b.height, 50.0);
}

#[test]
fn callbacks_receive_the_container() {
    let b = resolve_box(
        &props(
            None,
            None,
            None,
            Some(Dimension::Calc(Arc::new(|s: Size| s.width / 4.0))),
            None,
            None,
        ),
        sz(200.0, 100.0),
    );
    assert_eq!(b.x, 50.0);
    assert_eq!(b.width, 150.0);
}

#[test]
fn over_constrained_spans_collapse_to_zero() {
    let b = resolve_box(
        &props(
            None,
            Some(Dimension::Px(40.0)),
            None,
            Some(Dimension::Px(80.0)),
            None,
            None,
        ),
        sz(100.0, 100.0),
    );
    assert_eq!(b.width, 0.0);
    assert!(b.is_empty());
}

fn image_cfg(mode: FitMode, crop: SourceCrop) -> ImageConfig {
    ImageConfig {
        src: "img.png".to_owned(),
        crop,
        mode,
        border: None,
        border_radius: None,
        flip_x: false,
        flip_y: false,
    }
}

#[test]
fn crop_defaults_to_the_natural_extent() {
    let g = resolve_image_geometry(
        &image_cfg(FitMode::ScaleToFill, SourceCrop::default()),
        ElementBox::new(0.0, 0.0, 50.0, 50.0),
        sz(200.0, 100.0),
    );
    assert_eq!(g.crop, ElementBox::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(g.draw, ElementBox::new(0.0, 0.0, 50.0, 50.0));
}

#[test]
fn aspect_fill_tightens_the_crop_centered() {
    // Wide source into a square box: crop loses width symmetrically.
    let g = resolve_image_geometry(
        &image_cfg(FitMode::AspectFill, SourceCrop::default()),
        ElementBox::new(10.0, 10.0, 100.0, 100.0),
        sz(200.0, 100.0),
    );
    assert_eq!(g.crop, ElementBox::new(50.0, 0.0, 100.0, 100.0));
    assert_eq!(g.draw, ElementBox::new(10.0, 10.0, 100.0, 100.0));
}

#[test]
fn aspect_fit_letterboxes_the_draw_rect() {
    // Wide source into a square box: drawn rect shrinks vertically, centered.
    let g = resolve_image_geometry(
        &image_cfg(FitMode::AspectFit, SourceCrop::default()),
        ElementBox::new(0.0, 0.0, 100.0, 100.0),
        sz(200.0, 100.0),
    );
    assert_eq!(g.crop, ElementBox::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(g.draw, ElementBox::new(0.0, 25.0, 100.0, 50.0));
}

#[test]
fn explicit_crops_clamp_to_the_source() {
    let g = resolve_image_geometry(
        &image_cfg(
            FitMode::ScaleToFill,
            SourceCrop {
                x: Some(150.0),
                y: Some(-10.0),
                width: Some(500.0),
                height: Some(40.0),
            },
        ),
        ElementBox::new(0.0, 0.0, 50.0, 50.0),
        sz(200.0, 100.0),
    );
    assert_eq!(g.crop, ElementBox::new(150.0, 0.0, 50.0, 40.0));
}

#[test]
fn degenerate_crop_yields_an_empty_draw_rect() {
    let g = resolve_image_geometry(
        &image_cfg(
            FitMode::AspectFill,
            SourceCrop {
                x: None,
                y: None,
                width: Some(0.0),
                height: None,
            },
        ),
        ElementBox::new(0.0, 0.0, 50.0, 50.0),
        sz(200.0, 100.0),
    );
    assert!(g.draw.is_empty());
}

#[test]
fn line_bounds_inflate_by_half_the_stroke() {
    let cfg = LineConfig {
        points: vec![
            [Dimension::Px(10.0), Dimension::Px(20.0)],
            [Dimension::Percent(50.0), Dimension::Px(20.0)],
        ],
        close_path: false,
        style: LineStyle {
            line_width: 4.0,
            ..LineStyle::default()
        },
    };
    let g = resolve_line_geometry(&cfg, sz(200.0, 100.0));
    assert_eq!(g.points, vec![Point::new(10.0, 20.0), Point::new(100.0, 20.0)]);
    assert_eq!(g.bounds, ElementBox::new(8.0, 18.0, 94.0, 4.0));
}

#[test]
fn under_two_points_produce_no_bounds() {
    let cfg = LineConfig {
        points: vec![[Dimension::Px(10.0), Dimension::Px(20.0)]],
        close_path: false,
        style: LineStyle::default(),
    };
    let g = resolve_line_geometry(&cfg, sz(200.0, 100.0));
    assert!(g.bounds.is_empty());
}
