use std::sync::{Arc, Mutex};

use super::*;

#[path = "../support.rs"]
mod support;
use support::{CountingLoader, MonoSurface};

use crate::config::model::{
    ClickHandler, Dimension, FitMode, ImageConfig, RectConfig, SourceCrop,
};

fn target(surface: MonoSurface) -> CanvasTarget<MonoSurface> {
    CanvasTarget {
        surface,
        display_width: 100.0,
        display_height: 100.0,
        device_pixel_ratio: 1.0,
    }
}

fn poster(loader: CountingLoader) -> Poster<MonoSurface, CountingLoader> {
    Poster::new(
        target(MonoSurface::new(100.0, 100.0)),
        PosterOptions::default(),
        loader,
    )
    .unwrap()
}

fn image(id: Option<&str>, src: &str) -> ElementConfig {
    let mut cfg = ElementConfig::new(ElementKind::Image(ImageConfig {
        src: src.to_owned(),
        crop: SourceCrop::default(),
        mode: FitMode::ScaleToFill,
        border: None,
        border_radius: None,
        flip_x: false,
        flip_y: false,
    }));
    cfg.id = id.map(str::to_owned);
    cfg.box_props.width = Some(Dimension::Px(10.0));
    cfg.box_props.height = Some(Dimension::Px(10.0));
    cfg
}

fn rect(id: Option<&str>) -> ElementConfig {
    let mut cfg = ElementConfig::new(ElementKind::Rect(RectConfig {
        background_color: Some(crate::foundation::core::ColorDef::BLACK),
        ..RectConfig::default()
    }));
    cfg.id = id.map(str::to_owned);
    cfg
}

#[test]
fn options_validate_geometry() {
    let bad = Poster::new(
        target(MonoSurface::new(100.0, 100.0)),
        PosterOptions {
            dpr: Some(0.0),
            ..PosterOptions::default()
        },
        CountingLoader::new(4, 4),
    );
    assert!(bad.is_err());

    let sized = Poster::new(
        target(MonoSurface::new(100.0, 100.0)),
        PosterOptions {
            width: Some(300.0),
            height: Some(150.0),
            ..PosterOptions::default()
        },
        CountingLoader::new(4, 4),
    )
    .unwrap();
    assert_eq!(sized.canvas_size().width, 300.0);
    assert_eq!(sized.canvas_size().height, 150.0);
}

#[test]
fn unchanged_elements_reuse_prepared_resources() {
    let loader = CountingLoader::new(4, 4);
    let counter = loader.clone();
    let mut poster = poster(loader);

    let elements = vec![Element::Node(image(Some("logo"), "logo.png"))];
    poster.draw(elements.clone()).unwrap();
    poster.draw(elements).unwrap();

    assert_eq!(counter.load_count(), 1);
}

#[test]
fn changed_configs_invalidate_their_entry() {
    let loader = CountingLoader::new(4, 4);
    let counter = loader.clone();
    let mut poster = poster(loader);

    poster
        .draw(vec![Element::Node(image(Some("logo"), "logo.png"))])
        .unwrap();
    poster
        .draw(vec![Element::Node(image(Some("logo"), "banner.png"))])
        .unwrap();

    assert_eq!(counter.loads.lock().unwrap().as_slice(), ["logo.png", "banner.png"]);
}

#[test]
fn identified_elements_survive_reordering() {
    let loader = CountingLoader::new(4, 4);
    let counter = loader.clone();
    let mut poster = poster(loader);

    poster
        .draw(vec![Element::Node(image(Some("logo"), "logo.png"))])
        .unwrap();
    // Same element, new position in the list.
    poster
        .draw(vec![
            Element::Node(rect(None)),
            Element::Node(image(Some("logo"), "logo.png")),
        ])
        .unwrap();

    assert_eq!(counter.load_count(), 1);
}

#[test]
fn anonymous_elements_bind_to_their_index() {
    let loader = CountingLoader::new(4, 4);
    let counter = loader.clone();
    let mut poster = poster(loader);

    poster
        .draw(vec![Element::Node(image(None, "logo.png"))])
        .unwrap();
    poster
        .draw(vec![
            Element::Node(rect(None)),
            Element::Node(image(None, "logo.png")),
        ])
        .unwrap();

    // The image shifted from index 0 to 1, so its entry was not reusable.
    assert_eq!(counter.load_count(), 2);
}

#[test]
fn prepare_failures_abort_and_leave_no_entry() {
    let mut loader = CountingLoader::new(4, 4);
    loader.fail = true;
    let counter = loader.clone();
    let mut poster = poster(loader);

    let elements = vec![Element::Node(image(Some("logo"), "logo.png"))];
    assert!(poster.draw(elements.clone()).is_err());
    assert!(poster.draw(elements).is_err());

    // No cache entry survived the failure, so the loader was consulted twice.
    assert_eq!(counter.load_count(), 2);
}

#[test]
fn invalid_elements_are_skipped_not_fatal() {
    let loader = CountingLoader::new(4, 4);
    let counter = loader.clone();
    let mut poster = poster(loader);

    poster
        .draw(vec![
            Element::Node(image(None, "   ")),
            Element::Node(rect(None)),
        ])
        .unwrap();

    assert_eq!(counter.load_count(), 0);
    assert_eq!(poster.surface().fills.len(), 1);
}

#[test]
fn cycles_abort_the_draw() {
    let loader = CountingLoader::new(4, 4);
    let mut poster = poster(loader);

    let mut a = rect(Some("a"));
    a.relative_to = Some("b".to_owned());
    let mut b = rect(Some("b"));
    b.relative_to = Some("a".to_owned());

    let err = poster
        .draw(vec![Element::Node(a), Element::Node(b)])
        .unwrap_err();
    assert!(matches!(err, PlacardError::Cycle(_)));
}

#[test]
fn custom_painters_run_in_their_own_scope() {
    let loader = CountingLoader::new(4, 4);
    let mut poster = poster(loader);
    let seen = Arc::new(Mutex::new(None));
    let seen_in = seen.clone();

    poster
        .draw(vec![Element::Custom(Arc::new(move |surface, canvas| {
            *seen_in.lock().unwrap() = Some((canvas.width, canvas.height));
            surface.translate(5.0, 5.0);
            Ok(())
        }))])
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), Some((100.0, 100.0)));
}

#[test]
fn pointer_events_scale_and_dispatch_topmost_first() {
    let loader = CountingLoader::new(4, 4);
    let mut poster = Poster::new(
        target(MonoSurface::new(100.0, 100.0)),
        PosterOptions {
            width: Some(200.0),
            height: Some(200.0),
            ..PosterOptions::default()
        },
        loader,
    )
    .unwrap();

    let hits = Arc::new(Mutex::new(Vec::new()));

    let handler = |name: &'static str, log: &Arc<Mutex<Vec<(String, f64, f64)>>>| {
        let log = log.clone();
        Arc::new(move |ev: &PointerEvent, _cfg: &ElementConfig| {
            log.lock().unwrap().push((name.to_owned(), ev.x, ev.y));
        }) as ClickHandler
    };

    let mut below = rect(Some("below"));
    below.box_props.width = Some(Dimension::Px(100.0));
    below.box_props.height = Some(Dimension::Px(100.0));
    below.on_click = Some(handler("below", &hits));

    let mut above = rect(Some("above"));
    above.box_props.left = Some(Dimension::Px(10.0));
    above.box_props.top = Some(Dimension::Px(10.0));
    above.box_props.width = Some(Dimension::Px(30.0));
    above.box_props.height = Some(Dimension::Px(30.0));
    above.on_click = Some(handler("above", &hits));

    poster
        .draw(vec![Element::Node(below), Element::Node(above)])
        .unwrap();

    // Display (100x100) doubles into design (200x200) for the region scan,
    // but handlers see the original display coordinates.
    assert!(poster.handle_pointer_event(&PointerEvent { x: 10.0, y: 10.0 }));
    assert!(poster.handle_pointer_event(&PointerEvent { x: 40.0, y: 40.0 }));
    assert!(!poster.handle_pointer_event(&PointerEvent { x: 99.0, y: 99.0 }));

    let log = hits.lock().unwrap();
    assert_eq!(log.as_slice(), [
        ("above".to_owned(), 10.0, 10.0),
        ("below".to_owned(), 40.0, 40.0),
    ]);
}

#[test]
fn relative_elements_render_at_absolute_positions() {
    let loader = CountingLoader::new(4, 4);
    let mut poster = poster(loader);

    let mut a = rect(Some("a"));
    a.box_props.left = Some(Dimension::Px(10.0));
    a.box_props.top = Some(Dimension::Px(10.0));
    a.box_props.width = Some(Dimension::Px(50.0));
    a.box_props.height = Some(Dimension::Px(50.0));

    let mut b = rect(Some("b"));
    b.relative_to = Some("a".to_owned());
    b.box_props.left = Some(Dimension::Px(5.0));
    b.box_props.top = Some(Dimension::Px(5.0));
    b.box_props.width = Some(Dimension::Px(10.0));
    b.box_props.height = Some(Dimension::Px(10.0));

    poster.draw(vec![Element::Node(a), Element::Node(b)]).unwrap();

    let fills = &poster.surface().fills;
    assert_eq!(fills.len(), 2);
    assert_eq!((fills[1].x, fills[1].y), (15.0, 15.0));
    assert_eq!((fills[1].width, fills[1].height), (10.0, 10.0));
}

#[test]
fn zero_height_text_paints_nothing() {
    let loader = CountingLoader::new(4, 4);
    let mut poster = poster(loader);

    let mut cfg = ElementConfig::new(ElementKind::Text(crate::config::model::TextConfig {
        content: crate::config::model::TextContent::Plain("hi".to_owned()),
        ..Default::default()
    }));
    cfg.box_props.width = Some(Dimension::Px(40.0));
    cfg.box_props.height = Some(Dimension::Px(0.0));

    poster.draw(vec![Element::Node(cfg)]).unwrap();

    assert!(poster.surface().texts.is_empty());
}

#[test]
fn measure_text_height_defaults_to_the_canvas_width() {
    let loader = CountingLoader::new(4, 4);
    let mut poster = poster(loader);

    let text = crate::config::model::TextConfig {
        content: crate::config::model::TextContent::Plain("aaaabbbb".to_owned()),
        style: crate::config::model::RunStyle {
            font_size: Some(20.0),
            ..Default::default()
        },
        ..Default::default()
    };

    // 80 px of text fits the 100 px canvas on one line.
    assert_eq!(poster.measure_text_height(&text, None).unwrap(), 24.0);
    // Constrained to 40 px it wraps into two lines.
    assert_eq!(poster.measure_text_height(&text, Some(40.0)).unwrap(), 48.0);
}
