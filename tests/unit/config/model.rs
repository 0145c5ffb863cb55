use std::sync::Arc;

use super::*;
use crate::foundation::core::Size;

fn container(w: f64, h: f64) -> Size {
    Size {
        width: w,
        height: h,
    }
}

#[test]
fn dimension_deserializes_number_and_percent() {
    let d: Dimension = serde_json::from_str("12.5").unwrap();
    assert_eq!(d, Dimension::Px(12.5));

    let d: Dimension = serde_json::from_str("\"30%\"").unwrap();
    assert_eq!(d, Dimension::Percent(30.0));

    let d: Dimension = serde_json::from_str("\" 45.5 % \"").unwrap();
    assert_eq!(d, Dimension::Percent(45.5));

    assert!(serde_json::from_str::<Dimension>("\"30px\"").is_err());
    assert!(serde_json::from_str::<Dimension>("\"%\"").is_err());
}

#[test]
fn dimension_serializes_back_to_wire_forms() {
    assert_eq!(serde_json::to_string(&Dimension::Px(10.0)).unwrap(), "10.0");
    assert_eq!(
        serde_json::to_string(&Dimension::Percent(30.0)).unwrap(),
        "\"30%\""
    );
    assert!(serde_json::to_string(&Dimension::Calc(Arc::new(|_| 1.0))).is_err());
}

#[test]
fn dimension_resolves_per_axis() {
    let c = container(200.0, 100.0);
    assert_eq!(Dimension::Px(42.0).resolve(c, Axis::Horizontal), 42.0);
    assert_eq!(Dimension::Percent(50.0).resolve(c, Axis::Horizontal), 100.0);
    assert_eq!(Dimension::Percent(50.0).resolve(c, Axis::Vertical), 50.0);

    let calc = Dimension::Calc(Arc::new(|s: Size| s.width / 4.0));
    assert_eq!(calc.resolve(c, Axis::Horizontal), 50.0);

    let bad = Dimension::Calc(Arc::new(|_| f64::NAN));
    assert_eq!(bad.resolve(c, Axis::Horizontal), 0.0);
}

#[test]
fn callback_dimensions_compare_by_identity() {
    let f: Arc<dyn Fn(Size) -> f64 + Send + Sync> = Arc::new(|s: Size| s.width);
    let a = Dimension::Calc(f.clone());
    let b = Dimension::Calc(f);
    let c = Dimension::Calc(Arc::new(|s: Size| s.width));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn radius_clamps_to_half_shorter_side() {
    let parent = container(200.0, 200.0);
    let own = container(50.0, 40.0);
    assert_eq!(RadiusSpec::Px(100.0).resolve(parent, own), 20.0);
    assert_eq!(RadiusSpec::Px(5.0).resolve(parent, own), 5.0);
    assert_eq!(RadiusSpec::Percent(20.0).resolve(parent, own), 10.0);
    assert_eq!(RadiusSpec::Px(-3.0).resolve(parent, own), 0.0);
}

#[test]
fn radius_callbacks_see_container_and_self() {
    let radius = RadiusSpec::Calc(Arc::new(|parent: Size, own: Size| {
        (parent.width - own.width) / 10.0
    }));
    assert_eq!(
        radius.resolve(container(200.0, 200.0), container(100.0, 100.0)),
        10.0
    );
}

#[test]
fn line_height_resolves_against_font_size() {
    assert_eq!(LineHeight::Px(30.0).resolve(20.0), 30.0);
    assert_eq!(LineHeight::Percent(150.0).resolve(20.0), 30.0);
}

#[test]
fn element_config_deserializes_flattened_wire_format() {
    let json = r##"{
        "id": "title",
        "type": "rect",
        "left": 10,
        "top": "5%",
        "width": "50%",
        "height": 80,
        "backgroundColor": "#336699",
        "borderRadius": 8
    }"##;
    let cfg: ElementConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.id.as_deref(), Some("title"));
    assert_eq!(cfg.box_props.left, Some(Dimension::Px(10.0)));
    assert_eq!(cfg.box_props.top, Some(Dimension::Percent(5.0)));
    assert_eq!(cfg.box_props.width, Some(Dimension::Percent(50.0)));
    let ElementKind::Rect(rect) = &cfg.kind else {
        panic!("expected rect, got {:?}", cfg.kind);
    };
    assert!(rect.background_color.is_some());
    assert_eq!(rect.border_radius, Some(RadiusSpec::Px(8.0)));
    assert!(cfg.on_click.is_none());
}

#[test]
fn text_config_accepts_plain_and_runs() {
    let json = r#"{
        "type": "text",
        "content": "hello",
        "fontSize": 20,
        "textAlign": "center"
    }"#;
    let cfg: ElementConfig = serde_json::from_str(json).unwrap();
    let ElementKind::Text(text) = &cfg.kind else {
        panic!("expected text");
    };
    assert_eq!(text.content, TextContent::Plain("hello".to_owned()));
    assert_eq!(text.style.font_size, Some(20.0));
    assert_eq!(text.text_align, TextAlign::Center);
    assert_eq!(text.ellipsis_content, "...");

    let json = r#"{
        "type": "text",
        "content": [
            { "text": "big", "fontSize": 32 },
            { "text": "small" }
        ],
        "lineClamp": 2
    }"#;
    let cfg: ElementConfig = serde_json::from_str(json).unwrap();
    let ElementKind::Text(text) = &cfg.kind else {
        panic!("expected text");
    };
    let TextContent::Runs(runs) = &text.content else {
        panic!("expected runs");
    };
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].style.font_size, Some(32.0));
    assert_eq!(runs[1].style.font_size, None);
    assert_eq!(text.line_clamp, Some(2));
}

#[test]
fn validate_rejects_malformed_elements() {
    let empty_src = ElementConfig::new(ElementKind::Image(ImageConfig {
        src: "  ".to_owned(),
        crop: SourceCrop::default(),
        mode: FitMode::ScaleToFill,
        border: None,
        border_radius: None,
        flip_x: false,
        flip_y: false,
    }));
    assert!(empty_src.validate().is_err());

    let one_point = ElementConfig::new(ElementKind::Line(LineConfig {
        points: vec![[Dimension::Px(0.0), Dimension::Px(0.0)]],
        close_path: false,
        style: LineStyle::default(),
    }));
    assert!(one_point.validate().is_err());

    let mut spinner = ElementConfig::new(ElementKind::Rect(RectConfig::default()));
    spinner.rotate = Some(f64::INFINITY);
    assert!(spinner.validate().is_err());

    let clamp_zero = ElementConfig::new(ElementKind::Text(TextConfig {
        line_clamp: Some(0),
        ..TextConfig::default()
    }));
    assert!(clamp_zero.validate().is_err());

    let fine = ElementConfig::new(ElementKind::Rect(RectConfig::default()));
    assert!(fine.validate().is_ok());
}

#[test]
fn constructed_text_configs_carry_the_default_marker() {
    // Rust-side construction must match the wire default.
    assert_eq!(TextConfig::default().ellipsis_content, "...");
}

#[test]
fn label_prefers_id_over_index() {
    let mut cfg = ElementConfig::new(ElementKind::Rect(RectConfig::default()));
    assert_eq!(cfg.label(3), "#3");
    cfg.id = Some("hero".to_owned());
    assert_eq!(cfg.label(3), "hero");
}
