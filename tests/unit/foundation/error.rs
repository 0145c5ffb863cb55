use super::*;

#[test]
fn helper_constructors_pick_variants() {
    assert!(matches!(
        PlacardError::configuration("x"),
        PlacardError::Configuration(_)
    ));
    assert!(matches!(PlacardError::element("x"), PlacardError::Element(_)));
    assert!(matches!(
        PlacardError::resource_load("x"),
        PlacardError::ResourceLoad(_)
    ));
}

#[test]
fn display_carries_the_message() {
    let err = PlacardError::element("line needs at least two points");
    assert_eq!(
        err.to_string(),
        "element error: line needs at least two points"
    );

    let err = PlacardError::Cycle("badge".to_owned());
    assert_eq!(
        err.to_string(),
        "relative positioning cycle at element 'badge'"
    );
}

#[test]
fn anyhow_errors_convert_to_other() {
    let err: PlacardError = anyhow::anyhow!("boom").into();
    assert!(matches!(err, PlacardError::Other(_)));
    assert_eq!(err.to_string(), "boom");
}
