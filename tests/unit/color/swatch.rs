use super::*;
use serde_json::json;

#[test]
fn parses_named_gradient() {
    let s: Swatch = serde_json::from_value(json!({
        "name": "Dusk",
        "gradient": ["#19547b", "#ffd89b"]
    }))
    .unwrap();
    assert_eq!(s.name(), "Dusk");
    assert_eq!(s.stops(), &[Rgb::new(25, 84, 123), Rgb::new(255, 216, 155)]);
}

#[test]
fn name_is_optional() {
    let s: Swatch = serde_json::from_value(json!({ "gradient": ["#000", "#fff"] })).unwrap();
    assert_eq!(s.name(), "");
    assert_eq!(s.stops().len(), 2);
}

#[test]
fn rejects_single_stop_and_bad_hex() {
    let err = serde_json::from_value::<Swatch>(json!({ "gradient": ["#000000"] })).unwrap_err();
    assert!(err.to_string().contains("at least 2 colors"));

    let err = Swatch::new("x", &["#000000", "#zzzzzz"]).unwrap_err();
    assert!(matches!(err, TesseraError::Validation(_)));
    assert!(err.to_string().contains("swatch \"x\""));
}

#[test]
fn serializes_back_to_hex() {
    let s = Swatch::new("Mono", &["#000000", "#FFFFFF"]).unwrap();
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(
        v,
        json!({ "name": "Mono", "gradient": ["#000000", "#ffffff"] })
    );
}

#[test]
fn builtin_swatches_all_parse() {
    let all = default_swatches();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].name(), "Deep Sea Space");
    assert!(all.iter().all(|s| s.stops().len() == 2));
}
