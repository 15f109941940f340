use super::*;
use serde_json::json;

const ALL: [Ease; 7] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn cubic_bezier_endpoints_and_range() {
    let curve = CubicBezier::new(0.54, 0.0, 1.0, 1.0).unwrap();
    assert_eq!(curve.apply(0.0), 0.0);
    assert_eq!(curve.apply(1.0), 1.0);

    let mut prev = 0.0;
    for i in 1..=20 {
        let y = curve.apply(f64::from(i) / 20.0);
        assert!((0.0..=1.0).contains(&y));
        assert!(y + 1e-9 >= prev, "not monotonic at step {i}");
        prev = y;
    }
}

#[test]
fn linear_bezier_is_identity() {
    let curve = CubicBezier::new(0.25, 0.25, 0.75, 0.75).unwrap();
    for x in [0.1, 0.3, 0.5, 0.9] {
        assert!((curve.apply(x) - x).abs() < 1e-6, "x={x}");
    }
}

#[test]
fn cubic_bezier_rejects_out_of_range_controls() {
    assert!(CubicBezier::new(0.5, -0.2, 0.5, 1.0).is_err());
    assert!(CubicBezier::new(1.5, 0.0, 0.5, 1.0).is_err());
}

#[test]
fn easing_parses_preset_names_and_bezier_objects() {
    let e: Easing = serde_json::from_value(json!("in_cubic")).unwrap();
    assert!(matches!(e, Easing::Preset(Ease::InCubic)));

    let e: Easing = serde_json::from_value(json!({ "cubic_bezier": [0.47, 0.0, 0.745, 0.715] }))
        .unwrap();
    assert!(matches!(e, Easing::CubicBezier(c) if c.x2 == 0.745));

    let err = serde_json::from_value::<Easing>(json!("wobbly")).unwrap_err();
    assert!(err.to_string().contains("unknown easing"));

    let err = serde_json::from_value::<Easing>(json!({ "cubic_bezier": [0.0, 2.0, 1.0, 1.0] }))
        .unwrap_err();
    assert!(err.to_string().contains("y1"));
}

#[test]
fn easing_serializes_to_its_json_form() {
    assert_eq!(
        serde_json::to_value(Easing::from(Ease::OutQuad)).unwrap(),
        json!("out_quad")
    );
    let curve = CubicBezier::new(0.0, 0.0, 1.0, 1.0).unwrap();
    assert_eq!(
        serde_json::to_value(Easing::from(curve)).unwrap(),
        json!({ "cubic_bezier": [0.0, 0.0, 1.0, 1.0] })
    );
    assert!(serde_json::to_value(Easing::custom(|t| t)).is_err());
}

#[test]
fn custom_easing_output_is_clamped() {
    let wild = Easing::custom(|t| t * 3.0 - 1.0);
    assert_eq!(wild.apply(0.0), 0.0);
    assert_eq!(wild.apply(1.0), 1.0);
    assert!((wild.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn easing_clamps_its_input() {
    let e = Easing::from(Ease::Linear);
    assert_eq!(e.apply(-1.0), 0.0);
    assert_eq!(e.apply(7.0), 1.0);
    assert_eq!(e.apply(f64::NAN), 0.0);
}
