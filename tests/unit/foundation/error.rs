use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TesseraError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TesseraError::invariant("x")
            .to_string()
            .contains("invariant violation:")
    );
    assert!(
        TesseraError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        TesseraError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TesseraError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: TesseraError = serde_json::from_str::<u32>("not json").unwrap_err().into();
    assert!(matches!(err, TesseraError::Serde(_)));
}

#[test]
fn within_prefixes_validation_messages_only() {
    let err = TesseraError::validation("bad").within("field");
    assert_eq!(err.to_string(), "validation error: field: bad");

    let err = TesseraError::render("bad").within("field");
    assert_eq!(err.to_string(), "render error: bad");
}
