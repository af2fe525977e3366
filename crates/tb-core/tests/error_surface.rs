use tb_core::errors::{ErrorInfo, TbError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("value", "42")
        .with_context("expected", "0..9")
}

#[test]
fn validation_error_surface() {
    let err = TbError::Validation(sample_info("V001", "bad matrix"));
    assert_eq!(err.code(), "V001");
    assert!(err.info().context.contains_key("value"));
}

#[test]
fn provenance_error_renders_hint() {
    let err = TbError::Provenance(
        ErrorInfo::new("P001", "working tree is dirty").with_hint("pass --allow_dirty"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("provenance blocked: working tree is dirty"));
    assert!(rendered.contains("hint: pass --allow_dirty"));
}

#[test]
fn context_renders_in_key_order() {
    let err = TbError::Bounds(sample_info("B001", "coordinate out of range"));
    assert_eq!(
        err.to_string(),
        "bounds error: coordinate out of range (code: B001) | context: [expected=0..9, value=42]"
    );
}

#[test]
fn errors_round_trip_json() {
    let err = TbError::Unsupported(sample_info("U001", "unknown bond kind"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Unsupported\""));
    let decoded: TbError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
