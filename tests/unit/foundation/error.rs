use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RunonError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(RunonError::render("x").to_string().contains("render error:"));
    assert!(RunonError::gpu("x").to_string().contains("gpu error:"));
    assert!(
        RunonError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        RunonError::NoGeometry("ambit")
            .to_string()
            .starts_with("no geometry")
    );
    assert!(RunonError::MixedContent(3).to_string().contains("3 path commands"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RunonError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn short_message_keeps_first_line() {
    let err = RunonError::render("line one\nline two");
    assert_eq!(err.short_message(), "render error: line one");
}

#[test]
fn json_errors_map_to_serde() {
    let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: RunonError = bad.into();
    assert!(matches!(err, RunonError::Serde(_)));
}
