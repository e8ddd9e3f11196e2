use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SketchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SketchError::unsupported_encoding("x")
            .to_string()
            .contains("unsupported encoding:")
    );
    assert!(
        SketchError::encoder("x")
            .to_string()
            .contains("encoder error:")
    );
    assert!(SketchError::render("x").to_string().contains("render error:"));
    assert!(
        SketchError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SketchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: SketchError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SketchError::Serde(_)));
}
