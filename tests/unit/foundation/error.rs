use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BridgeError::memory("x")
            .to_string()
            .contains("memory error:")
    );
    assert!(
        BridgeError::descriptor("x")
            .to_string()
            .contains("descriptor error:")
    );
    assert!(BridgeError::dom("x").to_string().contains("dom error:"));
    assert!(
        BridgeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BridgeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BridgeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: BridgeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, BridgeError::Serde(_)));
}
