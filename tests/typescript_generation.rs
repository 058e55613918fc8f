//! TypeScript Generation Tests
//!
//! Validates that configuration and stream types can be exported to
//! TypeScript when the tauri feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_core_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, the types are configured for TypeScript export
    fn assert_type<T: Type>() {}

    assert_type::<hlstream::StreamConfig>();
    assert_type::<hlstream::config::PvConfig>();
    assert_type::<hlstream::StreamPort>();
    assert_type::<hlstream::Status>();
    assert_type::<hlstream::TimePreference>();
    assert_type::<hlstream::PvDecodedFormat>();
    assert_type::<hlstream::UpdateRate>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Types still compile without specta::Type
    let _ = hlstream::UpdateRate::Native;
    let _ = hlstream::StreamConfig::for_port(hlstream::StreamPort::PersonalVideo);
}
