use impulse_charger::error::ChargerError;

#[test]
fn error_constructors() {
    assert!(matches!(
        ChargerError::config("x"),
        ChargerError::Config { .. }
    ));
    assert!(matches!(
        ChargerError::validation("f", "m"),
        ChargerError::Validation { .. }
    ));
    assert!(matches!(
        ChargerError::serialization("x"),
        ChargerError::Serialization { .. }
    ));
    assert!(matches!(
        ChargerError::timeout("x"),
        ChargerError::Timeout { .. }
    ));
    assert!(matches!(
        ChargerError::generic("x"),
        ChargerError::Generic { .. }
    ));
}

#[test]
fn display_messages() {
    let e = ChargerError::validation("sampling.average_length", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
    assert!(s.contains("sampling.average_length"));
}

#[test]
fn serde_errors_convert() {
    let err = serde_json::from_str::<u32>("nope").unwrap_err();
    let e: ChargerError = err.into();
    assert!(matches!(e, ChargerError::Serialization { .. }));
}
