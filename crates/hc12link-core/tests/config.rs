use hc12link_core::config::{ConfigError, LinkConfig};
use pretty_assertions::assert_eq;

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("link.json");

    let mut config = LinkConfig::new(24);
    config.port_name = "/dev/ttyUSB0".to_string();
    config.use_checksum = true;
    config.transfer_delay_ms = 40;
    config.timing.cmd_ms = 120;
    config.save(&path).unwrap();

    let loaded = LinkConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("link.json");
    std::fs::write(&path, r#"{"message_capacity": 300, "use_checksum": true}"#).unwrap();

    assert!(matches!(
        LinkConfig::load(&path),
        Err(ConfigError::CapacityTooLargeForChecksum { capacity: 300, max: 255 })
    ));
}

#[test]
fn test_load_reports_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("link.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(LinkConfig::load(&path), Err(ConfigError::JsonError(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = LinkConfig::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_error_messages() {
    let err = ConfigError::UnsupportedBaudRate(14400);
    assert_eq!(err.to_string(), "Unsupported baud rate: 14400");
}
