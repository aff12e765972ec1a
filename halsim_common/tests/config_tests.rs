//! # Configuration Loading Tests
//!
//! `SimConfig` loaded from files on disk through the `ConfigLoader`
//! blanket trait.

use halsim_common::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[shared]
log_level = "debug"
service_name = "halsim-bench-01"

[registry]
notify = "on_change"

[capacities]
accelerometer = 4
ctre_pcm = 2
"#,
    );

    let config = SimConfig::load(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "halsim-bench-01");
    assert_eq!(config.registry.notify, NotifyPolicy::OnChange);
    assert_eq!(config.capacities.accelerometer, 4);
    assert_eq!(config.capacities.ctre_pcm, 2);
    assert_eq!(config.capacities.spi, Capacities::default().spi);
}

#[test]
fn test_load_rejects_unknown_section() {
    let file = write_config("[physics]\ngravity = 9.8\n");
    assert!(matches!(
        SimConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_loaded_config_fails_validation() {
    let file = write_config(&format!(
        "[capacities]\njoystick = {}\n",
        MAX_SLOTS_PER_TABLE + 1
    ));
    let config = SimConfig::load(file.path()).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(msg)) if msg.contains("joystick")
    ));
}

#[test]
fn test_bad_notify_policy() {
    let file = write_config("[registry]\nnotify = \"sometimes\"\n");
    assert!(matches!(
        SimConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_shipped_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/halsim.toml");
    let config = SimConfig::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.shared.service_name, "halsim");
}
