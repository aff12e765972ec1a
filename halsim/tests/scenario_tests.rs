//! # Scenario Integration Tests
//!
//! Scenarios loaded from disk and run against a fresh context, the way the
//! `halsim` binary does it.

use halsim::{Scenario, SimContext, SimError};
use halsim_common::config::{ConfigError, ConfigLoader, SimConfig};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_scenario_file_round_trip_through_snapshot() {
    let file = write_temp(
        r#"
        name = "led frame"

        [[watch]]
        category = "addressable_led"
        slot = 0

        [[step]]
        action = "set"
        category = "addressable_led"
        slot = 0
        property = "initialized"
        value = true

        [[step]]
        action = "set"
        category = "addressable_led"
        slot = 0
        property = "output_port"
        value = 2

        [[step]]
        action = "set_buffer"
        category = "addressable_led"
        slot = 0
        buffer = "data"
        bytes = [0, 0, 255, 0]
        "#,
    );

    let ctx = SimContext::new(&SimConfig::default()).unwrap();
    let scenario = Scenario::load(file.path()).unwrap();
    let report = scenario.run(&ctx).unwrap();
    assert_eq!(report.steps, 3);
    // Buffers are not part of register_all.
    assert_eq!(report.notifications, 2);
    assert_eq!(ctx.addressable_led().find_by_routing_key(2), Some(0));

    let json = serde_json::to_value(ctx.snapshot()).unwrap();
    let led = json["tables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["category"] == "addressable_led")
        .unwrap();
    assert_eq!(led["slots"][0]["properties"]["output_port"], 2);
    assert_eq!(led["slots"][0]["buffers"]["data"][2], 255);
}

#[test]
fn test_shipped_sample_scenario_runs() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let config = SimConfig::load(&root.join("config/halsim.toml")).unwrap();
    let ctx = SimContext::new(&config).unwrap();
    let scenario = Scenario::load(&root.join("scenarios/match_start.toml")).unwrap();
    let report = scenario.run(&ctx).unwrap();
    assert!(report.steps > 0);
}

#[test]
fn test_unknown_action_is_parse_error() {
    let file = write_temp(
        r#"
        [[step]]
        action = "explode"
        "#,
    );
    assert!(matches!(
        Scenario::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_missing_scenario_file() {
    assert!(matches!(
        Scenario::load(Path::new("/nonexistent/scenario.toml")),
        Err(ConfigError::FileNotFound)
    ));
}

#[test]
fn test_buffer_overflow_step_fails() {
    let bytes = vec!["0"; 1025].join(", ");
    let file = write_temp(&format!(
        r#"
        [[step]]
        action = "set_buffer"
        category = "spi"
        slot = 0
        buffer = "data"
        bytes = [{bytes}]
        "#
    ));
    let ctx = SimContext::new(&SimConfig::default()).unwrap();
    let scenario = Scenario::load(file.path()).unwrap();
    assert!(matches!(
        scenario.run(&ctx),
        Err(SimError::BufferOverflow { len: 1025, max: 1024, .. })
    ));
}
