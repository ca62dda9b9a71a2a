//! Config Validation Tests
//!
//! Typo detection and value validation for `crosswalk.toml`, exercised
//! through the public config API independently from the controller.

use crosswalk_signal::config::validation::{
    known_config_keys, suggest_correction, validate_unknown_keys,
};
use crosswalk_signal::config::{ConfigError, CrosswalkConfig};
use crosswalk_signal::controller::ControllerOptions;
use crosswalk_signal::logging::LogFormat;
use std::io::Write;
use std::time::Duration;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_section_name_warns_with_suggestion() {
    let warnings = validate_unknown_keys("[signl]\nphase_duration_secs = 10\n");
    let section = warnings
        .iter()
        .find(|w| w.field == "signl")
        .expect("section typo should warn");
    assert_eq!(section.suggestion.as_deref(), Some("signal"));
}

#[test]
fn typo_in_capacity_key_suggests_correct_spelling() {
    let warnings = validate_unknown_keys("[broadcast]\nchanel_capacity = 8\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("broadcast.channel_capacity")
    );
}

#[test]
fn far_off_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
}

#[test]
fn typos_do_not_fail_loading() {
    let config = CrosswalkConfig::from_toml_str(
        r#"
        [signal]
        phase_duraton_secs = 30
        tick_interval_ms = 500
        "#,
    )
    .expect("unknown keys are warnings, not errors");
    // The misspelled key is ignored, so D stays at its default.
    assert_eq!(config.signal.phase_duration_secs, 10);
    assert_eq!(config.signal.tick_interval_ms, 500);
}

// ============================================================================
// Value Validation
// ============================================================================

#[test]
fn tick_interval_below_minimum_is_rejected() {
    let err = CrosswalkConfig::from_toml_str("[signal]\ntick_interval_ms = 5\n").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("tick_interval_ms"));
}

#[test]
fn hostname_address_is_rejected() {
    let err =
        CrosswalkConfig::from_toml_str("[server]\naddr = \"localhost:3000\"\n").unwrap_err();
    assert!(err.to_string().contains("server.addr"));
}

#[test]
fn unknown_log_format_is_parse_error() {
    let err = CrosswalkConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn full_file_maps_onto_controller_options() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[signal]
phase_duration_secs = 15
tick_interval_ms = 250

[server]
addr = "127.0.0.1:4000"

[broadcast]
channel_capacity = 16
command_queue_capacity = 32

[logging]
format = "json"
"#
    )
    .unwrap();

    let config = CrosswalkConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.server.addr, "127.0.0.1:4000");

    let options = ControllerOptions::from(&config);
    assert_eq!(options.phase_duration, 15);
    assert_eq!(options.tick_period, Duration::from_millis(250));
    assert_eq!(options.channel_capacity, 16);
    assert_eq!(options.queue_capacity, 32);
}
