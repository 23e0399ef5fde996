//! Tests for configuration loading and validation.

use marker_common::{MarkerConfig, MarkerError, Rgb};
use std::io::Write;

// ============================================================================
// YAML / JSON parsing
// ============================================================================

#[test]
fn test_partial_yaml_overrides_defaults() {
    let yaml = r##"
transition:
  duration_ms: 600
  queue_depth: 4
palette:
  icon: "#112233"
"##;
    let config = MarkerConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.transition.duration_ms, 600);
    assert_eq!(config.transition.queue_depth, 4);
    // Untouched fields keep their defaults
    assert_eq!(config.transition.settle_delay_ms, 100);
    assert_eq!(config.palette.icon, Rgb::new(0x11, 0x22, 0x33));
    assert_eq!(config.palette.selected.marker, Rgb::new(57, 87, 189));
    assert_eq!(config.layout.min_marker_width, 40.0);
}

#[test]
fn test_json_config() {
    let json = r#"{"cache": {"enabled": false}, "layout": {"text_size": 14.0}}"#;
    let config = MarkerConfig::from_json_str(json).unwrap();
    assert!(!config.cache.enabled);
    assert_eq!(config.layout.text_size, 14.0);
}

#[test]
fn test_invalid_color_rejected() {
    let yaml = r#"
palette:
  icon: "not-a-color"
"#;
    let result = MarkerConfig::from_yaml_str(yaml);
    assert!(matches!(result, Err(MarkerError::InvalidConfig(_))));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_queue_depth_must_allow_overlap() {
    let yaml = "transition:\n  queue_depth: 1\n";
    let err = MarkerConfig::from_yaml_str(yaml).unwrap_err();
    assert!(err.to_string().contains("queue_depth"));
}

#[test]
fn test_budget_fraction_range() {
    let yaml = "cache:\n  budget_fraction: 1.5\n";
    assert!(MarkerConfig::from_yaml_str(yaml).is_err());
}

#[test]
fn test_icon_larger_than_circle_rejected() {
    let yaml = "layout:\n  icon_size: 30.0\n";
    assert!(MarkerConfig::from_yaml_str(yaml).is_err());
}

// ============================================================================
// File loading
// ============================================================================

#[test]
fn test_from_file_by_extension() {
    let mut yaml_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(yaml_file, "transition:\n  duration_ms: 250").unwrap();
    let config = MarkerConfig::from_file(yaml_file.path()).unwrap();
    assert_eq!(config.transition.duration_ms, 250);

    let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    writeln!(json_file, r#"{{"transition": {{"duration_ms": 300}}}}"#).unwrap();
    let config = MarkerConfig::from_file(json_file.path()).unwrap();
    assert_eq!(config.transition.duration_ms, 300);
}

#[test]
fn test_missing_file() {
    let result = MarkerConfig::from_file("/definitely/not/here.yaml");
    assert!(matches!(result, Err(MarkerError::Io(_))));
}
