//! Unit tests for TOML configuration parsing.

use pointscan_print::config::{load_config, AxialDirection, Channel, PrintConfig};

/// Test parsing a full scan section from TOML.
#[test]
fn test_parse_scan_config() {
    let toml_str = r#"
[scan]
fov_x_um = 500.0
fov_y_um = 400.0
dwell_us = 4.0
flyback_us = 800.0
zero_dose_tolerance = 1e-6
skip_dark_rows = true

[scan.fast_axis]
um_per_unit = 613.0
max_drive = 1.0

[scan.slow_axis]
um_per_unit = 748.0
"#;

    let config: PrintConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.scan.fov_x.0, 500.0);
    assert_eq!(config.scan.fov_y.0, 400.0);
    assert_eq!(config.scan.dwell_us, 4.0);
    assert_eq!(config.scan.blanking_samples(), 200);
    assert_eq!(config.scan.zero_dose_tolerance, 1e-6);
    assert!(config.scan.skip_dark_rows);
    assert_eq!(config.scan.slow_axis.um_per_unit, 748.0);
    assert_eq!(config.scan.slow_axis.max_drive, 1.0);
}

/// Test parsing axial stepping and channel mapping.
#[test]
fn test_parse_axial_and_channels() {
    let toml_str = r#"
[axial]
axis = "zaxis"
step_um = 0.75
direction = "down"
settle_us = 250
return_on_complete = false

[channels.fast_axis]
output = "Dev2/ao0"
amplitude_v = 1.2

[channels.slow_axis]
output = "Dev2/ao1"
amplitude_v = 1.2

[channels.power]
output = "Dev2/ao2"
amplitude_v = 2.5

[limits.zaxis]
min_nm = -2500000
max_nm = 2500000
"#;

    let config: PrintConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.axial.axis.as_str(), "zaxis");
    assert_eq!(config.axial.step.0, 0.75);
    assert_eq!(config.axial.direction, AxialDirection::Down);
    assert_eq!(config.axial.settle_us, 250);
    assert!(!config.axial.return_on_complete);
    assert_eq!(config.axial.tolerance, None);

    assert_eq!(config.channels.get(Channel::Power).output.as_str(), "Dev2/ao2");
    assert_eq!(config.channels.get(Channel::Power).amplitude, 2.5);

    let limits = config.axial_limits().expect("axial limits");
    assert_eq!(limits.min.0, -2_500_000);
    assert_eq!(limits.max.0, 2_500_000);
}

/// Test that omitted sections fall back to the instrument defaults.
#[test]
fn test_defaults_fill_missing_sections() {
    let config: PrintConfig = toml::from_str("[axial]\nstep_um = 2.0\n").expect("Failed to parse TOML");

    assert_eq!(config.axial.step.0, 2.0);
    assert_eq!(config.axial.axis.as_str(), "z");
    assert_eq!(config.scan.fov_x.0, 650.0);
    assert_eq!(config.scan.blanking_samples(), 218);
    assert_eq!(config.channels.get(Channel::FastAxis).amplitude, 1.4);
    assert_eq!(config.axis_names().count(), 3);
}

/// Test that unknown direction strings are rejected.
#[test]
fn test_invalid_direction_rejected() {
    let result: Result<PrintConfig, _> = toml::from_str("[axial]\ndirection = \"sideways\"\n");
    assert!(result.is_err());
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("pointscan_print_{}.toml", std::process::id()));
    std::fs::write(&path, "[scan]\ndwell_us = 2.0\n").expect("write temp config");

    let config = load_config(&path).expect("load config");
    assert_eq!(config.scan.dwell_us, 2.0);

    let _ = std::fs::remove_file(&path);
}

/// Test that a missing file reports an I/O error.
#[test]
fn test_load_config_missing_file() {
    let result = load_config("/nonexistent/print.toml");
    assert!(matches!(
        result,
        Err(pointscan_print::Error::Config(pointscan_print::error::ConfigError::IoError(_)))
    ));
}
