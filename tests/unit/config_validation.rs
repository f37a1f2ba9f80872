//! Unit tests for configuration validation.

use pointscan_print::config::{parse_config, validate_config, PrintConfig};
use pointscan_print::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[scan]
fov_x_um = 600.0
fov_y_um = 600.0
dwell_us = 5.0
flyback_us = 1094.0

[axial]
axis = "z"
step_um = 1.5

[limits.z]
min_nm = -5000000
max_nm = 5000000
"#;

    let config: PrintConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails when the axial axis has no limits entry.
#[test]
fn test_axial_axis_without_limits() {
    let toml_str = r#"
[axial]
axis = "zaxis"

[limits.z]
min_nm = -5000000
max_nm = 5000000
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::AxisNotFound(ref name))) if name.as_str() == "zaxis"
    ));
}

/// Test validation fails for a negative flyback time.
#[test]
fn test_negative_flyback() {
    let result = parse_config("[scan]\nflyback_us = -1.0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::Negative {
            field: "flyback_us",
            ..
        }))
    ));
}

/// Test validation fails for a zero channel amplitude.
#[test]
fn test_zero_amplitude() {
    let toml_str = r#"
[channels.power]
output = "Dev1/ao2"
amplitude_v = 0.0
"#;
    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::NotPositive { field: "power", .. }))
    ));
}

/// Test validation fails for a zero actuator scale.
#[test]
fn test_zero_actuator_scale() {
    let toml_str = r#"
[scan.fast_axis]
um_per_unit = 0.0
"#;
    assert!(parse_config(toml_str).is_err());
}

/// Test validation fails for inverted limits on any axis.
#[test]
fn test_inverted_limits() {
    let toml_str = r#"
[limits.z]
min_nm = -1000
max_nm = 1000

[limits.x]
min_nm = 500
max_nm = 500
"#;
    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidLimits { min: 500, max: 500 }))
    ));
}

/// Test that malformed TOML surfaces a parse error.
#[test]
fn test_malformed_toml() {
    assert!(matches!(
        parse_config("[scan\ndwell_us = 5"),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}
