//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{message, ConfigError, Error, Result};

use super::PrintConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use pointscan_print::load_config;
///
/// let config = load_config("print.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PrintConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(ConfigError::IoError(message(&e.to_string()))))?;

    debug!(path = %path.display(), "loaded print configuration");
    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<PrintConfig> {
    let config: PrintConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(message(e.message()))))?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}
