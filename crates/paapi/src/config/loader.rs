//! Configuration loader
//!
//! Loads PA API connection settings from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PAAPI_USERNAME`: Account username (required)
//! - `PAAPI_PASSWORD`: Account password (required)
//! - `PAAPI_REALM`: Realm sent with every API request (required)
//! - `PAAPI_BASIC_AUTH`: Pre-encoded client credentials for the token request
//! - `PAAPI_AUTH_URL`: Identity-provider base URL
//! - `PAAPI_API_URL`: Resource API base URL
//! - `PAAPI_TIMEOUT_SECS`: Request timeout in seconds
//! - `PAAPI_ACCEPT_INVALID_CERTS`: Accept invalid TLS certificates (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./paapi.json` or `./paapi.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use super::types::PaApiConfig;
use crate::error::{PaApiError, Result};

const REQUIRED_ENV_VARS: [&str; 3] = ["PAAPI_USERNAME", "PAAPI_PASSWORD", "PAAPI_REALM"];

const CONFIG_FILE_NAMES: [&str; 4] = ["paapi.json", "paapi.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Uses environment variables when all required ones are set. If any
/// required variable is missing, falls back to loading from a config file.
/// An invalid value in a complete environment is reported as-is.
///
/// # Errors
/// Returns `PaApiError::Config` if:
/// - An environment value is invalid
/// - No config file is found when the environment is incomplete
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load() -> Result<PaApiConfig> {
    let missing: Vec<&str> =
        REQUIRED_ENV_VARS.into_iter().filter(|key| std::env::var_os(key).is_none()).collect();

    if !missing.is_empty() {
        tracing::debug!(?missing, "Environment incomplete, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PaApiError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<PaApiConfig> {
    let mut config = PaApiConfig::new(
        env_var("PAAPI_REALM")?,
        env_var("PAAPI_USERNAME")?,
        env_var("PAAPI_PASSWORD")?,
    );

    config.basic_auth = std::env::var("PAAPI_BASIC_AUTH").ok().filter(|v| !v.is_empty());
    if let Ok(url) = std::env::var("PAAPI_AUTH_URL") {
        config.auth_url = url;
    }
    if let Ok(url) = std::env::var("PAAPI_API_URL") {
        config.api_url = url;
    }
    if let Ok(timeout) = std::env::var("PAAPI_TIMEOUT_SECS") {
        config.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| PaApiError::Config(format!("Invalid timeout: {e}")))?;
    }
    config.accept_invalid_certs = env_bool("PAAPI_ACCEPT_INVALID_CERTS", false);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations with
/// [`probe_config_paths`]. JSON and TOML are detected by file extension.
///
/// # Errors
/// Returns `PaApiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<PaApiConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PaApiError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PaApiError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PaApiError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, by the extension of `path`
fn parse_config(contents: &str, path: &Path) -> Result<PaApiConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PaApiError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PaApiError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PaApiError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Returns the first file that exists, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PaApiError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
