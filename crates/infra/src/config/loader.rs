//! Bridge configuration loader
//!
//! Loads the EXT credentials and layout names from environment variables or
//! files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STEWARD_EXT_SERVER`: EXT server address including scheme
//! - `STEWARD_EXT_DATABASE`: hosted database name
//! - `STEWARD_EXT_USERNAME`: bridge account username
//! - `STEWARD_EXT_PASSWORD`: bridge account password
//! - `STEWARD_EXT_LAYOUT_PROPERTIES`: property layout override (optional)
//! - `STEWARD_EXT_LAYOUT_SUBMISSIONS`: submission layout override (optional)
//! - `STEWARD_EXT_LAYOUT_COMMUNICATIONS`: communication layout override (optional)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `steward.{json,toml}` in the
//! working directory, two parent levels, and next to the executable.

use std::path::{Path, PathBuf};

use steward_domain::{BridgeConfig, BridgeError, LayoutConfig, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. The
/// result is validated either way: a bridge with missing credentials
/// reports `ConfigurationMissing` here, once, instead of per call.
pub fn load() -> Result<BridgeConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("bridge configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// The four credential variables are required; layout overrides are
/// optional and default to the standard layout names.
pub fn load_from_env() -> Result<BridgeConfig> {
    let server = env_var("STEWARD_EXT_SERVER")?;
    let database = env_var("STEWARD_EXT_DATABASE")?;
    let username = env_var("STEWARD_EXT_USERNAME")?;
    let password = env_var("STEWARD_EXT_PASSWORD")?;

    let defaults = LayoutConfig::default();
    let layouts = LayoutConfig {
        properties: env_or("STEWARD_EXT_LAYOUT_PROPERTIES", defaults.properties),
        submissions: env_or("STEWARD_EXT_LAYOUT_SUBMISSIONS", defaults.submissions),
        communications: env_or("STEWARD_EXT_LAYOUT_COMMUNICATIONS", defaults.communications),
    };

    Ok(BridgeConfig { server, database, username, password, layouts })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<BridgeConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BridgeError::ConfigurationMissing(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BridgeError::ConfigurationMissing(
                "no config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading bridge configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        BridgeError::ConfigurationMissing(format!("failed to read config file: {e}"))
    })?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, with the format detected by
/// file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<BridgeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BridgeError::ConfigurationMissing(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BridgeError::ConfigurationMissing(format!("invalid JSON format: {e}"))),
        _ => Err(BridgeError::ConfigurationMissing(format!(
            "unsupported config format: {extension}"
        ))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory (and two parent levels) and the
/// executable's directory for `config.{json,toml}` and
/// `steward.{json,toml}`, returning the first file found.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_names(&cwd));
        candidates.extend(candidate_names(&cwd.join("..")));
        candidates.extend(candidate_names(&cwd.join("../..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_names(exe_dir));
            candidates.extend(candidate_names(&exe_dir.join("..")));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_names(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("steward.json"),
        dir.join("steward.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        BridgeError::ConfigurationMissing(format!("missing required environment variable: {key}"))
    })
}

/// Optional environment variable with a default
fn env_or(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default)
}
