//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`DetwidthSettings::default()`]
//! 2. If `~/.detwidth/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use detwidth_core::HeaderPosition;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::DetwidthSettings;

/// Overrides the directory collaborator executables resolve against.
pub const ENV_TOOLS_ROOT: &str = "DETWIDTH_TOOLS_ROOT";
/// Overrides `pipeline.dataDir`.
pub const ENV_DATA_DIR: &str = "DETWIDTH_DATA_DIR";
/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "DETWIDTH_LOG_LEVEL";
/// Overrides `pipeline.prunedHeader` (`first` or `last`).
pub const ENV_PRUNED_HEADER: &str = "DETWIDTH_PRUNED_HEADER";

/// Resolve the path to the settings file (`~/.detwidth/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".detwidth").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<DetwidthSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<DetwidthSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults deep-merged with the file at `path` (no env overrides).
pub fn load_file_layer(path: &Path) -> Result<DetwidthSettings> {
    let defaults = serde_json::to_value(DetwidthSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `DETWIDTH_*` environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut DetwidthSettings) {
    apply_overrides_with(settings, read_env_string);
}

/// Apply overrides using `lookup` as the variable source.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_overrides_with<F>(settings: &mut DetwidthSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_TOOLS_ROOT) {
        settings.tools.root = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup(ENV_DATA_DIR) {
        settings.pipeline.data_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup(ENV_LOG_LEVEL) {
        settings.logging.level = v;
    }
    if let Some(v) = lookup(ENV_PRUNED_HEADER) {
        match HeaderPosition::parse(&v) {
            Some(position) => settings.pipeline.pruned_header = position,
            None => {
                tracing::warn!(key = ENV_PRUNED_HEADER, value = %v, "invalid header position, ignoring");
            }
        }
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
