//! # detwidth-settings
//!
//! Configuration management with layered sources for detwidth.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DetwidthSettings::default()`]
//! 2. **User file**: `~/.detwidth/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `DETWIDTH_*` overrides (highest priority)
//!
//! The settings decide where the external collaborator executables live,
//! where regex-mode artifacts are written, and the default log level.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
