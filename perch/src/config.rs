//! User configuration, read once at startup.
//!
//! The only setting is the colour theme:
//!
//! ```toml
//! # <config_dir>/perch/config.toml
//! theme = "catppuccin-mocha"
//! ```
//!
//! A missing or malformed file is never fatal; defaults are used and the
//! problem is logged.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { theme: DEFAULT_THEME.to_owned() }
    }
}

impl Config {
    /// Loads from the default location, falling back to defaults.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %path.display(), %err, "no config file, using defaults");
                return Self::default();
            }
        };
        Self::parse(&raw).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "config parse error, using defaults");
            Self::default()
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// `<config_dir>/perch/config.toml`, e.g. `~/.config/perch/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("perch").join("config.toml"))
}
