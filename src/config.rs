//! Editor configuration module.
//!
//! Handles loading, validating, and merging `album.toml`. Stock defaults are
//! the base layer; the user's file overrides any subset of keys; CLI flags
//! are applied last by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [layout]
//! paper_size = "a4"          # a4 | letter
//! orientation = "portrait"   # portrait | landscape
//! photos_per_page = 4
//!
//! [export]
//! output = "photo-album.pdf"
//! scale = 2.0                # raster device scale
//! quality = 100              # JPEG quality (1-100)
//! background = "#ffffff"
//!
//! [cache]
//! enabled = true
//! dir = ".simple-album-cache"
//! max_age_secs = 86400       # re-download older photos
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{Orientation, PaperSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "album.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `album.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlbumConfig {
    /// Photo server location.
    pub server: ServerConfig,
    /// Paper, orientation and grid density.
    pub layout: LayoutConfig,
    /// PDF export settings.
    pub export: ExportConfig,
    /// Local cache of downloaded photos.
    pub cache: CacheConfig,
    /// Log filter and format.
    pub logging: LoggingConfig,
}

impl AlbumConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.base_url must not be empty".into(),
            ));
        }
        if self.layout.photos_per_page == 0 {
            return Err(ConfigError::Validation(
                "layout.photos_per_page must be at least 1".into(),
            ));
        }
        if !(self.export.scale > 0.0 && self.export.scale <= 8.0) {
            return Err(ConfigError::Validation(
                "export.scale must be in (0, 8]".into(),
            ));
        }
        if self.export.quality == 0 || self.export.quality > 100 {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        if parse_hex_color(&self.export.background).is_none() {
            return Err(ConfigError::Validation(format!(
                "export.background is not a #rrggbb color: {}",
                self.export.background
            )));
        }
        if self.export.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.output must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Photo server location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL; `/photos-list`, `/update-dates` and `/photos/<name>` hang off it.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Page layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub photos_per_page: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            photos_per_page: 4,
        }
    }
}

/// PDF export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output file path.
    pub output: String,
    /// Raster device scale: bitmap pixels per CSS pixel.
    pub scale: f32,
    /// JPEG quality of the embedded page images.
    pub quality: u32,
    /// Page background, `#rrggbb`.
    pub background: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: "photo-album.pdf".to_string(),
            scale: 2.0,
            quality: 100,
            background: "#ffffff".to_string(),
        }
    }
}

/// Photo download cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: String,
    /// Entries older than this are downloaded again.
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: ".simple-album-cache".to_string(),
            max_age_secs: 86_400,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"simple_album=debug,warn"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) into RGB bytes.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AlbumConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AlbumConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AlbumConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file, falling back to stock defaults when it's absent.
pub fn load_config(path: &Path) -> Result<AlbumConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `album.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Album Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Photo server
# ---------------------------------------------------------------------------
[server]
# Serves GET /photos-list, POST /update-dates and GET /photos/<name>.
base_url = "http://localhost:8000"
timeout_secs = 30

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# a4 (210 x 297 mm) or letter (215.9 x 279.4 mm).
paper_size = "a4"
# portrait or landscape.
orientation = "portrait"
# Photos on each page. Up to 2 are stacked in one column, more use two.
photos_per_page = 4

# ---------------------------------------------------------------------------
# PDF export
# ---------------------------------------------------------------------------
[export]
output = "photo-album.pdf"
# Bitmap pixels per CSS pixel when rasterizing a page.
scale = 2.0
# JPEG quality of each embedded page (1-100).
quality = 100
# Page background behind and between photos.
background = "#ffffff"

# ---------------------------------------------------------------------------
# Photo cache
# ---------------------------------------------------------------------------
[cache]
enabled = true
dir = ".simple-album-cache"
# Photos cached longer than this (seconds) are downloaded again, so
# photos replaced on the server show up in later exports.
max_age_secs = 86400

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter directive; RUST_LOG overrides it.
level = "info"
json = false
"##
}
