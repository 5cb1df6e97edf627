//! Redirector configuration.
//!
//! Settings live in a `config.toml` next to wherever the tool is run from
//! (or the directory passed with `--config-dir`). Stock defaults are
//! overridden by the file, and command line flags are applied as a last
//! layer on top:
//!
//! ```text
//! stock defaults  →  config.toml  →  --production-url / --site-url / --enable
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! production_url = ""       # Where images should be loaded from
//! enable_redirect = false   # Master switch
//! site_url = ""             # This site's own base URL
//! ```
//!
//! The defaults are inert: nothing is rewritten until both a production URL
//! is set and the switch is turned on. Unknown keys are rejected to catch
//! typos early.

use crate::types::RewriteConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings as stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectorConfig {
    /// Base URL of the production site, e.g. `https://example.com`.
    /// Empty means "not configured".
    pub production_url: String,
    /// Whether image URLs should be redirected at all.
    pub enable_redirect: bool,
    /// Base URL of the site being served, used to recognise absolute URLs
    /// that point at it. Empty disables that check.
    pub site_url: String,
}

impl RedirectorConfig {
    /// Trim whitespace the way the settings form does on save.
    pub fn sanitize(mut self) -> Self {
        self.production_url = self.production_url.trim().to_string();
        self.site_url = self.site_url.trim().to_string();
        self
    }

    /// Validate URL fields. Empty values are allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("production_url", &self.production_url),
            ("site_url", &self.site_url),
        ] {
            if !value.is_empty() && !is_http_url(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must start with http:// or https:// (got {value:?})"
                )));
            }
        }
        Ok(())
    }

    /// The per-call settings the rewrite functions take.
    pub fn rewrite_config(&self) -> RewriteConfig {
        RewriteConfig::new(self.enable_redirect, self.production_url.clone())
    }

    /// Whether this configuration will actually rewrite anything.
    pub fn is_active(&self) -> bool {
        self.rewrite_config().should_redirect()
    }
}

fn is_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme))
}

/// Command line values that override the file, applied as the last layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub production_url: Option<String>,
    pub site_url: Option<String>,
    pub enable_redirect: Option<bool>,
}

impl Overrides {
    /// Render as a TOML table so it merges like any other layer.
    pub fn to_value(&self) -> Option<toml::Value> {
        let mut table = toml::map::Map::new();
        if let Some(url) = &self.production_url {
            table.insert("production_url".into(), toml::Value::String(url.clone()));
        }
        if let Some(url) = &self.site_url {
            table.insert("site_url".into(), toml::Value::String(url.clone()));
        }
        if let Some(enabled) = self.enable_redirect {
            table.insert("enable_redirect".into(), toml::Value::Boolean(enabled));
        }
        (!table.is_empty()).then_some(toml::Value::Table(table))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RedirectorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Apply each present layer over `base`, then deserialize, sanitize and
/// validate.
pub fn resolve_config(
    base: toml::Value,
    layers: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<RedirectorConfig, ConfigError> {
    let merged = layers.into_iter().flatten().fold(base, merge_toml);
    let config: RedirectorConfig = merged.try_into()?;
    let config = config.sanitize();
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in `dir`, with `overrides` on top.
pub fn load_config(dir: &Path, overrides: &Overrides) -> Result<RedirectorConfig, ConfigError> {
    let file = load_raw_config(dir)?;
    resolve_config(stock_defaults_value(), [file, overrides.to_value()])
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Redirector Configuration
# ==============================
# All settings are optional. Values shown below are the defaults, which
# leave every image URL untouched.
#
# Command line flags (--production-url, --site-url, --enable/--disable)
# override whatever is set here.
# Unknown keys will cause an error.

# Full URL of the production site images should be loaded from,
# e.g. "https://example.com". Leave empty to disable redirection.
production_url = ""

# Turn image URL redirection on or off.
enable_redirect = false

# This site's own base URL, e.g. "http://example.local". Absolute image
# URLs starting with it are rewritten to the production site. Leave empty
# to rewrite relative URLs only.
site_url = ""
"##
}
