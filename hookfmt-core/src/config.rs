//! Configuration management for hookfmt

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::destination::{DestinationValidator, DEFAULT_ALLOWED_DOMAINS};
use crate::payload::{DisplayMode, PayloadBuilder};

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "HOOKFMT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub destination: DestinationConfig,
    pub presentation: PresentationConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub allowed_domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Top-level message text, shown in notifications.
    pub notification_text: String,
    /// Header above the annotated YAML.
    pub header_text: String,
    /// Side-bar color in attachments mode.
    pub accent_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Mode used when a request does not name one.
    pub mode: DisplayMode,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            allowed_domains: DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            notification_text: "🚨 Alert Notification".to_string(),
            header_text: "📋 Alert Details".to_string(),
            accent_color: "#ff6b6b".to_string(),
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "hookfmt")
            .map(|proj_dirs| proj_dirs.config_dir().join("hookfmt.toml"))
    }

    /// Load configuration, falling back to defaults if no file exists.
    ///
    /// `HOOKFMT_CONFIG` takes precedence over the platform config path.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let perms = metadata.permissions();
            if perms.mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.destination.allowed_domains.is_empty() {
            log::warn!(
                "{} allows no destination domains; every request will be rejected",
                path.display()
            );
        }
        log::info!("loaded config from {}", path.display());

        Ok(config)
    }

    pub fn validator(&self) -> DestinationValidator {
        DestinationValidator::new(self.destination.allowed_domains.iter().cloned())
    }

    pub fn payload_builder(&self) -> PayloadBuilder {
        PayloadBuilder::new(self.presentation.clone())
    }
}
