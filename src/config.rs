use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::auth::StaticTokenResolver;
use crate::error::FitLabError;
use crate::logging::LogConfig;
use crate::recovery::RecoveryMergePolicy;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Muscle recovery bookkeeping
    pub recovery: RecoverySettings,

    /// Log output
    pub logging: LogConfig,

    /// Identity tokens
    pub auth: AuthSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Data directory path
    pub data_dir: PathBuf,

    /// SQLite document store; defaults to `fitlab.db` inside `data_dir`
    pub database_path: Option<PathBuf>,

    /// User id used when no identity token is given
    pub default_user: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_dir: default_data_dir(),
            database_path: None,
            default_user: "local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    pub merge_policy: RecoveryMergePolicy,
}

/// Static token table, token -> user id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub tokens: HashMap<String, String>,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fitlab")
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Load an existing file for `config --init`, or start from defaults when it is absent
    pub fn load_for_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check user ids named by the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        let valid_uid = |uid: &str| !uid.is_empty() && !uid.contains('/');

        if !valid_uid(self.settings.default_user.as_str()) {
            return Err(FitLabError::Configuration(format!(
                "settings.default_user '{}' is not a valid user id",
                self.settings.default_user
            )));
        }
        if let Some((token, uid)) = self
            .auth
            .tokens
            .iter()
            .find(|(token, uid)| token.is_empty() || !valid_uid(uid.as_str()))
        {
            return Err(FitLabError::Configuration(format!(
                "auth.tokens entry '{}' = '{}' needs a token and a valid user id",
                token, uid
            )));
        }
        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "Unreadable config, using defaults");
                Self::default()
            }
        }
    }

    /// Resolved SQLite database location
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .database_path
            .clone()
            .unwrap_or_else(|| self.settings.data_dir.join("fitlab.db"))
    }

    pub fn token_resolver(&self) -> StaticTokenResolver {
        StaticTokenResolver::new(self.auth.tokens.clone())
    }
}
