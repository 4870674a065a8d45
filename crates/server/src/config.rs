//! Server settings.
//!
//! Read from the JSON file named by `PITH_CONFIG` (when set), then
//! overridden by `PITH_*` environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

use pith_core::TranscodeProfile;
use pith_files::FilesConfig;
use pith_sonarr::SonarrConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
    #[error("max_age_for_new must be between 0 and {max} days, got {value}")]
    MaxAge { value: i64, max: i64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    /// Base URL clients reach this server at; stream URLs are built on it.
    pub root_url: String,
    pub db_path: String,
    /// Days an episode counts as new after being scanned.
    pub max_age_for_new: i64,
    pub enrichment_timeout_secs: u64,
    pub remote_timeout_secs: u64,
    pub files: FilesConfig,
    pub sonarr: SonarrConfig,
    pub transcoder: TranscoderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3333".into(),
            root_url: "http://localhost:3333/".into(),
            db_path: "pith.db".into(),
            max_age_for_new: 14,
            enrichment_timeout_secs: 10,
            remote_timeout_secs: 30,
            files: FilesConfig::default(),
            sonarr: SonarrConfig::default(),
            transcoder: TranscoderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscoderSettings {
    pub ffprobe_path: PathBuf,
    /// Extra or replacement profiles, layered over the built-in ones.
    pub profiles: HashMap<String, TranscodeProfile>,
}

impl Default for TranscoderSettings {
    fn default() -> Self {
        Self {
            ffprobe_path: PathBuf::from("ffprobe"),
            profiles: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let days = self.max_age_for_new;
        if days < 0 || chrono::TimeDelta::try_days(days).is_none() {
            return Err(ConfigError::MaxAge {
                value: days,
                max: chrono::TimeDelta::MAX.num_days(),
            });
        }
        Ok(())
    }

    /// Load from `PITH_CONFIG` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match std::env::var_os("PITH_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path, source })?;
                Self::from_json(&json)?
            }
            None => Self::default(),
        };
        settings.apply_env(|var| std::env::var(var).ok())?;
        Ok(settings)
    }

    /// Apply `PITH_BIND`, `PITH_ROOT_URL`, `PITH_DB`, `PITH_ROOT_DIR` and
    /// `PITH_MAX_AGE_FOR_NEW` overrides.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("PITH_BIND") {
            self.bind_address = v;
        }
        if let Some(v) = lookup("PITH_ROOT_URL") {
            self.root_url = v;
        }
        if let Some(v) = lookup("PITH_DB") {
            self.db_path = v;
        }
        if let Some(v) = lookup("PITH_ROOT_DIR") {
            self.files.root_dir = v.into();
        }
        if let Some(v) = lookup("PITH_MAX_AGE_FOR_NEW") {
            self.max_age_for_new = v.parse().map_err(|_| ConfigError::Env {
                var: "PITH_MAX_AGE_FOR_NEW",
                value: v,
            })?;
        }
        self.validate()
    }

    /// Window in which a scanned episode counts as new. Out-of-range values
    /// saturate.
    pub fn max_age_for_new(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::try_days(self.max_age_for_new.max(0)).unwrap_or(chrono::TimeDelta::MAX)
    }

    pub fn enrichment_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.enrichment_timeout_secs)
    }

    pub fn remote_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.remote_timeout_secs)
    }
}
