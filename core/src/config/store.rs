//! Configuration Store
//!
//! Loads the TOML config file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{MeetbotError, Result};
use crate::resolver::CandidateSelection;

/// Unified meetbot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Webhook server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Temporal resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Input validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MeetbotError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => MeetbotError::Io(e),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| MeetbotError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the explicit path if given, else the first config file found in
    /// the standard locations, else defaults. Environment overrides apply on
    /// top in every case.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match super::find_config_file() {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// `MEETBOT_BIND` replaces the server bind address.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("MEETBOT_BIND") {
            if !bind.trim().is_empty() {
                self.server.bind = bind.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolver.timeout_ms == 0 {
            return Err(MeetbotError::InvalidConfig {
                message: "resolver.timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.resolver.backend == ResolverBackend::Duckling && self.resolver.duckling_url.is_none() {
            return Err(MeetbotError::InvalidConfig {
                message: "resolver.duckling_url is required for the duckling backend".to_string(),
            });
        }
        Ok(())
    }
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5055".to_string()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResolverBackend {
    /// In-process rule resolver
    #[default]
    Builtin,
    /// External Duckling server
    Duckling,
}

impl std::str::FromStr for ResolverBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "builtin" => Ok(ResolverBackend::Builtin),
            "duckling" => Ok(ResolverBackend::Duckling),
            other => Err(format!("unknown resolver backend: {}", other)),
        }
    }
}

/// Temporal resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    #[serde(default)]
    pub backend: ResolverBackend,

    /// Upper bound on a single resolver call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Which candidate wins when a phrase parses several ways
    #[serde(default)]
    pub selection: CandidateSelection,

    /// Base URL of the Duckling server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duckling_url: Option<String>,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// IANA timezone passed to Duckling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            backend: ResolverBackend::default(),
            timeout_ms: default_timeout_ms(),
            selection: CandidateSelection::default(),
            duckling_url: None,
            locale: default_locale(),
            timezone: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_locale() -> String {
    "en_US".to_string()
}

/// How strictly a raw meeting identifier is checked
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdValidation {
    /// Exactly nine ASCII digits
    #[default]
    Strict,
    /// Group by position whatever the input looks like
    Lenient,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default)]
    pub meeting_id: IdValidation,
}
