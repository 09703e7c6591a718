//! Configuration loading
//!
//! ## Resolution
//!
//! Config is loaded with a two-layer resolution, then environment overrides:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/luxespend/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//! 3. Environment variables win over either file
//!
//! Environment variables:
//! - `LUXESPEND_DATA_DIR`: where the transaction file lives
//! - `ADVICE_BACKEND`: gemini, openai_compatible, ollama, mock, none
//! - `ADVICE_EVERY`: milestone interval
//! - `ADVICE_TIMEOUT_SECS`: bound on a single advice request
//! - `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL`, `GEMINI_HOST`
//! - `OPENAI_COMPATIBLE_HOST`, `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`
//! - `OLLAMA_HOST`, `OLLAMA_MODEL`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

const APP_DIR: &str = "luxespend";

/// Which advice provider to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Gemini,
    OpenaiCompatible,
    Ollama,
    Mock,
    /// No provider; every request resolves to the fallback tip
    None,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenaiCompatible => "openai_compatible",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenaiCompatible)
            }
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            "none" | "off" | "disabled" => Ok(Self::None),
            _ => Err(format!("Unknown advice backend: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub backend: BackendKind,
    /// Milestone interval: request advice when the count is a multiple of this
    pub every: usize,
    pub timeout_secs: u64,
    pub model: Option<String>,
    pub host: Option<String>,
    pub api_key: Option<String>,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            every: 3,
            timeout_secs: 30,
            model: None,
            host: None,
            api_key: None,
        }
    }
}

impl AdviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub advice: AdviceConfig,
}

impl Config {
    /// Load from files, then apply the process environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_files(override_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn from_files(override_path: Option<&Path>) -> Result<Self> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);

        let content = match path {
            Some(ref p) if p.exists() => {
                debug!("Loading config from {}", p.display());
                fs::read_to_string(p)?
            }
            Some(ref p) if override_path.is_some() => {
                warn!("Config file {} not found, using defaults", p.display());
                DEFAULT_CONFIG.to_string()
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        Self::from_toml(&content)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("LUXESPEND_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(backend) = lookup("ADVICE_BACKEND") {
            match backend.parse() {
                Ok(kind) => self.advice.backend = kind,
                Err(e) => warn!(backend = %backend, "{}, keeping {}", e, self.advice.backend),
            }
        }

        if let Some(every) = lookup("ADVICE_EVERY") {
            match every.parse() {
                Ok(n) => self.advice.every = n,
                Err(_) => warn!(value = %every, "Ignoring invalid ADVICE_EVERY"),
            }
        }

        if let Some(secs) = lookup("ADVICE_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(n) => self.advice.timeout_secs = n,
                Err(_) => warn!(value = %secs, "Ignoring invalid ADVICE_TIMEOUT_SECS"),
            }
        }

        let (host_var, model_var, key_vars): (&str, &str, &[&str]) = match self.advice.backend {
            BackendKind::Gemini => ("GEMINI_HOST", "GEMINI_MODEL", &["GEMINI_API_KEY", "API_KEY"]),
            BackendKind::OpenaiCompatible => (
                "OPENAI_COMPATIBLE_HOST",
                "OPENAI_COMPATIBLE_MODEL",
                &["OPENAI_COMPATIBLE_API_KEY"],
            ),
            BackendKind::Ollama => ("OLLAMA_HOST", "OLLAMA_MODEL", &[]),
            BackendKind::Mock | BackendKind::None => return,
        };

        if let Some(host) = lookup(host_var) {
            self.advice.host = Some(host);
        }
        if let Some(model) = lookup(model_var) {
            self.advice.model = Some(model);
        }
        if let Some(key) = key_vars.iter().find_map(|&k| lookup(k)) {
            self.advice.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.advice.every == 0 {
            return Err(Error::InvalidInput(
                "advice.every must be at least 1".to_string(),
            ));
        }
        if self.advice.timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "advice.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding the transaction file
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(default_data_dir)
            .unwrap_or_else(|| PathBuf::from(".luxespend"))
    }
}

/// Platform data directory for LuxeSpend
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config.toml"))
}
