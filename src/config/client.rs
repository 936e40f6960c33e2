//! Connection settings for one i-doit instance.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whole-request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Environment variables read by [`ClientConfig::apply_env`]
const ENV_URL: &str = "IDOIT_URL";
const ENV_API_KEY: &str = "IDOIT_API_KEY";
const ENV_USERNAME: &str = "IDOIT_USERNAME";
const ENV_PASSWORD: &str = "IDOIT_PASSWORD";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Connection settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// JSON-RPC endpoint, e.g. `https://cmdb.example.com/src/jsonrpc.php`
    pub url: String,
    pub api_key: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Values given on the command line. Unset fields leave the config alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ClientConfig {
    /// `~/.config/idoit/client.toml`, if HOME is set
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/idoit/client.toml"))
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the file at `path`. An explicit path must exist; when `path` is
    /// None the default location is tried and defaults are used if it is
    /// absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    /// Apply the `IDOIT_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply `IDOIT_*` values produced by `lookup`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(url) = value(ENV_URL) {
            self.url = url;
        }
        if let Some(api_key) = value(ENV_API_KEY) {
            self.api_key = api_key;
        }
        if let Some(username) = value(ENV_USERNAME) {
            self.username = username;
        }
        if let Some(password) = value(ENV_PASSWORD) {
            self.password = password;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.url {
            self.url = url.clone();
        }
        if let Some(api_key) = &overrides.api_key {
            self.api_key = api_key.clone();
        }
        if let Some(username) = &overrides.username {
            self.username = username.clone();
        }
        if let Some(password) = &overrides.password {
            self.password = password.clone();
        }
    }

    /// File, then environment, then `overrides`; validated.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env();
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingField("url"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "url",
                reason: format!("'{}' is not an http(s) URL", self.url),
            });
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField("api_key"));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_seconds",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
