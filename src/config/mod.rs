//! Client configuration
//!
//! Resolves the connection settings in three layers, later ones winning:
//! 1. Config file (~/.config/idoit/client.toml, or an explicit path)
//! 2. Environment (IDOIT_URL, IDOIT_API_KEY, IDOIT_USERNAME, IDOIT_PASSWORD)
//! 3. CLI flags

mod client;

pub use client::{ClientConfig, ConfigError, ConfigOverrides, DEFAULT_TIMEOUT_SECONDS};
