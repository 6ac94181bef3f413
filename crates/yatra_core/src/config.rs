//! Configuration loading.
//!
//! Structured settings come from a TOML file; credentials come only from the
//! environment (optionally seeded from a `.env` file) and are wrapped in
//! [`Secret`] so they never show up in `Debug` output or logs.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the target type.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// A required environment variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
}

/// Reads a TOML file into `T`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(value)
}

/// Loads `.env` from the current directory or its parents, if present.
///
/// Returns the path that was loaded. Variables already set in the process
/// environment are not overridden.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(err) if err.not_found() => None,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable .env");
            None
        }
    }
}

/// A credential whose value is hidden from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the wrapped value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reads a required secret from the environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnv`] if the variable is unset or empty.
pub fn secret_from_env(var: &str) -> Result<Secret, ConfigError> {
    optional_secret_from_env(var).ok_or_else(|| ConfigError::MissingEnv(var.to_string()))
}

/// Reads an optional secret from the environment. Empty values count as unset.
#[must_use]
pub fn optional_secret_from_env(var: &str) -> Option<Secret> {
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(Secret)
}
