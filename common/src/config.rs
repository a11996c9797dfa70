//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults and type parsing.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// An empty value counts as unset.
    ///
    /// # Example
    /// ```ignore
    /// let dir = String::env_or("PG_ENV_DEFAULT_DIR", "postgres-server");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Get an environment variable parsed as a specific type.
    ///
    /// Returns `default` if the variable is unset or empty, and an error if it
    /// is set to something that does not parse.
    ///
    /// # Example
    /// ```ignore
    /// let shell: Shell = Shell::env_parse("PG_ENV_SHELL", Shell::Posix)?;
    /// ```
    fn env_parse<T>(name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match env::var(name) {
            Ok(v) if !v.is_empty() => v
                .parse()
                .with_context(|| format!("Invalid value for {}: {:?}", name, v)),
            _ => Ok(default),
        }
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}
