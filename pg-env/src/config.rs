//! Configuration for the pg-env binary
//!
//! Read from environment variables, the same way every other setting in this
//! workspace is.

use crate::resolve::DEFAULT_INSTALL_DIR;
use crate::shell::Shell;
use anyhow::Result;
use common::ConfigExt;

/// Output dialect: posix (default), fish or json
pub const SHELL_VAR: &str = "PG_ENV_SHELL";

/// Directory name used when no argument is given
pub const DEFAULT_DIR_VAR: &str = "PG_ENV_DEFAULT_DIR";

/// Configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub shell: Shell,
    pub default_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            shell: Shell::env_parse(SHELL_VAR, Shell::default())?,
            default_dir: String::env_or(DEFAULT_DIR_VAR, DEFAULT_INSTALL_DIR),
        })
    }
}
