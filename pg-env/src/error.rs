//! Errors produced while resolving the PostgreSQL environment

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve or publish the environment for an installation tree.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The path cannot be exported as a UTF-8 variable value.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// An inherited variable the exports are built from is not valid UTF-8.
    #[error("environment variable {0} is not valid UTF-8")]
    NonUtf8Var(String),

    /// The path contains the search-path delimiter and cannot be joined.
    #[error("path contains the search path delimiter: {}", .0.display())]
    InvalidEntry(PathBuf),

    /// Changing into (or back out of) a directory failed.
    #[error("failed to change directory to {}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing the exports failed.
    #[error("failed to render exports")]
    Render(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnvError>;
