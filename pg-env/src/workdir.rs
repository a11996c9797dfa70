//! Working directory capture and scoped directory changes

use crate::error::{EnvError, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Return the directory the tool was invoked from.
///
/// `PWD` is preferred when it is absolute and names the same directory as the
/// process cwd, so a symlinked working directory is reported the way the
/// shell sees it. Otherwise the process cwd is used.
pub fn invocation_dir() -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(|source| EnvError::WorkDir {
        path: PathBuf::from("."),
        source,
    })?;

    match env::var_os("PWD").map(PathBuf::from) {
        Some(pwd) if pwd.is_absolute() && same_dir(&pwd, &cwd) => Ok(pwd),
        _ => Ok(cwd),
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// A directory change that is undone on drop.
///
/// The previous directory is restored on every exit path, including early
/// returns and unwinding.
#[derive(Debug)]
pub struct WorkDir {
    previous: PathBuf,
}

impl WorkDir {
    /// Change into `dir`, remembering the current directory.
    ///
    /// On failure the process directory is untouched and nothing will be
    /// restored.
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().map_err(|source| EnvError::WorkDir {
            path: PathBuf::from("."),
            source,
        })?;

        env::set_current_dir(dir).map_err(|source| EnvError::WorkDir {
            path: dir.to_path_buf(),
            source,
        })?;

        debug!(dir = %dir.display(), "Entered directory");
        Ok(Self { previous })
    }

    /// Directory that will be restored.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(dir = %self.previous.display(), error = %e, "Failed to restore working directory");
        }
    }
}
