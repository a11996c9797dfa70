//! Path resolution for a PostgreSQL build tree
//!
//! Turns the optional command-line argument into the installation directory
//! and derives the binary and library directories from it. Everything here is
//! textual: nothing is checked against the filesystem.

use std::path::{Path, PathBuf};

/// Directory name used when no installation directory is given
pub const DEFAULT_INSTALL_DIR: &str = "postgres-server";

/// Binary directory, relative to the installation directory
pub const BIN_SUBDIR: &str = "build/bin";

/// Library directory, relative to the installation directory
pub const LIB_SUBDIR: &str = "build/lib";

/// Resolve the installation directory against the working directory.
///
/// Rules, in order:
/// 1. `arg` absent or empty: `wd/<default_dir>`
/// 2. `arg` absolute: `arg` as given
/// 3. otherwise: `wd/arg`
pub fn resolve_install_dir(arg: Option<&str>, wd: &Path, default_dir: &str) -> PathBuf {
    match arg {
        None | Some("") => wd.join(default_dir),
        Some(arg) if Path::new(arg).is_absolute() => PathBuf::from(arg),
        Some(arg) => wd.join(arg),
    }
}

/// Conventional layout of a built PostgreSQL tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    install_dir: PathBuf,
}

impl InstallLayout {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
        }
    }

    /// Resolve the layout from the invocation argument.
    pub fn resolve(arg: Option<&str>, wd: &Path, default_dir: &str) -> Self {
        Self::new(resolve_install_dir(arg, wd, default_dir))
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// `<install>/build/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.install_dir.join(BIN_SUBDIR)
    }

    /// `<install>/build/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.install_dir.join(LIB_SUBDIR)
    }
}
