//! Search path handling (`PATH`, `LD_LIBRARY_PATH`)
//!
//! Membership is decided per entry, never by substring: `/opt/pg/build/bin`
//! is not a member of `/opt/pg/build/bin-old:/usr/bin`.

use crate::error::{EnvError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Separator between search path entries on this platform.
pub const DELIMITER: char = if cfg!(windows) { ';' } else { ':' };

/// A parsed, ordered search path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    /// Split a delimited value into entries. Empty entries are kept so the
    /// list mirrors what the loader or shell will see.
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Self::default();
        }

        Self {
            entries: value.split(DELIMITER).map(PathBuf::from).collect(),
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Whether `dir` is one of the entries.
    ///
    /// Entries compare by path component, so a trailing `/` or a doubled
    /// separator does not matter. Empty entries never match.
    pub fn contains(&self, dir: &Path) -> bool {
        self.occurrences(dir) > 0
    }

    /// Number of entries equal to `dir`.
    pub fn occurrences(&self, dir: &Path) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.as_os_str().is_empty() && entry.as_path() == dir)
            .count()
    }
}

/// Render `dir` as a single search path entry.
pub fn entry_value(dir: &Path) -> Result<String> {
    let value = dir
        .to_str()
        .ok_or_else(|| EnvError::NonUtf8Path(dir.to_path_buf()))?;

    // join_paths rejects entries that contain the delimiter.
    env::join_paths([dir]).map_err(|_| EnvError::InvalidEntry(dir.to_path_buf()))?;

    Ok(value.to_string())
}

/// Prepend `dir` to a previous search path value.
///
/// The delimiter is written even when `previous` is empty, so the result
/// always starts with `<dir><DELIMITER>`.
pub fn prepend(dir: &Path, previous: &str) -> Result<String> {
    Ok(format!("{}{}{}", entry_value(dir)?, DELIMITER, previous))
}
