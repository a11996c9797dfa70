//! Environment model and export computation
//!
//! The process environment is treated as a value: [`Environment`] is read
//! once, [`configure`] decides what to export, and the caller chooses how to
//! publish the result (render it for a shell, or apply it to this process).

use crate::error::{EnvError, Result};
use crate::resolve::InstallLayout;
use crate::search_path::{self, SearchPath};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// Binary directory of the installation
pub const BIN_PATH_VAR: &str = "PG_BIN_PATH";

/// Directory the environment was loaded from
pub const CTL_PATH_VAR: &str = "PG_CTL_PATH";

/// Executable search path
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Shared library search path
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    /// Names whose value is not valid UTF-8.
    unreadable: BTreeSet<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self::from_vars_os(env::vars_os())
    }

    /// Build from raw OS pairs.
    ///
    /// Names that are not valid UTF-8 are skipped. Values that are not valid
    /// UTF-8 are remembered by name, so reading them later fails instead of
    /// looking unset.
    pub fn from_vars_os<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut environment = Self::new();
        for (name, value) in vars {
            let Ok(name) = name.into_string() else {
                continue;
            };
            match value.into_string() {
                Ok(value) => environment.set(name, value),
                Err(_) => {
                    environment.vars.remove(&name);
                    environment.unreadable.insert(name);
                }
            }
        }
        environment
    }

    /// Value of `name`, or `None` when unset or not valid UTF-8.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value of `name`, with absent treated as empty.
    ///
    /// Fails when the variable is set to something that is not valid UTF-8.
    pub fn read(&self, name: &str) -> Result<&str> {
        if self.unreadable.contains(name) {
            return Err(EnvError::NonUtf8Var(name.to_string()));
        }
        Ok(self.get(name).unwrap_or_default())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.unreadable.remove(&name);
        self.vars.insert(name, value.into());
    }

    /// Return a copy of this environment with `exports` applied.
    pub fn apply(&self, exports: &Exports) -> Environment {
        let mut next = self.clone();
        for (name, value) in exports.iter() {
            next.set(name, value);
        }
        next
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut environment = Self::new();
        for (name, value) in iter {
            environment.set(name, value);
        }
        environment
    }
}

/// The bindings published for an installation, always as a complete set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exports {
    #[serde(rename = "PG_BIN_PATH")]
    pub bin_path: String,
    #[serde(rename = "PG_CTL_PATH")]
    pub ctl_path: String,
    #[serde(rename = "PATH")]
    pub search_path: String,
    #[serde(rename = "LD_LIBRARY_PATH")]
    pub library_path: String,
}

impl Exports {
    /// Bindings as `(name, value)` pairs, in export order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (BIN_PATH_VAR, self.bin_path.as_str()),
            (CTL_PATH_VAR, self.ctl_path.as_str()),
            (SEARCH_PATH_VAR, self.search_path.as_str()),
            (LIBRARY_PATH_VAR, self.library_path.as_str()),
        ]
        .into_iter()
    }

    /// Publish the bindings into this process so that children spawned
    /// afterwards inherit them.
    pub fn apply_to_process(&self) {
        for (name, value) in self.iter() {
            env::set_var(name, value);
        }
    }
}

/// Result of [`configure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The binary directory is already on the search path; nothing to export.
    AlreadyConfigured,
    /// The environment still needs these bindings.
    Configured(Exports),
}

impl Outcome {
    pub fn exports(&self) -> Option<&Exports> {
        match self {
            Self::AlreadyConfigured => None,
            Self::Configured(exports) => Some(exports),
        }
    }
}

/// Whether `env`'s search path already holds the layout's binary directory.
pub fn is_configured(layout: &InstallLayout, env: &Environment) -> Result<bool> {
    Ok(SearchPath::parse(env.read(SEARCH_PATH_VAR)?).contains(&layout.bin_dir()))
}

/// Decide what to export for `layout`, given the working directory and the
/// current environment.
pub fn configure_layout(layout: &InstallLayout, wd: &Path, env: &Environment) -> Result<Outcome> {
    let bin_dir = layout.bin_dir();

    if is_configured(layout, env)? {
        debug!(bin_dir = %bin_dir.display(), "Binary directory already on search path");
        return Ok(Outcome::AlreadyConfigured);
    }

    // Everything is computed before anything is returned, so a failure
    // leaves the caller with no bindings at all.
    let exports = Exports {
        bin_path: search_path::entry_value(&bin_dir)?,
        ctl_path: wd
            .to_str()
            .ok_or_else(|| EnvError::NonUtf8Path(wd.to_path_buf()))?
            .to_string(),
        search_path: search_path::prepend(&bin_dir, env.read(SEARCH_PATH_VAR)?)?,
        library_path: search_path::prepend(&layout.lib_dir(), env.read(LIBRARY_PATH_VAR)?)?,
    };

    debug!(
        install_dir = %layout.install_dir().display(),
        bin_dir = %exports.bin_path,
        "Environment needs configuring"
    );

    Ok(Outcome::Configured(exports))
}

/// [`configure_layout`] for an invocation argument. `default_dir` names the
/// installation directory when `arg` is absent or empty.
pub fn configure(
    arg: Option<&str>,
    wd: &Path,
    default_dir: &str,
    env: &Environment,
) -> Result<Outcome> {
    let layout = InstallLayout::resolve(arg, wd, default_dir);
    configure_layout(&layout, wd, env)
}

/// Compute the environment after loading the installation named by `arg`.
///
/// Returns `env` unchanged when it is already configured.
pub fn resolve_environment(
    arg: Option<&str>,
    wd: &Path,
    default_dir: &str,
    env: &Environment,
) -> Result<Environment> {
    Ok(match configure(arg, wd, default_dir, env)? {
        Outcome::AlreadyConfigured => env.clone(),
        Outcome::Configured(exports) => env.apply(&exports),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::DEFAULT_INSTALL_DIR as D;
    use std::path::PathBuf;

    fn session() -> Environment {
        [
            ("PATH", "/usr/local/bin:/usr/bin:/bin"),
            ("LD_LIBRARY_PATH", "/usr/local/lib"),
            ("HOME", "/home/u"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_first_invocation_exports_all_bindings() {
        let outcome = configure(None, Path::new("/home/u"), D, &session()).unwrap();

        let Outcome::Configured(exports) = outcome else {
            panic!("expected exports on first invocation");
        };
        assert_eq!(exports.bin_path, "/home/u/postgres-server/build/bin");
        assert_eq!(exports.ctl_path, "/home/u");
        assert_eq!(
            exports.search_path,
            "/home/u/postgres-server/build/bin:/usr/local/bin:/usr/bin:/bin"
        );
        assert_eq!(
            exports.library_path,
            "/home/u/postgres-server/build/lib:/usr/local/lib"
        );
    }

    #[test]
    fn test_ctl_path_is_wd_not_install_dir() {
        let outcome = configure(Some("/opt/pg"), Path::new("/home/u/work"), D, &session()).unwrap();
        let exports = outcome.exports().unwrap();
        assert_eq!(exports.ctl_path, "/home/u/work");
        assert_eq!(exports.bin_path, "/opt/pg/build/bin");
    }

    #[test]
    fn test_library_path_when_previously_unset() {
        let env: Environment = [("PATH", "/usr/bin")].into_iter().collect();
        let next = resolve_environment(Some("custom"), Path::new("/home/u"), D, &env).unwrap();
        assert_eq!(next.get(LIBRARY_PATH_VAR), Some("/home/u/custom/build/lib:"));
    }

    #[test]
    fn test_search_path_when_previously_unset() {
        let next = resolve_environment(None, Path::new("/w"), D, &Environment::new()).unwrap();
        assert_eq!(next.get(SEARCH_PATH_VAR), Some("/w/postgres-server/build/bin:"));
    }

    #[test]
    fn test_second_invocation_is_a_no_op() {
        let wd = Path::new("/home/u");
        let once = resolve_environment(Some("custom"), wd, D, &session()).unwrap();
        let twice = resolve_environment(Some("custom"), wd, D, &once).unwrap();

        assert_eq!(once, twice);
        assert_eq!(configure(Some("custom"), wd, D, &once).unwrap(), Outcome::AlreadyConfigured);

        let path = SearchPath::parse(twice.get(SEARCH_PATH_VAR).unwrap());
        assert_eq!(path.occurrences(&PathBuf::from("/home/u/custom/build/bin")), 1);
    }

    #[test]
    fn test_already_configured_exports_nothing() {
        let mut env = session();
        env.set("PATH", "/usr/bin:/opt/pg/build/bin");
        env.set("LD_LIBRARY_PATH", "/somewhere");

        let next = resolve_environment(Some("/opt/pg"), Path::new("/home/u"), D, &env).unwrap();
        assert_eq!(next, env);
        assert_eq!(next.get(BIN_PATH_VAR), None);
        assert_eq!(next.get(CTL_PATH_VAR), None);
    }

    #[test]
    fn test_similar_entry_does_not_count_as_configured() {
        let mut env = session();
        env.set("PATH", "/opt/pg/build/bin-old:/usr/bin");

        let outcome = configure(Some("/opt/pg"), Path::new("/"), D, &env).unwrap();
        assert!(outcome.exports().is_some());
    }

    #[test]
    fn test_different_install_dirs_both_export() {
        let wd = Path::new("/home/u");
        let first = resolve_environment(Some("a"), wd, D, &session()).unwrap();
        let second = resolve_environment(Some("b"), wd, D, &first).unwrap();

        assert_eq!(
            second.get(SEARCH_PATH_VAR),
            Some("/home/u/b/build/bin:/home/u/a/build/bin:/usr/local/bin:/usr/bin:/bin")
        );
        assert_eq!(second.get(BIN_PATH_VAR), Some("/home/u/b/build/bin"));
    }

    #[test]
    fn test_invalid_entry_exports_nothing() {
        let err = configure(Some("/opt/a:b"), Path::new("/"), D, &session()).unwrap_err();
        assert!(matches!(err, EnvError::InvalidEntry(_)));
    }

    #[test]
    fn test_exports_order() {
        let outcome = configure(None, Path::new("/w"), D, &session()).unwrap();
        let names: Vec<_> = outcome.exports().unwrap().iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["PG_BIN_PATH", "PG_CTL_PATH", "PATH", "LD_LIBRARY_PATH"]);
    }

    #[test]
    fn test_apply_to_process() {
        let _lock = crate::test_support::process_lock();
        let saved: Vec<_> = [BIN_PATH_VAR, CTL_PATH_VAR, SEARCH_PATH_VAR, LIBRARY_PATH_VAR]
            .into_iter()
            .map(|name| (name, env::var_os(name)))
            .collect();

        let current = Environment::from_process();
        let outcome = configure(Some("/opt/pg-apply"), Path::new("/w"), D, &current).unwrap();
        let exports = outcome.exports().unwrap();
        exports.apply_to_process();

        assert_eq!(env::var(BIN_PATH_VAR).unwrap(), "/opt/pg-apply/build/bin");
        assert_eq!(env::var(CTL_PATH_VAR).unwrap(), "/w");
        assert!(env::var(SEARCH_PATH_VAR).unwrap().starts_with("/opt/pg-apply/build/bin:"));
        assert!(env::var(LIBRARY_PATH_VAR).unwrap().starts_with("/opt/pg-apply/build/lib:"));

        let reloaded = Environment::from_process();
        assert_eq!(
            configure(Some("/opt/pg-apply"), Path::new("/w"), D, &reloaded).unwrap(),
            Outcome::AlreadyConfigured
        );

        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }

    #[test]
    fn test_default_dir_is_configurable() {
        let next = resolve_environment(None, Path::new("/w"), "pg-17", &session()).unwrap();
        assert_eq!(next.get(BIN_PATH_VAR), Some("/w/pg-17/build/bin"));
    }

    #[cfg(unix)]
    #[test]
    fn test_set_clears_unreadable_mark() {
        let mut env = Environment::from_vars_os([(OsString::from("PATH"), non_utf8(b"/\xff"))]);
        assert!(env.read(SEARCH_PATH_VAR).is_err());
        env.set(SEARCH_PATH_VAR, "/usr/bin");
        assert_eq!(env.read(SEARCH_PATH_VAR).unwrap(), "/usr/bin");
    }

    #[cfg(unix)]
    fn non_utf8(bytes: &[u8]) -> OsString {
        use std::os::unix::ffi::OsStringExt;
        OsString::from_vec(bytes.to_vec())
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_search_path_is_an_error() {
        let env = Environment::from_vars_os([
            (OsString::from("PATH"), non_utf8(b"/usr/bin:/opt/caf\xe9/bin")),
            (OsString::from("LD_LIBRARY_PATH"), OsString::from("/usr/lib")),
        ]);

        let err = configure(Some("/opt/pg"), Path::new("/w"), D, &env).unwrap_err();
        assert!(matches!(err, EnvError::NonUtf8Var(ref name) if name == "PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_library_path_is_an_error() {
        let env = Environment::from_vars_os([
            (OsString::from("PATH"), OsString::from("/usr/bin")),
            (OsString::from("LD_LIBRARY_PATH"), non_utf8(b"/usr/lib:/opt/\xff/lib")),
        ]);

        let err = resolve_environment(Some("/opt/pg"), Path::new("/w"), D, &env).unwrap_err();
        assert!(matches!(err, EnvError::NonUtf8Var(ref name) if name == "LD_LIBRARY_PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_unrelated_var_is_ignored() {
        let env = Environment::from_vars_os([
            (OsString::from("PATH"), OsString::from("/usr/bin")),
            (OsString::from("LANG_JUNK"), non_utf8(b"\xff")),
        ]);

        let outcome = configure(Some("/opt/pg"), Path::new("/w"), D, &env).unwrap();
        assert_eq!(outcome.exports().unwrap().search_path, "/opt/pg/build/bin:/usr/bin");
    }
}
