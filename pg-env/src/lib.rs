//! Environment loader for a locally built PostgreSQL tree
//!
//! Resolves the installation directory, checks whether its `build/bin` is
//! already on `PATH`, and produces the bindings a shell session needs:
//! `PG_BIN_PATH`, `PG_CTL_PATH`, `PATH` and `LD_LIBRARY_PATH`.
//!
//! The core is pure: [`resolve_environment`] maps `(arg, wd, default_dir, env)` to the
//! new environment without touching the process.

pub mod config;
pub mod env;
pub mod error;
pub mod resolve;
pub mod search_path;
pub mod shell;
pub mod workdir;

pub use config::Config;
pub use env::{configure, configure_layout, resolve_environment, Environment, Exports, Outcome};
pub use error::{EnvError, Result};
pub use resolve::{resolve_install_dir, InstallLayout, DEFAULT_INSTALL_DIR};
pub use search_path::SearchPath;
pub use shell::Shell;
pub use workdir::{invocation_dir, WorkDir};
