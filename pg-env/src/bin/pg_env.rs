//! Print the shell environment for a locally built PostgreSQL tree
//!
//! Usage: `eval "$(pg-env [INSTALL_DIR])"`
//!
//! INSTALL_DIR defaults to `./postgres-server`; relative paths are taken from
//! the current directory. Nothing is printed when `build/bin` of the tree is
//! already on PATH, so evaluating the output repeatedly is harmless.

use anyhow::{anyhow, Context, Result};
use common::init_logging;
use pg_env::{configure_layout, invocation_dir, Config, Environment, InstallLayout, WorkDir};
use std::env;
use std::io::{self, Write};
use tracing::{debug, error, warn};

const USAGE: &str = "Usage: pg-env [INSTALL_DIR]";

fn args() -> Result<Vec<String>> {
    env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow!("Argument is not valid UTF-8: {:?}", arg))
        })
        .collect()
}

fn main() -> Result<()> {
    let _guard = init_logging("pg-env");

    let args = args()?;
    if args.len() > 1 {
        error!(args = ?args, "Too many arguments, expected at most one installation directory");
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let arg = args.first().map(String::as_str);

    let config = Config::from_env()?;
    let wd = invocation_dir().context("Failed to determine working directory")?;
    let session = Environment::from_process();
    let layout = InstallLayout::resolve(arg, &wd, &config.default_dir);

    debug!(
        wd = %wd.display(),
        install_dir = %layout.install_dir().display(),
        "Resolved installation directory"
    );

    let outcome = {
        // Held until the exports are computed; dropping it restores the cwd.
        let _workdir = match WorkDir::enter(layout.install_dir()) {
            Ok(workdir) => Some(workdir),
            Err(e) => {
                warn!(error = %e, "Installation directory is not accessible");
                None
            }
        };

        configure_layout(&layout, &wd, &session)
            .with_context(|| format!("Failed to configure {}", layout.install_dir().display()))?
    };

    let snippet = config.shell.render(&outcome)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(snippet.as_bytes())
        .context("Failed to write exports")?;
    stdout.flush().context("Failed to write exports")?;

    Ok(())
}
