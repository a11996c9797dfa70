//! Rendering exports for the calling shell
//!
//! A child process cannot change its parent's environment, so the bindings
//! are written to stdout in a form the shell evaluates:
//!
//! ```sh
//! eval "$(pg-env /opt/pg)"
//! ```

use crate::env::{Exports, Outcome, LIBRARY_PATH_VAR, SEARCH_PATH_VAR};
use crate::error::Result;
use crate::search_path::DELIMITER;
use std::str::FromStr;
use thiserror::Error;

/// Output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shell {
    /// `export NAME='value'` (sh, bash, zsh, dash)
    #[default]
    Posix,
    /// `set -gx NAME 'value'`
    Fish,
    /// A single JSON object, for tooling
    Json,
}

#[derive(Debug, Error)]
#[error("unknown shell {0:?} (expected posix, fish or json)")]
pub struct UnknownShell(String);

impl FromStr for Shell {
    type Err = UnknownShell;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "sh" | "bash" | "zsh" | "dash" => Ok(Self::Posix),
            "fish" => Ok(Self::Fish),
            "json" => Ok(Self::Json),
            _ => Err(UnknownShell(s.to_string())),
        }
    }
}

impl Shell {
    /// Render an outcome. An already configured environment renders as
    /// nothing (`{}` for JSON).
    pub fn render(self, outcome: &Outcome) -> Result<String> {
        match (self, outcome.exports()) {
            (Self::Json, None) => Ok("{}\n".to_string()),
            (Self::Json, Some(exports)) => Ok(format!("{}\n", serde_json::to_string(exports)?)),
            (_, None) => Ok(String::new()),
            (Self::Posix, Some(exports)) => Ok(render_posix(exports)),
            (Self::Fish, Some(exports)) => Ok(render_fish(exports)),
        }
    }
}

fn render_posix(exports: &Exports) -> String {
    exports
        .iter()
        .map(|(name, value)| format!("export {}={}\n", name, posix_quote(value)))
        .collect()
}

fn render_fish(exports: &Exports) -> String {
    exports
        .iter()
        .map(|(name, value)| {
            // fish keeps *PATH variables as lists and joins them with ':' on export
            let words: Vec<String> = if name == SEARCH_PATH_VAR || name == LIBRARY_PATH_VAR {
                value.split(DELIMITER).map(fish_quote).collect()
            } else {
                vec![fish_quote(value)]
            };
            format!("set -gx {} {}\n", name, words.join(" "))
        })
        .collect()
}

/// Single-quote `value` for a POSIX shell.
fn posix_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Single-quote `value` for fish, where `\` and `'` are escapable inside quotes.
fn fish_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
}
