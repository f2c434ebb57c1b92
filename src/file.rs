//! Defaults file loading.
//!
//! The defaults file is a dotenv-style list of `KEY=VALUE` bindings: one
//! binding per line, blank lines ignored, `#` starting a comment. Lines
//! holding only whitespace count as blank, wherever they appear. Its
//! bindings feed the same resolver as process environment variables (see
//! [`EnvSnapshot`](crate::EnvSnapshot)); this module only turns a path or a
//! string into the list of bindings.
//!
//! Unquoted and double-quoted values go through `dotenvy` substitution:
//! `$NAME` and `${NAME}` expand to the process variable or an earlier
//! binding of that name, and to nothing when neither exists. Single-quoted
//! values are taken literally, so `PASSWORD='pa$$word'` keeps its dollars.

use std::fs;
use std::path::Path;

use crate::error::FlagfigError;

/// Read and parse a defaults file.
pub fn load_env_file(path: &Path) -> Result<Vec<(String, String)>, FlagfigError> {
    let content = fs::read_to_string(path).map_err(|e| FlagfigError::EnvFile {
        path: path.to_path_buf(),
        source: dotenvy::Error::Io(e),
    })?;
    parse_env_file(&content, path)
}

/// Parse defaults-file content already in memory. `origin` is only used in
/// error messages.
pub fn parse_env_file(content: &str, origin: &Path) -> Result<Vec<(String, String)>, FlagfigError> {
    let content = blank_whitespace_lines(content);
    dotenvy::from_read_iter(content.as_bytes())
        .map(|binding| {
            binding.map_err(|source| FlagfigError::EnvFile {
                path: origin.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Empty every whitespace-only line; dotenvy rejects one at end of input.
/// Line numbers in parse errors stay those of the file.
fn blank_whitespace_lines(content: &str) -> String {
    content
        .lines()
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
