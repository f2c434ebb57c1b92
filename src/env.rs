//! Environment snapshot used by the resolver.
//!
//! A snapshot is taken once per parse call, so every field sees the same
//! environment. It comes from the process, from injected variables (tests,
//! embedders), or from nothing at all when env loading is disabled. When the
//! snapshot names a defaults file (via `ENV_FILENAME` by default), the file's
//! bindings are merged underneath: a variable already present wins.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::FlagfigError;
use crate::file;

/// Variable naming the defaults file, unless the builder picks another.
pub const DEFAULT_ENV_FILE_VAR: &str = "ENV_FILENAME";

/// Where a parse call reads environment variables from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// `std::env::vars_os()`, read at the start of each parse call.
    #[default]
    Process,
    /// A fixed set of variables.
    Vars(Vec<(String, String)>),
    /// No environment at all.
    Disabled,
}

/// Read-only view of the environment for one parse call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Takes an iterator so tests can pass synthetic data instead of the
    /// process environment.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    /// Capture the process environment. Variables that are not valid UTF-8
    /// are skipped.
    pub fn capture() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Add bindings for variables that are not already set.
    pub fn fill_missing(&mut self, bindings: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in bindings {
            self.vars.entry(key).or_insert(value);
        }
    }

    /// Build the snapshot for one parse call from `source`, merging in the
    /// defaults file named by `file_var` when that variable is set.
    pub(crate) fn resolve(
        source: &EnvSource,
        file_var: Option<&str>,
    ) -> Result<Self, FlagfigError> {
        let mut snapshot = match source {
            EnvSource::Process => Self::capture(),
            EnvSource::Vars(vars) => Self::from_vars(vars.iter().cloned()),
            EnvSource::Disabled => return Ok(Self::default()),
        };

        if let Some(var) = file_var
            && let Some(path) = snapshot.get(var).filter(|p| !p.is_empty())
        {
            let path = Path::new(path).to_path_buf();
            let bindings = file::load_env_file(&path)?;
            debug!(
                path = %path.display(),
                bindings = bindings.len(),
                "merging env defaults file"
            );
            snapshot.fill_missing(bindings);
        }
        Ok(snapshot)
    }
}
