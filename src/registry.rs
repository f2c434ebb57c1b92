//! Per-scope name lookup.
//!
//! Every scope (the root and each command) owns one [`Scope`]: maps from
//! long names, short names, environment variables and command names to
//! indices in the parser's descriptor arena. Tables are filled while the
//! schema is extracted and never change afterwards.

use std::collections::HashMap;

use crate::error::{FlagfigError, NameKind};
use crate::field::FieldSpec;

#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    /// Label used in duplicate-name errors.
    pub(crate) label: String,
    /// Command path from the root; empty for the root scope.
    pub(crate) path: Vec<String>,
    pub(crate) fields: Vec<usize>,
    pub(crate) commands: Vec<usize>,
    pub(crate) subcommands_optional: bool,
    long: HashMap<String, usize>,
    short: HashMap<char, usize>,
    env: HashMap<String, usize>,
    command_names: HashMap<String, usize>,
}

impl Scope {
    pub(crate) fn root(subcommands_optional: bool) -> Self {
        Self {
            label: "the root scope".into(),
            subcommands_optional,
            ..Self::default()
        }
    }

    pub(crate) fn command(path: Vec<String>, subcommands_optional: bool) -> Self {
        Self {
            label: format!("command '{}'", path.join(" ")),
            path,
            subcommands_optional,
            ..Self::default()
        }
    }

    pub(crate) fn register_field(&mut self, id: usize, spec: &FieldSpec) -> Result<(), FlagfigError> {
        if let Some(long) = &spec.long {
            claim(&mut self.long, long.clone(), id, NameKind::Long, &self.label)?;
        }
        if let Some(short) = spec.short
            && self.short.insert(short, id).is_some()
        {
            return Err(self.duplicate(NameKind::Short, short.to_string()));
        }
        if let Some(env) = &spec.env {
            claim(&mut self.env, env.clone(), id, NameKind::Env, &self.label)?;
        }
        self.fields.push(id);
        Ok(())
    }

    pub(crate) fn register_command(
        &mut self,
        id: usize,
        name: &str,
        aliases: &[String],
    ) -> Result<(), FlagfigError> {
        for n in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
            claim(
                &mut self.command_names,
                n.to_string(),
                id,
                NameKind::Command,
                &self.label,
            )?;
        }
        self.commands.push(id);
        Ok(())
    }

    pub(crate) fn long(&self, name: &str) -> Option<usize> {
        self.long.get(name).copied()
    }

    pub(crate) fn short(&self, name: char) -> Option<usize> {
        self.short.get(&name).copied()
    }

    pub(crate) fn command_named(&self, name: &str) -> Option<usize> {
        self.command_names.get(name).copied()
    }

    pub(crate) fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    fn duplicate(&self, what: NameKind, name: String) -> FlagfigError {
        FlagfigError::DuplicateName {
            what,
            name,
            scope: self.label.clone(),
        }
    }
}

fn claim(
    table: &mut HashMap<String, usize>,
    name: String,
    id: usize,
    what: NameKind,
    label: &str,
) -> Result<(), FlagfigError> {
    if table.contains_key(&name) {
        return Err(FlagfigError::DuplicateName {
            what,
            name,
            scope: label.to_string(),
        });
    }
    table.insert(name, id);
    Ok(())
}
