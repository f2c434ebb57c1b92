//! The argument pass.
//!
//! [`Parser::parse_args`] resolves defaults and the environment for every
//! field, then walks the arguments once, left to right:
//!
//! - `--` ends option parsing; everything after it is positional.
//! - Long and short options are looked up in the current scope's registry;
//!   value-taking options read an inline value or the next argument.
//! - The first positional argument at a scope with commands selects a
//!   command and makes its scope current.
//! - Options the schema does not describe go to the unknown-option handler.
//!
//! After the pass, required fields and command selection are checked and
//! the active command is dispatched.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::command::ActiveCommand;
use crate::env::{EnvSnapshot, EnvSource};
use crate::error::{BoxError, FlagfigError};
use crate::resolve;
use crate::schema::Schema;
use crate::tokenize::{self, Token};
use crate::types::{OptionStyle, SplitArgument};

/// Callback for options the schema does not describe.
pub type UnknownOptionHandler =
    dyn FnMut(&str, SplitArgument, Vec<String>) -> Result<Vec<String>, BoxError>;

/// Callback that replaces the active command's own `execute`.
pub type CommandHandler =
    dyn for<'a> FnMut(Option<ActiveCommand<'a>>, &[String]) -> Result<(), BoxError>;

/// Parser behaviour fixed at build time.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) style: OptionStyle,
    pub(crate) print_errors: bool,
    pub(crate) exit_on_error: bool,
    pub(crate) pass_after_non_option: bool,
    pub(crate) ignore_unknown: bool,
    pub(crate) env: EnvSource,
    pub(crate) env_file_var: Option<String>,
}

/// A built parser for records of type `C`.
///
/// Holds the validated descriptor arena and the callbacks. Parse calls take
/// `&mut self` and may be repeated; every call starts from scratch.
pub struct Parser<C> {
    pub(crate) schema: Schema<C>,
    pub(crate) settings: Settings,
    unknown_option_handler: Option<Box<UnknownOptionHandler>>,
    command_handler: Option<Box<CommandHandler>>,
}

/// Mutable state of one pass.
struct Pass {
    args: VecDeque<String>,
    /// Current scope: the root, or the deepest active command's scope.
    scope: usize,
    /// Active command ids, outermost first.
    active: Vec<usize>,
    /// Per field: set on the command line during this pass.
    explicit: Vec<bool>,
    positionals: Vec<String>,
}

impl<C: 'static> Parser<C> {
    pub(crate) fn new(
        schema: Schema<C>,
        settings: Settings,
        unknown_option_handler: Option<Box<UnknownOptionHandler>>,
        command_handler: Option<Box<CommandHandler>>,
    ) -> Self {
        Self {
            schema,
            settings,
            unknown_option_handler,
            command_handler,
        }
    }

    pub fn style(&self) -> OptionStyle {
        self.settings.style
    }

    /// Parse the process arguments (without the program name).
    ///
    /// Errors are printed to stderr when `print_errors` is set, and the
    /// process exits with status 1 when `exit_on_error` is set.
    pub fn parse(&mut self, target: &mut C) -> Result<Vec<String>, FlagfigError> {
        let result = self.parse_args(target, std::env::args().skip(1));
        if let Err(err) = &result {
            if self.settings.print_errors {
                eprintln!("{err}");
            }
            if self.settings.exit_on_error {
                std::process::exit(1);
            }
        }
        result
    }

    /// Parse `args` into `target` and return the leftover positional
    /// arguments.
    pub fn parse_args<I, S>(&mut self, target: &mut C, args: I) -> Result<Vec<String>, FlagfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: VecDeque<String> = args.into_iter().map(Into::into).collect();
        debug!(args = args.len(), "parsing arguments");

        let env = EnvSnapshot::resolve(&self.settings.env, self.settings.env_file_var.as_deref())?;
        let from_env = resolve::resolve(&self.schema, target, &env)?;

        let mut pass = Pass {
            args,
            scope: 0,
            active: Vec::new(),
            explicit: vec![false; self.schema.fields.len()],
            positionals: Vec::new(),
        };
        self.run(target, &mut pass)?;
        self.check_required(&pass, &from_env)?;
        self.check_command_chosen(&pass)?;
        self.dispatch(target, &pass)?;

        debug!(leftover = pass.positionals.len(), "parsed arguments");
        Ok(pass.positionals)
    }

    fn run(&mut self, target: &mut C, pass: &mut Pass) -> Result<(), FlagfigError> {
        let style = self.settings.style;
        while let Some(arg) = pass.args.pop_front() {
            trace!(arg = %arg, scope = pass.scope, "token");
            match tokenize::classify(&arg, style) {
                Token::Terminator => {
                    pass.positionals.extend(pass.args.drain(..));
                    break;
                }
                Token::Positional(_) => {
                    let scope = &self.schema.scopes[pass.scope];
                    if self.settings.pass_after_non_option && !scope.has_commands() {
                        pass.positionals.push(arg);
                        pass.positionals.extend(pass.args.drain(..));
                        break;
                    }
                    self.positional(arg, pass)?;
                }
                Token::Long { name, value } => {
                    match self.schema.scopes[pass.scope].long(name) {
                        Some(id) => self.option(target, pass, id, value.map(str::to_string))?,
                        None => {
                            self.unknown(pass, &arg, name, name, value)?;
                        }
                    }
                }
                Token::Short { body, value } => self.short(target, pass, &arg, body, value)?,
            }
        }
        Ok(())
    }

    /// A short option token: a single option, `-o=value`, or a cluster.
    fn short(
        &mut self,
        target: &mut C,
        pass: &mut Pass,
        arg: &str,
        body: &str,
        value: Option<&str>,
    ) -> Result<(), FlagfigError> {
        let scope = pass.scope;
        if let Some(value) = value {
            let id = body
                .chars()
                .next()
                .and_then(|c| self.schema.scopes[scope].short(c));
            return match id {
                Some(id) => self.option(target, pass, id, Some(value.to_string())),
                None => self.unknown(pass, arg, body, body, Some(value)),
            };
        }

        for (pos, c) in body.char_indices() {
            let Some(id) = self.schema.scopes[scope].short(c) else {
                let mut unmatched = [0u8; 4];
                return self.unknown(pass, arg, body, c.encode_utf8(&mut unmatched), None);
            };
            let rest = &body[pos + c.len_utf8()..];
            if self.schema.fields[id].field.kind().is_switch() {
                self.option(target, pass, id, None)?;
                continue;
            }
            // Any option that can take a value takes the rest of the cluster.
            let inline = (!rest.is_empty()).then(|| rest.to_string());
            return self.option(target, pass, id, inline);
        }
        Ok(())
    }

    /// Handle one matched option.
    fn option(
        &self,
        target: &mut C,
        pass: &mut Pass,
        id: usize,
        inline: Option<String>,
    ) -> Result<(), FlagfigError> {
        let entry = &self.schema.fields[id];
        let spec = &entry.field.spec;
        let flag = entry.flag.as_str();

        if entry.field.kind().is_switch() {
            if inline.is_some() {
                return Err(FlagfigError::NoArgumentForBool {
                    flag: flag.to_string(),
                });
            }
            return self.set(target, pass, id, "true");
        }

        if let Some(raw) = inline {
            return self.set_from_command_line(target, pass, id, &raw);
        }

        if !spec.optional_values.is_empty() {
            for literal in &spec.optional_values {
                self.set(target, pass, id, literal)?;
            }
            return Ok(());
        }

        let Some(next) = pass.args.front() else {
            return Err(FlagfigError::ExpectedArgument {
                flag: flag.to_string(),
                found: None,
            });
        };
        if next == "--" {
            return Err(FlagfigError::ExpectedArgument {
                flag: flag.to_string(),
                found: Some(next.clone()),
            });
        }
        if tokenize::looks_like_option(next, self.settings.style) {
            match entry.field.accepts(next) {
                Some(Ok(())) => {}
                Some(Err(message)) => {
                    return Err(FlagfigError::InvalidValue {
                        flag: flag.to_string(),
                        message,
                    });
                }
                None if entry.field.kind().is_numeric() && tokenize::is_negative_number(next) => {}
                None => {
                    return Err(FlagfigError::ExpectedArgument {
                        flag: flag.to_string(),
                        found: Some(next.clone()),
                    });
                }
            }
        }

        let raw = pass.args.pop_front().unwrap_or_default();
        self.set_from_command_line(target, pass, id, &raw)
    }

    /// Unquote a command-line value when the field asks for it, then set it.
    fn set_from_command_line(
        &self,
        target: &mut C,
        pass: &mut Pass,
        id: usize,
        raw: &str,
    ) -> Result<(), FlagfigError> {
        let entry = &self.schema.fields[id];
        if !entry.field.spec.unquote {
            return self.set(target, pass, id, raw);
        }
        let value =
            tokenize::unquote(raw).map_err(|e| crate::field::value_error(&entry.flag, e))?;
        self.set(target, pass, id, &value)
    }

    /// Assign one explicit value. The first explicit value of a sequence or
    /// map field drops whatever defaults or the environment put there.
    fn set(&self, target: &mut C, pass: &mut Pass, id: usize, raw: &str) -> Result<(), FlagfigError> {
        let entry = &self.schema.fields[id];
        if !pass.explicit[id] && entry.field.kind().is_collection() {
            entry.field.reset(target);
        }
        pass.explicit[id] = true;
        entry.field.assign(target, raw, &entry.flag)
    }

    fn positional(&self, arg: String, pass: &mut Pass) -> Result<(), FlagfigError> {
        let scope = &self.schema.scopes[pass.scope];
        // Commands are only matched before any positional was collected.
        if !scope.has_commands() || !pass.positionals.is_empty() {
            pass.positionals.push(arg);
            return Ok(());
        }
        match scope.command_named(&arg) {
            Some(id) => {
                let command = &self.schema.commands[id];
                debug!(command = %command.name, "activating command");
                pass.active.push(id);
                pass.scope = command.scope;
                Ok(())
            }
            None if scope.subcommands_optional => {
                pass.positionals.push(arg);
                Ok(())
            }
            None => Err(FlagfigError::UnknownCommand {
                name: arg,
                available: self.visible_commands(pass.scope),
            }),
        }
    }

    /// An option the current scope does not know. `name` is what the handler
    /// sees; `unmatched` is what an unknown-flag error reports.
    fn unknown(
        &mut self,
        pass: &mut Pass,
        arg: &str,
        name: &str,
        unmatched: &str,
        value: Option<&str>,
    ) -> Result<(), FlagfigError> {
        if let Some(handler) = self.unknown_option_handler.as_mut() {
            debug!(option = name, "passing unknown option to handler");
            let remaining: Vec<String> = pass.args.drain(..).collect();
            let split = SplitArgument::new(value.map(str::to_string));
            let remaining = handler(name, split, remaining).map_err(FlagfigError::Handler)?;
            pass.args = remaining.into();
            return Ok(());
        }
        if self.settings.ignore_unknown {
            pass.positionals.push(arg.to_string());
            return Ok(());
        }
        Err(FlagfigError::UnknownFlag {
            flag: unmatched.to_string(),
        })
    }

    /// Required fields of the root and every active command must have been
    /// set on the command line or through the environment.
    fn check_required(&self, pass: &Pass, from_env: &[bool]) -> Result<(), FlagfigError> {
        let scopes = std::iter::once(0)
            .chain(pass.active.iter().map(|&c| self.schema.commands[c].scope));
        let missing: Vec<String> = scopes
            .flat_map(|scope| self.schema.scopes[scope].fields.iter().copied())
            .filter(|&id| {
                self.schema.fields[id].field.spec.required && !pass.explicit[id] && !from_env[id]
            })
            .map(|id| self.schema.fields[id].flag.clone())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FlagfigError::Required { flags: missing })
        }
    }

    fn check_command_chosen(&self, pass: &Pass) -> Result<(), FlagfigError> {
        let scope = &self.schema.scopes[pass.scope];
        if scope.has_commands() && !scope.subcommands_optional {
            return Err(FlagfigError::CommandRequired {
                available: self.visible_commands(pass.scope),
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, target: &mut C, pass: &Pass) -> Result<(), FlagfigError> {
        let Self {
            schema,
            command_handler,
            ..
        } = self;

        if let Some(handler) = command_handler.as_mut() {
            let active = match pass.active.last() {
                Some(&id) => Some(ActiveCommand {
                    name: schema.commands[id].name.as_str(),
                    path: pass
                        .active
                        .iter()
                        .map(|&c| schema.commands[c].name.as_str())
                        .collect(),
                    commander: schema.commands[id].slot.commander(target),
                }),
                None => None,
            };
            return handler(active, &pass.positionals).map_err(FlagfigError::Command);
        }

        if let Some(&id) = pass.active.last() {
            let command = &schema.commands[id];
            debug!(command = %command.name, "executing command");
            command
                .slot
                .commander(target)
                .execute(&pass.positionals)
                .map_err(FlagfigError::Command)?;
        }
        Ok(())
    }

    fn visible_commands(&self, scope: usize) -> Vec<String> {
        self.schema.scopes[scope]
            .commands
            .iter()
            .map(|&id| &self.schema.commands[id])
            .filter(|c| !c.hidden)
            .map(|c| c.name.clone())
            .collect()
    }
}
