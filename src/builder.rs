use std::marker::PhantomData;

use tracing::debug;

use crate::command::ActiveCommand;
use crate::env::{DEFAULT_ENV_FILE_VAR, EnvSource};
use crate::error::{BoxError, FlagfigError};
use crate::parser::{CommandHandler, Parser, Settings, UnknownOptionHandler};
use crate::schema::{self, ExtractSettings, Options};
use crate::types::{OptionStyle, SplitArgument};

/// Entry point for building a flagfig parser.
pub struct Flagfig;

impl Flagfig {
    pub fn parser<C: Options>() -> ParserBuilder<C> {
        ParserBuilder::new()
    }
}

/// Builder for configuring a [`Parser`].
///
/// Controls three orthogonal axes:
///
/// - **Syntax**: [`style()`](Self::style) and the namespace delimiters decide
///   how options are spelled.
/// - **Policy**: [`pass_after_non_option()`](Self::pass_after_non_option),
///   [`ignore_unknown()`](Self::ignore_unknown) and the two callbacks decide
///   what happens to tokens the schema does not describe.
/// - **Environment**: [`env_vars()`](Self::env_vars), [`no_env()`](Self::no_env)
///   and [`env_file_var()`](Self::env_file_var) decide where env values come from.
pub struct ParserBuilder<C: Options> {
    style: OptionStyle,
    namespace_delimiter: String,
    env_namespace_delimiter: String,
    print_errors: bool,
    exit_on_error: bool,
    pass_after_non_option: bool,
    ignore_unknown: bool,
    env_vars: Option<Vec<(String, String)>>,
    env_enabled: bool,
    env_file_var: Option<String>,
    unknown_option_handler: Option<Box<UnknownOptionHandler>>,
    command_handler: Option<Box<CommandHandler>>,
    _phantom: PhantomData<C>,
}

impl<C: Options> ParserBuilder<C> {
    fn new() -> Self {
        Self {
            style: OptionStyle::default(),
            namespace_delimiter: ".".into(),
            env_namespace_delimiter: "_".into(),
            print_errors: true,
            exit_on_error: false,
            pass_after_non_option: false,
            ignore_unknown: false,
            env_vars: None,
            env_enabled: true,
            env_file_var: Some(DEFAULT_ENV_FILE_VAR.into()),
            unknown_option_handler: None,
            command_handler: None,
            _phantom: PhantomData,
        }
    }

    /// Set the option style (default: [`OptionStyle::Windows`] on Windows,
    /// [`OptionStyle::Posix`] elsewhere).
    pub fn style(mut self, style: OptionStyle) -> Self {
        self.style = style;
        self
    }

    /// Separator between a group namespace and a long name (default: `"."`).
    pub fn namespace_delimiter(mut self, delimiter: &str) -> Self {
        self.namespace_delimiter = delimiter.to_string();
        self
    }

    /// Separator between a group env namespace and a variable name (default: `"_"`).
    pub fn env_namespace_delimiter(mut self, delimiter: &str) -> Self {
        self.env_namespace_delimiter = delimiter.to_string();
        self
    }

    /// Print errors to stderr from [`Parser::parse`] (default: `true`).
    pub fn print_errors(mut self, print: bool) -> Self {
        self.print_errors = print;
        self
    }

    /// Exit the process with status 1 when [`Parser::parse`] fails
    /// (default: `false`).
    pub fn exit_on_error(mut self, exit: bool) -> Self {
        self.exit_on_error = exit;
        self
    }

    /// Stop parsing options at the first positional argument of a scope
    /// without commands. Everything after it is returned as-is.
    pub fn pass_after_non_option(mut self, pass: bool) -> Self {
        self.pass_after_non_option = pass;
        self
    }

    /// Return unknown options among the positional arguments instead of
    /// failing. The unknown-option handler, when set, takes precedence.
    pub fn ignore_unknown(mut self, ignore: bool) -> Self {
        self.ignore_unknown = ignore;
        self
    }

    /// Read env values from `vars` instead of the process environment.
    pub fn env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Name of the variable that points at the defaults file
    /// (default: `ENV_FILENAME`).
    pub fn env_file_var(mut self, name: &str) -> Self {
        self.env_file_var = Some(name.to_string());
        self
    }

    /// Never load a defaults file.
    pub fn no_env_file(mut self) -> Self {
        self.env_file_var = None;
        self
    }

    /// Called for every option the schema does not know. Receives the
    /// option name without prefix (the whole cluster for short options), its
    /// inline value if any, and the remaining arguments; returns the
    /// remaining arguments the parser should continue with.
    pub fn unknown_option_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&str, SplitArgument, Vec<String>) -> Result<Vec<String>, BoxError> + 'static,
    {
        self.unknown_option_handler = Some(Box::new(handler));
        self
    }

    /// Called once after a successful pass with the deepest active command
    /// (or `None`) and the leftover positional arguments. Replaces the call
    /// to the command's own `execute`.
    pub fn command_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Option<ActiveCommand<'_>>, &[String]) -> Result<(), BoxError> + 'static,
    {
        self.command_handler = Some(Box::new(handler));
        self
    }

    /// Resolve the effective env source.
    fn effective_env_source(&self) -> EnvSource {
        if !self.env_enabled {
            return EnvSource::Disabled;
        }
        match &self.env_vars {
            Some(vars) => EnvSource::Vars(vars.clone()),
            None => EnvSource::Process,
        }
    }

    fn extract_settings(&self) -> ExtractSettings {
        ExtractSettings {
            style: self.style,
            namespace_delimiter: self.namespace_delimiter.clone(),
            env_namespace_delimiter: self.env_namespace_delimiter.clone(),
        }
    }

    /// Extract and validate the schema of `C` and return the parser.
    pub fn build(self) -> Result<Parser<C>, FlagfigError> {
        let extract = self.extract_settings();
        let schema = schema::extract::<C>(&extract)?;
        debug!(
            fields = schema.fields.len(),
            commands = schema.commands.len(),
            "built parser schema"
        );

        let settings = Settings {
            style: self.style,
            print_errors: self.print_errors,
            exit_on_error: self.exit_on_error,
            pass_after_non_option: self.pass_after_non_option,
            ignore_unknown: self.ignore_unknown,
            env: self.effective_env_source(),
            env_file_var: self.env_file_var.clone(),
        };
        Ok(Parser::new(
            schema,
            settings,
            self.unknown_option_handler,
            self.command_handler,
        ))
    }
}
