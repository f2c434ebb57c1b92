//! Declarative, typed command-line option parsing. Describe your options
//! once, hand over the arguments, and get a populated struct back.
//!
//! Flagfig turns a raw argument vector and the process environment into a
//! fully populated configuration record, plus whatever positional arguments
//! were left over. Fields carry their own metadata: long and short names,
//! environment bindings, defaults, choices, namespaces and subcommands.
//!
//! ```ignore
//! let mut opts = Opts::default();
//! let rest = Flagfig::parser::<Opts>().build()?.parse_args(&mut opts, ["-v", "--port", "80"])?;
//! ```
//!
//! # Describing options
//!
//! A record implements [`Options`] and lists its fields on a [`Describe`].
//! Every field is reached through a plain accessor, so the record stays an
//! ordinary struct with no derive and no wrapper types:
//!
//! ```ignore
//! impl Options for Opts {
//!     fn describe(d: &mut Describe<Self>) {
//!         d.field(Field::new("verbose", |o: &mut Self| &mut o.verbose).short('v'))
//!             .field(
//!                 Field::new("port", |o: &mut Self| &mut o.port)
//!                     .long("port")
//!                     .env("PORT")
//!                     .default("8080"),
//!             )
//!             .group(Group::new("Server", |o: &mut Self| &mut o.server).namespace("server"))
//!             .command(Command::new("serve", |o: &mut Self| &mut o.serve));
//!     }
//! }
//! ```
//!
//! The declaration is checked once, in [`ParserBuilder::build`]: duplicate
//! names within a scope, booleans with defaults, and default or choice
//! literals the field type cannot parse are all reported there as
//! [`FlagfigError`]s with [`ErrorKind::Schema`].
//!
//! # Value types
//!
//! The field's Rust type decides how values are parsed and how repeated
//! occurrences combine (see [`FlagValue`]):
//!
//! | Type | One occurrence |
//! |------|----------------|
//! | integers, floats, `String`, `PathBuf`, `bool`, `Duration` | replaces the value |
//! | `Option<T>` | sets `Some(value)` |
//! | `Vec<T>` | appends |
//! | `HashMap<String, T>` / `BTreeMap<String, T>` | `key:value`, sets the key |
//! | `HashMap<String, Vec<T>>` | `key:value`, appends under the key |
//!
//! Durations use the compound grammar `300ms`, `1h30m`, `1.5s`. Anything
//! else implements [`Unmarshal`] and is declared with [`Field::custom`].
//!
//! # Precedence
//!
//! ```text
//! Zero value            T::default()
//!        ↑ overridden by
//! Declared defaults     .default("..."), in order, appending for sequences
//!        ↑ replaced by
//! Environment           .env("NAME"), split on .env_delim() when set
//!        ↑ overridden by
//! Command line          the first explicit occurrence of a sequence or map
//!                       drops what the layers below put there
//! ```
//!
//! Environment values are read from a snapshot taken once per parse call. A
//! defaults file named by `ENV_FILENAME` (configurable with
//! [`env_file_var()`](ParserBuilder::env_file_var)) is merged underneath the
//! process variables. Tests inject variables with
//! [`env_vars()`](ParserBuilder::env_vars) instead of touching the process
//! environment.
//!
//! # Arguments
//!
//! - `--name value`, `--name=value`, `-n value`, `-nvalue`, `-n=value`
//! - clusters: `-abc` sets switches `a` and `b`; the first value-taking
//!   option in a cluster takes the rest of the token (or the next argument)
//! - `--` ends option parsing
//! - a value that looks like an option is refused unless it is `-`, the
//!   field's type accepts it through [`Unmarshal::is_valid_value`], or it is
//!   a negative number for a numeric field
//! - `"quoted"` command-line values are unquoted, unless the field opts out
//!
//! [`OptionStyle::Windows`] adds `/name`, `/name:value` and `/n`.
//!
//! # Commands
//!
//! Commands are nested records that implement [`Commander`]. The first
//! positional argument naming a command (or one of its aliases) activates
//! it; later arguments are parsed against the command's own options. After
//! the pass the registered command handler, or else the deepest active
//! command's [`execute`](Commander::execute), receives the leftover
//! positional arguments.
//!
//! # Error handling
//!
//! Every failure is a [`FlagfigError`] value; [`Parser::parse_args`] never
//! prints or exits. [`Parser::parse`] prints errors to stderr and can exit
//! the process, per [`print_errors()`](ParserBuilder::print_errors) and
//! [`exit_on_error()`](ParserBuilder::exit_on_error). With the
//! `rich-errors` feature, errors also implement `miette::Diagnostic`.
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod error;
pub mod types;

mod builder;
mod command;
mod describe;
mod duration;
mod env;
mod field;
pub mod file;
mod parser;
mod registry;
mod resolve;
mod schema;
mod tokenize;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{Flagfig, ParserBuilder};
pub use command::{ActiveCommand, Commander};
pub use describe::{CommandDescription, Description, OptionDescription};
pub use duration::parse_duration;
pub use env::{DEFAULT_ENV_FILE_VAR, EnvSnapshot, EnvSource};
pub use error::{BoxError, ErrorKind, FlagfigError, NameKind};
pub use field::{Field, FieldSpec};
pub use parser::{CommandHandler, Parser, UnknownOptionHandler};
pub use schema::{Command, Describe, Group, Options};
pub use types::{OptionStyle, SplitArgument};
pub use value::{FlagValue, Kind, MapValue, ScalarKind, ScalarValue, Unmarshal, ValueError};

/// Parse `args` into `target` with a default parser.
pub fn parse_args<C, I, S>(target: &mut C, args: I) -> Result<Vec<String>, FlagfigError>
where
    C: Options,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Flagfig::parser::<C>().build()?.parse_args(target, args)
}

/// Parse the process arguments into `target` with a default parser.
pub fn parse<C: Options>(target: &mut C) -> Result<Vec<String>, FlagfigError> {
    Flagfig::parser::<C>().build()?.parse(target)
}
