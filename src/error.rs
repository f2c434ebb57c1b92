use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Error type returned by callbacks (unknown-option handler, command handler,
/// [`Commander::execute`](crate::Commander::execute)).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum FlagfigError {
    #[error("Invalid declaration for '{field}': {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::schema)))]
    InvalidSchema { field: String, reason: String },

    #[error("{what} '{name}' is declared more than once in {scope}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::duplicate)))]
    DuplicateName {
        what: NameKind,
        name: String,
        scope: String,
    },

    #[error("expected argument for flag '{flag}'{}", found_suffix(.found))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::expected_argument)))]
    ExpectedArgument { flag: String, found: Option<String> },

    #[error("bool flag '{flag}' cannot have an argument")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::bool_argument)))]
    NoArgumentForBool { flag: String },

    #[error("invalid argument for flag '{flag}': parsing \"{literal}\": {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::syntax)))]
    Syntax {
        flag: String,
        literal: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for option '{flag}'. Allowed values are: {}", .choices.join(" or "))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::choice)))]
    InvalidChoice {
        flag: String,
        value: String,
        choices: Vec<String>,
    },

    /// A validator or custom unmarshaller rejected the value. The message is
    /// the type's own message, unmodified.
    #[error("{message}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::invalid_value)))]
    InvalidValue { flag: String, message: String },

    #[error("unknown flag '{flag}'")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::unknown_flag)))]
    UnknownFlag { flag: String },

    #[error("Unknown command '{name}'. Please specify one command of: {}", .available.join(" or "))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::unknown_command)))]
    UnknownCommand { name: String, available: Vec<String> },

    #[error("Please specify one command of: {}", .available.join(" or "))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::command_required)))]
    CommandRequired { available: Vec<String> },

    #[error("{}", required_message(.flags))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::required)))]
    Required { flags: Vec<String> },

    /// Returned by the unknown-option handler.
    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::handler)))]
    Handler(BoxError),

    /// Returned by the command handler or the command's own `execute`.
    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::command)))]
    Command(BoxError),

    #[error("Failed to load env file {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::env_file)))]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
}

/// Which namespace a duplicate name collided in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Long,
    Short,
    Env,
    Command,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NameKind::Long => "long option",
            NameKind::Short => "short option",
            NameKind::Env => "environment variable",
            NameKind::Command => "command",
        };
        f.write_str(s)
    }
}

/// Coarse classification of a [`FlagfigError`], handy for matching in callers
/// that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    ExpectedArgument,
    NoArgumentForBool,
    Syntax,
    InvalidChoice,
    InvalidValue,
    UnknownFlag,
    UnknownCommand,
    CommandRequired,
    Required,
    Handler,
    Command,
    EnvFile,
}

impl FlagfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlagfigError::InvalidSchema { .. } | FlagfigError::DuplicateName { .. } => {
                ErrorKind::Schema
            }
            FlagfigError::ExpectedArgument { .. } => ErrorKind::ExpectedArgument,
            FlagfigError::NoArgumentForBool { .. } => ErrorKind::NoArgumentForBool,
            FlagfigError::Syntax { .. } => ErrorKind::Syntax,
            FlagfigError::InvalidChoice { .. } => ErrorKind::InvalidChoice,
            FlagfigError::InvalidValue { .. } => ErrorKind::InvalidValue,
            FlagfigError::UnknownFlag { .. } => ErrorKind::UnknownFlag,
            FlagfigError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            FlagfigError::CommandRequired { .. } => ErrorKind::CommandRequired,
            FlagfigError::Required { .. } => ErrorKind::Required,
            FlagfigError::Handler(_) => ErrorKind::Handler,
            FlagfigError::Command(_) => ErrorKind::Command,
            FlagfigError::EnvFile { .. } => ErrorKind::EnvFile,
        }
    }

    /// Whether this error comes from the declaration rather than the input.
    pub fn is_schema_error(&self) -> bool {
        self.kind() == ErrorKind::Schema
    }
}

fn found_suffix(found: &Option<String>) -> String {
    match found.as_deref() {
        None => String::new(),
        Some("--") => ", but got double dash '--'".to_string(),
        Some(token) => format!(", but got option '{token}'"),
    }
}

fn required_message(flags: &[String]) -> String {
    match flags {
        [] => "a required flag was not specified".to_string(),
        [single] => format!("the required flag '{single}' was not specified"),
        [rest @ .., last] => {
            let quoted: Vec<String> = rest.iter().map(|f| format!("'{f}'")).collect();
            format!(
                "the required flags {} and '{last}' were not specified",
                quoted.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_argument_mentions_option() {
        let err = FlagfigError::ExpectedArgument {
            flag: "--string-slice".into(),
            found: Some("-o".into()),
        };
        assert_eq!(
            err.to_string(),
            "expected argument for flag '--string-slice', but got option '-o'"
        );
    }

    #[test]
    fn expected_argument_mentions_double_dash() {
        let err = FlagfigError::ExpectedArgument {
            flag: "--string-slice".into(),
            found: Some("--".into()),
        };
        assert!(err.to_string().ends_with("but got double dash '--'"));
    }

    #[test]
    fn expected_argument_without_token() {
        let err = FlagfigError::ExpectedArgument {
            flag: "-o".into(),
            found: None,
        };
        assert_eq!(err.to_string(), "expected argument for flag '-o'");
    }

    #[test]
    fn choice_lists_alternatives() {
        let err = FlagfigError::InvalidChoice {
            flag: "--choose".into(),
            value: "invalid".into(),
            choices: vec!["v1".into(), "v2".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'invalid' for option '--choose'. Allowed values are: v1 or v2"
        );
    }

    #[test]
    fn invalid_value_is_verbatim() {
        let err = FlagfigError::InvalidValue {
            flag: "--custom-flag".into(),
            message: "invalid flag value".into(),
        };
        assert_eq!(err.to_string(), "invalid flag value");
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn required_lists_flags() {
        let one = FlagfigError::Required {
            flags: vec!["--name".into()],
        };
        assert_eq!(one.to_string(), "the required flag '--name' was not specified");

        let many = FlagfigError::Required {
            flags: vec!["--a".into(), "--b".into(), "--c".into()],
        };
        assert_eq!(
            many.to_string(),
            "the required flags '--a', '--b' and '--c' were not specified"
        );
    }

    #[test]
    fn duplicate_is_schema_error() {
        let err = FlagfigError::DuplicateName {
            what: NameKind::Short,
            name: "v".into(),
            scope: "root".into(),
        };
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("short option 'v'"));
    }

    #[test]
    fn command_error_keeps_message() {
        let err = FlagfigError::Command("boom".into());
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.kind(), ErrorKind::Command);
    }
}
