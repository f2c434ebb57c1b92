use serde::Serialize;

/// Which option-prefix family the parser speaks.
///
/// `Posix` recognizes `--long`, `--long=value`, `-s`, `-abc` and `-svalue`.
/// `Windows` additionally recognizes `/long`, `/long:value` and `/s`, and
/// spells options with `/` in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionStyle {
    Posix,
    Windows,
}

impl Default for OptionStyle {
    fn default() -> Self {
        if cfg!(windows) {
            OptionStyle::Windows
        } else {
            OptionStyle::Posix
        }
    }
}

impl OptionStyle {
    pub fn long_prefix(self) -> &'static str {
        match self {
            OptionStyle::Posix => "--",
            OptionStyle::Windows => "/",
        }
    }

    pub fn short_prefix(self) -> &'static str {
        match self {
            OptionStyle::Posix => "-",
            OptionStyle::Windows => "/",
        }
    }
}

/// The value half of an option token, as handed to the unknown-option
/// handler: `Some` for `--name=value`, `None` for a bare `--name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitArgument {
    value: Option<String>,
}

impl SplitArgument {
    pub(crate) fn new(value: Option<String>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
