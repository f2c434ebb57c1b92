//! Field descriptors: per-field metadata plus a type-erased way to write the
//! parsed value back into the configuration record.
//!
//! A field is reached through a plain accessor, `fn(&mut C) -> &mut T`. When
//! a field is declared inside a group or a command, the extractor lifts it to
//! the root record by composing accessors, so every descriptor in a parser
//! writes through the same `&mut C`.

use crate::error::FlagfigError;
use crate::types::OptionStyle;
use crate::value::{FlagValue, Kind, ScalarKind, Unmarshal, ValueError};

/// Metadata of one field, as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Identity of the field, used in diagnostics when it has no option name.
    pub name: String,
    pub long: Option<String>,
    pub short: Option<char>,
    pub env: Option<String>,
    /// Default literals in declaration order. Several entries append for
    /// sequence and map fields.
    pub defaults: Vec<String>,
    /// Splits one environment string into several values.
    pub env_delim: Option<char>,
    /// Strip one pair of enclosing double quotes from command-line values.
    pub unquote: bool,
    pub choices: Vec<String>,
    /// Used when the option appears without a value. Makes the value optional.
    pub optional_values: Vec<String>,
    pub required: bool,
    pub hidden: bool,
    pub description: Option<String>,
    pub value_name: Option<String>,
}

impl FieldSpec {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            long: None,
            short: None,
            env: None,
            defaults: Vec::new(),
            env_delim: None,
            unquote: true,
            choices: Vec::new(),
            optional_values: Vec::new(),
            required: false,
            hidden: false,
            description: None,
            value_name: None,
        }
    }

    /// How the option is spelled in messages: the long form when there is
    /// one, else the short form, else the environment variable.
    pub fn display_name(&self, style: OptionStyle) -> String {
        if let Some(long) = &self.long {
            format!("{}{long}", style.long_prefix())
        } else if let Some(short) = self.short {
            format!("{}{short}", style.short_prefix())
        } else if let Some(env) = &self.env {
            format!("${env}")
        } else {
            self.name.clone()
        }
    }
}

/// Type-erased access to one field inside `C`.
pub(crate) trait Slot<C>: 'static {
    fn kind(&self) -> Kind;
    /// Restore the zero value.
    fn reset(&self, target: &mut C);
    fn apply(&self, target: &mut C, raw: &str) -> Result<(), ValueError>;
    /// Coerce `raw` without writing it anywhere.
    fn check(&self, raw: &str) -> Result<(), ValueError>;
    /// Result of the type's own validity check, if it has one.
    fn validate(&self, raw: &str) -> Option<Result<(), String>>;
}

struct Typed<C, T> {
    access: fn(&mut C) -> &mut T,
}

impl<C: 'static, T: FlagValue> Slot<C> for Typed<C, T> {
    fn kind(&self) -> Kind {
        T::kind()
    }

    fn reset(&self, target: &mut C) {
        *(self.access)(target) = T::default();
    }

    fn apply(&self, target: &mut C, raw: &str) -> Result<(), ValueError> {
        (self.access)(target).apply(raw)
    }

    fn check(&self, raw: &str) -> Result<(), ValueError> {
        T::check(raw)
    }

    fn validate(&self, _raw: &str) -> Option<Result<(), String>> {
        None
    }
}

struct Custom<C, T> {
    access: fn(&mut C) -> &mut T,
}

impl<C: 'static, T: Unmarshal> Slot<C> for Custom<C, T> {
    fn kind(&self) -> Kind {
        Kind::Scalar(ScalarKind::Custom)
    }

    fn reset(&self, target: &mut C) {
        *(self.access)(target) = T::default();
    }

    fn apply(&self, target: &mut C, raw: &str) -> Result<(), ValueError> {
        (self.access)(target)
            .unmarshal_flag(raw)
            .map_err(ValueError::Invalid)
    }

    fn check(&self, raw: &str) -> Result<(), ValueError> {
        T::default().unmarshal_flag(raw).map_err(ValueError::Invalid)
    }

    fn validate(&self, raw: &str) -> Option<Result<(), String>> {
        T::is_valid_value(raw)
    }
}

/// A slot declared on a nested record `G`, reached from `C` through `access`.
struct Lifted<C, G> {
    access: fn(&mut C) -> &mut G,
    inner: Box<dyn Slot<G>>,
}

impl<C: 'static, G: 'static> Slot<C> for Lifted<C, G> {
    fn kind(&self) -> Kind {
        self.inner.kind()
    }

    fn reset(&self, target: &mut C) {
        self.inner.reset((self.access)(target));
    }

    fn apply(&self, target: &mut C, raw: &str) -> Result<(), ValueError> {
        self.inner.apply((self.access)(target), raw)
    }

    fn check(&self, raw: &str) -> Result<(), ValueError> {
        self.inner.check(raw)
    }

    fn validate(&self, raw: &str) -> Option<Result<(), String>> {
        self.inner.validate(raw)
    }
}

/// Declaration of one settable field of `C`.
///
/// ```ignore
/// Field::new("port", |o: &mut Opts| &mut o.port)
///     .long("port")
///     .short('p')
///     .env("PORT")
///     .default("8080")
/// ```
pub struct Field<C> {
    pub(crate) spec: FieldSpec,
    pub(crate) slot: Box<dyn Slot<C>>,
}

impl<C: 'static> Field<C> {
    /// A field of any built-in [`FlagValue`] type.
    pub fn new<T: FlagValue>(name: &str, access: fn(&mut C) -> &mut T) -> Self {
        Self {
            spec: FieldSpec::named(name),
            slot: Box::new(Typed { access }),
        }
    }

    /// A field whose type parses itself through [`Unmarshal`].
    pub fn custom<T: Unmarshal>(name: &str, access: fn(&mut C) -> &mut T) -> Self {
        Self {
            spec: FieldSpec::named(name),
            slot: Box::new(Custom { access }),
        }
    }

    pub fn long(mut self, name: &str) -> Self {
        self.spec.long = Some(name.to_string());
        self
    }

    pub fn short(mut self, name: char) -> Self {
        self.spec.short = Some(name);
        self
    }

    pub fn env(mut self, name: &str) -> Self {
        self.spec.env = Some(name.to_string());
        self
    }

    /// Add a default literal. Call repeatedly to seed several elements of a
    /// sequence or several map entries.
    pub fn default(mut self, literal: &str) -> Self {
        self.spec.defaults.push(literal.to_string());
        self
    }

    pub fn env_delim(mut self, delim: char) -> Self {
        self.spec.env_delim = Some(delim);
        self
    }

    /// Enable or disable unquoting of command-line values (default: on).
    pub fn unquote(mut self, unquote: bool) -> Self {
        self.spec.unquote = unquote;
        self
    }

    pub fn choice(mut self, literal: &str) -> Self {
        self.spec.choices.push(literal.to_string());
        self
    }

    pub fn choices<'a>(mut self, literals: impl IntoIterator<Item = &'a str>) -> Self {
        self.spec
            .choices
            .extend(literals.into_iter().map(str::to_string));
        self
    }

    /// Value to use when the option is given without one. The next argument
    /// is then never consumed as the value.
    pub fn optional_value(mut self, literal: &str) -> Self {
        self.spec.optional_values.push(literal.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.spec.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.spec.hidden = true;
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.spec.description = Some(text.to_string());
        self
    }

    pub fn value_name(mut self, name: &str) -> Self {
        self.spec.value_name = Some(name.to_string());
        self
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn kind(&self) -> Kind {
        self.slot.kind()
    }

    /// Re-root this field onto a parent record.
    pub(crate) fn lift<P: 'static>(self, access: fn(&mut P) -> &mut C) -> Field<P> {
        Field {
            spec: self.spec,
            slot: Box::new(Lifted {
                access,
                inner: self.slot,
            }),
        }
    }

    /// Check the declaration itself. Runs once, when the parser is built.
    pub(crate) fn validate_declaration(&self, style: OptionStyle) -> Result<(), FlagfigError> {
        let spec = &self.spec;
        let invalid = |reason: String| FlagfigError::InvalidSchema {
            field: spec.name.clone(),
            reason,
        };

        if spec.long.is_none() && spec.short.is_none() && spec.env.is_none() {
            return Err(invalid(
                "needs a long name, a short name or an environment variable".into(),
            ));
        }
        if let Some(long) = &spec.long
            && (long.is_empty() || long.starts_with('-') || long.contains('='))
        {
            return Err(invalid(format!("'{long}' is not a valid long name")));
        }
        if let Some(short) = spec.short
            && (short == '-' || short == '=' || short.is_whitespace())
        {
            return Err(invalid(format!("'{short}' is not a valid short name")));
        }

        let kind = self.kind();
        if kind.is_switch() && !spec.defaults.is_empty() {
            return Err(invalid(format!(
                "boolean flag '{}' may not have default values, they always default to false and can only be turned on",
                spec.display_name(style)
            )));
        }

        let literals = spec
            .defaults
            .iter()
            .chain(&spec.choices)
            .chain(&spec.optional_values);
        for literal in literals {
            if let Err(e) = self.slot.check(literal) {
                let reason = match e {
                    ValueError::Syntax { reason, .. } => reason,
                    ValueError::Invalid(message) => message,
                };
                return Err(invalid(format!(
                    "declared literal \"{literal}\" is not a valid {kind:?} value: {reason}"
                )));
            }
        }
        Ok(())
    }

    /// Write one value through the slot: validity check, coercion, then the
    /// choice constraint.
    pub(crate) fn assign(&self, target: &mut C, raw: &str, flag: &str) -> Result<(), FlagfigError> {
        if let Some(Err(message)) = self.slot.validate(raw) {
            return Err(FlagfigError::InvalidValue {
                flag: flag.to_string(),
                message,
            });
        }
        self.slot
            .apply(target, raw)
            .map_err(|e| value_error(flag, e))?;

        if !self.spec.choices.is_empty() && !self.spec.choices.iter().any(|c| c == raw) {
            return Err(FlagfigError::InvalidChoice {
                flag: flag.to_string(),
                value: raw.to_string(),
                choices: self.spec.choices.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn reset(&self, target: &mut C) {
        self.slot.reset(target);
    }

    /// Whether the type's validity check accepts `raw`. `None` when the type
    /// has no such check.
    pub(crate) fn accepts(&self, raw: &str) -> Option<Result<(), String>> {
        self.slot.validate(raw)
    }
}

pub(crate) fn value_error(flag: &str, err: ValueError) -> FlagfigError {
    match err {
        ValueError::Syntax { literal, reason } => FlagfigError::Syntax {
            flag: flag.to_string(),
            literal,
            reason,
        },
        ValueError::Invalid(message) => FlagfigError::InvalidValue {
            flag: flag.to_string(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::test::{Flag, Outer};

    #[test]
    fn display_name_prefers_long() {
        let f = Field::new("x", |o: &mut Outer| &mut o.level)
            .long("level")
            .short('l');
        assert_eq!(f.spec().display_name(OptionStyle::Posix), "--level");
        assert_eq!(f.spec().display_name(OptionStyle::Windows), "/level");

        let f = Field::new("x", |o: &mut Outer| &mut o.level).short('l');
        assert_eq!(f.spec().display_name(OptionStyle::Posix), "-l");

        let f = Field::new("x", |o: &mut Outer| &mut o.level).env("LEVEL");
        assert_eq!(f.spec().display_name(OptionStyle::Posix), "$LEVEL");
    }

    #[test]
    fn assign_writes_through_accessor() {
        let f = Field::new("level", |o: &mut Outer| &mut o.level).long("level");
        let mut outer = Outer::default();
        f.assign(&mut outer, "4", "--level").unwrap();
        assert_eq!(outer.level, 4);
    }

    #[test]
    fn lifted_field_reaches_nested_record() {
        let inner = Field::new("name", |i: &mut crate::fixtures::test::Inner| &mut i.name).long("name");
        let f: Field<Outer> = inner.lift(|o: &mut Outer| &mut o.inner);
        let mut outer = Outer::default();
        f.assign(&mut outer, "deep", "--name").unwrap();
        assert_eq!(outer.inner.name, "deep");

        f.reset(&mut outer);
        assert_eq!(outer.inner.name, "");
    }

    #[test]
    fn assign_reports_syntax_with_literal() {
        let f = Field::new("level", |o: &mut Outer| &mut o.level).long("level");
        let err = f.assign(&mut Outer::default(), "high", "--level").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("parsing \"high\""));
    }

    #[test]
    fn choice_checked_after_coercion() {
        let f = Field::new("mode", |o: &mut Outer| &mut o.mode)
            .long("mode")
            .choices(["fast", "slow"]);
        let mut outer = Outer::default();
        f.assign(&mut outer, "slow", "--mode").unwrap();
        let err = f.assign(&mut outer, "medium", "--mode").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidChoice);
        assert!(err.to_string().ends_with("Allowed values are: fast or slow"));
    }

    #[test]
    fn custom_validator_runs_before_unmarshal() {
        let f = Field::custom("flag", |o: &mut Outer| &mut o.flag).long("flag");
        let mut outer = Outer::default();
        f.assign(&mut outer, "-foo", "--flag").unwrap();
        assert_eq!(outer.flag, Flag("-foo".into()));

        let err = f.assign(&mut outer, "-2", "--flag").unwrap_err();
        assert_eq!(err.to_string(), "invalid flag value");
        assert_eq!(outer.flag, Flag("-foo".into()));
    }

    #[test]
    fn bool_default_rejected() {
        let f = Field::new("d", |o: &mut Outer| &mut o.verbose)
            .short('d')
            .default("true");
        let err = f.validate_declaration(OptionStyle::Posix).unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains(
            "boolean flag '-d' may not have default values, they always default to false and can only be turned on"
        ));
    }

    #[test]
    fn malformed_default_rejected() {
        let f = Field::new("level", |o: &mut Outer| &mut o.level)
            .long("level")
            .default("lots");
        assert!(f.validate_declaration(OptionStyle::Posix).is_err());
    }

    #[test]
    fn nameless_field_rejected() {
        let f = Field::new("level", |o: &mut Outer| &mut o.level);
        let err = f.validate_declaration(OptionStyle::Posix).unwrap_err();
        assert!(err.to_string().contains("'level'"));
    }

    #[test]
    fn env_only_field_is_valid() {
        let f = Field::new("level", |o: &mut Outer| &mut o.level).env("LEVEL");
        assert!(f.validate_declaration(OptionStyle::Posix).is_ok());
    }
}
