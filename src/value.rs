//! Type-directed coercion from raw strings into field values.
//!
//! Every supported field type maps onto a closed [`Kind`]: a shape (scalar,
//! optional, sequence, map, map of sequences) around a [`ScalarKind`]
//! element. [`FlagValue`] is implemented for the supported shapes and is the
//! only thing the parser needs from a field's type:
//!
//! | Rust type                     | Kind                | One occurrence        |
//! |-------------------------------|---------------------|-----------------------|
//! | `i32`, `f64`, `String`, ...   | `Scalar(_)`         | replaces the value    |
//! | `Option<T>`                   | `Optional(_)`       | sets `Some(value)`    |
//! | `Vec<T>`                      | `Seq(_)`            | appends one element   |
//! | `HashMap<String, T>`          | `Map(_)`            | sets one key          |
//! | `HashMap<String, Vec<T>>`     | `MapSeq(_)`         | appends under one key |
//!
//! Types outside this table plug in through [`Unmarshal`].

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::duration::parse_duration;

/// Element type of a field, independent of its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Duration,
    Custom,
}

impl ScalarKind {
    /// Signed numeric elements accept values like `-3` or `-3.2` even though
    /// they look like short options. Unsigned ones cannot hold them.
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float)
    }
}

/// Shape and element type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "element", rename_all = "snake_case")]
pub enum Kind {
    Scalar(ScalarKind),
    Optional(ScalarKind),
    Seq(ScalarKind),
    Map(ScalarKind),
    MapSeq(ScalarKind),
}

impl Kind {
    pub fn element(self) -> ScalarKind {
        match self {
            Kind::Scalar(e) | Kind::Optional(e) | Kind::Seq(e) | Kind::Map(e) | Kind::MapSeq(e) => e,
        }
    }

    /// Boolean switches are turned on by presence and never take a value.
    /// Maps always take one, even over booleans.
    pub fn is_switch(self) -> bool {
        matches!(
            self,
            Kind::Scalar(ScalarKind::Bool) | Kind::Optional(ScalarKind::Bool) | Kind::Seq(ScalarKind::Bool)
        )
    }

    pub fn takes_value(self) -> bool {
        !self.is_switch()
    }

    pub fn is_numeric(self) -> bool {
        self.element().is_numeric()
    }

    /// Sequences and maps accumulate across occurrences.
    pub fn is_collection(self) -> bool {
        matches!(self, Kind::Seq(_) | Kind::Map(_) | Kind::MapSeq(_))
    }
}

/// A raw string could not be coerced. Carries no option name; the parser
/// attaches that when it surfaces the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    Syntax { literal: String, reason: String },
    /// Rejected by a custom type; the message is passed on verbatim.
    Invalid(String),
}

impl ValueError {
    pub(crate) fn syntax(literal: &str, reason: impl ToString) -> Self {
        ValueError::Syntax {
            literal: literal.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A single element parsed from its standard textual form.
pub trait ScalarValue: Sized + 'static {
    const KIND: ScalarKind;

    fn parse_value(raw: &str) -> Result<Self, ValueError>;
}

/// A field type the parser can write into.
///
/// `Default` is the zero value the resolver starts from.
pub trait FlagValue: Default + 'static {
    fn kind() -> Kind;

    /// Fold one occurrence into the current value.
    fn apply(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Check that `raw` would be accepted, without a target to write to.
    fn check(raw: &str) -> Result<(), ValueError> {
        Self::default().apply(raw)
    }
}

/// A value type stored under a map key.
pub trait MapValue: Sized + 'static {
    fn map_kind() -> Kind;

    /// Fold one raw value into the existing entry for its key, if any.
    fn fold(existing: Option<Self>, raw: &str) -> Result<Self, ValueError>;
}

/// Custom parsing capability for types outside the built-in set.
///
/// Register such a field with [`Field::custom`](crate::Field::custom).
pub trait Unmarshal: Default + 'static {
    /// Parse `value` into `self`. The error message is reported verbatim.
    fn unmarshal_flag(&mut self, value: &str) -> Result<(), String>;

    /// Validate a raw value before it is unmarshalled. Returning `Some` also
    /// lets values that look like options (`-foo`, `-1`) through when the
    /// check passes. `None` means the type performs no such check.
    fn is_valid_value(_value: &str) -> Option<Result<(), String>> {
        None
    }
}

pub(crate) fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ValueError::syntax(raw, "invalid syntax")),
    }
}

/// Split a map entry once on the first `:`.
pub(crate) fn split_entry(raw: &str) -> Result<(&str, &str), ValueError> {
    raw.split_once(':')
        .ok_or_else(|| ValueError::syntax(raw, "expected key:value"))
}

macro_rules! parsed_scalar {
    ($kind:ident => $($t:ty),+) => {
        $(
            impl ScalarValue for $t {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn parse_value(raw: &str) -> Result<Self, ValueError> {
                    raw.parse::<$t>().map_err(|e| ValueError::syntax(raw, e))
                }
            }
        )+
    };
}

parsed_scalar!(Int => i8, i16, i32, i64, isize);
parsed_scalar!(Uint => u8, u16, u32, u64, usize);
parsed_scalar!(Float => f32, f64);

impl ScalarValue for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        parse_bool(raw)
    }
}

impl ScalarValue for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }
}

impl ScalarValue for PathBuf {
    const KIND: ScalarKind = ScalarKind::String;

    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        Ok(PathBuf::from(raw))
    }
}

impl ScalarValue for Duration {
    const KIND: ScalarKind = ScalarKind::Duration;

    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        parse_duration(raw).map_err(|reason| ValueError::syntax(raw, reason))
    }
}

macro_rules! scalar_shapes {
    ($($t:ty),+) => {
        $(
            impl FlagValue for $t {
                fn kind() -> Kind {
                    Kind::Scalar(<$t as ScalarValue>::KIND)
                }

                fn apply(&mut self, raw: &str) -> Result<(), ValueError> {
                    *self = <$t as ScalarValue>::parse_value(raw)?;
                    Ok(())
                }
            }

            impl MapValue for $t {
                fn map_kind() -> Kind {
                    Kind::Map(<$t as ScalarValue>::KIND)
                }

                fn fold(_existing: Option<Self>, raw: &str) -> Result<Self, ValueError> {
                    <$t as ScalarValue>::parse_value(raw)
                }
            }
        )+
    };
}

scalar_shapes!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, String, PathBuf, Duration
);

impl<T: ScalarValue> FlagValue for Option<T> {
    fn kind() -> Kind {
        Kind::Optional(T::KIND)
    }

    fn apply(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = Some(T::parse_value(raw)?);
        Ok(())
    }
}

impl<T: ScalarValue> FlagValue for Vec<T> {
    fn kind() -> Kind {
        Kind::Seq(T::KIND)
    }

    fn apply(&mut self, raw: &str) -> Result<(), ValueError> {
        self.push(T::parse_value(raw)?);
        Ok(())
    }
}

impl<T: ScalarValue> MapValue for Vec<T> {
    fn map_kind() -> Kind {
        Kind::MapSeq(T::KIND)
    }

    fn fold(existing: Option<Self>, raw: &str) -> Result<Self, ValueError> {
        let mut items = existing.unwrap_or_default();
        items.push(T::parse_value(raw)?);
        Ok(items)
    }
}

impl<V: MapValue> FlagValue for HashMap<String, V> {
    fn kind() -> Kind {
        V::map_kind()
    }

    fn apply(&mut self, raw: &str) -> Result<(), ValueError> {
        let (key, value) = split_entry(raw)?;
        let folded = V::fold(self.remove(key), value)?;
        self.insert(key.to_string(), folded);
        Ok(())
    }
}

impl<V: MapValue> FlagValue for BTreeMap<String, V> {
    fn kind() -> Kind {
        V::map_kind()
    }

    fn apply(&mut self, raw: &str) -> Result<(), ValueError> {
        let (key, value) = split_entry(raw)?;
        let folded = V::fold(self.remove(key), value)?;
        self.insert(key.to_string(), folded);
        Ok(())
    }
}
