//! Token classification for the argument pass.
//!
//! The parser owns the left-to-right walk; this module only answers local
//! questions about a single token: what shape it has, whether it looks like
//! an option, and what it means once unquoted.

use std::borrow::Cow;

use crate::types::OptionStyle;
use crate::value::ValueError;

/// Shape of one raw argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// The bare `--`.
    Terminator,
    /// `--name` or `--name=value` (`/name`, `/name:value` in Windows style).
    Long {
        name: &'a str,
        value: Option<&'a str>,
    },
    /// `-abc`, `-ovalue` or `-o=value`. `body` is everything after the
    /// prefix, minus an `=value` part.
    Short {
        body: &'a str,
        value: Option<&'a str>,
    },
    Positional(&'a str),
}

pub(crate) fn classify(arg: &str, style: OptionStyle) -> Token<'_> {
    if arg == "--" {
        return Token::Terminator;
    }
    if let Some(rest) = arg.strip_prefix("--") {
        let (name, value) = split_inline(rest, &['=']);
        return Token::Long { name, value };
    }
    if let Some(rest) = arg.strip_prefix('-')
        && !rest.is_empty()
    {
        return short_token(rest);
    }
    if style == OptionStyle::Windows
        && let Some(rest) = arg.strip_prefix('/')
        && !rest.is_empty()
    {
        let (name, value) = split_inline(rest, &['=', ':']);
        return if name.chars().count() == 1 {
            Token::Short { body: name, value }
        } else {
            Token::Long { name, value }
        };
    }
    Token::Positional(arg)
}

fn split_inline<'a>(rest: &'a str, delims: &[char]) -> (&'a str, Option<&'a str>) {
    match rest.find(delims) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    }
}

/// `-o=value` splits only when the `=` directly follows a single option
/// character; `-abc=x` is a cluster whose tail is an inline value.
fn short_token(rest: &str) -> Token<'_> {
    let mut chars = rest.char_indices();
    if let (Some((_, _)), Some((pos, '='))) = (chars.next(), chars.next()) {
        return Token::Short {
            body: &rest[..pos],
            value: Some(&rest[pos + 1..]),
        };
    }
    Token::Short {
        body: rest,
        value: None,
    }
}

/// Whether a candidate value is shaped like an option. A lone `-` is not:
/// it is the conventional stand-in for standard input.
pub(crate) fn looks_like_option(arg: &str, style: OptionStyle) -> bool {
    if arg.len() < 2 {
        return false;
    }
    arg.starts_with('-') || (style == OptionStyle::Windows && arg.starts_with('/'))
}

/// `-3`, `-3.2`: a single dash directly followed by a decimal digit.
pub(crate) fn is_negative_number(arg: &str) -> bool {
    let bytes = arg.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'-' && bytes[1].is_ascii_digit()
}

/// Strip one pair of enclosing double quotes and resolve escapes inside.
///
/// Values that do not start with a quote (or are shorter than two bytes) are
/// returned unchanged. A value that starts with a quote must be a complete,
/// well-formed quoted string.
pub(crate) fn unquote(raw: &str) -> Result<Cow<'_, str>, ValueError> {
    if raw.len() < 2 || !raw.starts_with('"') {
        return Ok(Cow::Borrowed(raw));
    }
    let malformed = || ValueError::syntax(raw, "invalid syntax");
    let inner = raw[1..].strip_suffix('"').ok_or_else(malformed)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Err(malformed()),
            '\\' => {
                let escaped = match chars.next().ok_or_else(malformed)? {
                    '"' => '"',
                    '\'' => '\'',
                    '\\' => '\\',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '0' => '\0',
                    'a' => '\u{07}',
                    'b' => '\u{08}',
                    'f' => '\u{0c}',
                    'v' => '\u{0b}',
                    'x' => hex_escape(&mut chars, 2).ok_or_else(malformed)?,
                    'u' => hex_escape(&mut chars, 4).ok_or_else(malformed)?,
                    _ => return Err(malformed()),
                };
                out.push(escaped);
            }
            other => out.push(other),
        }
    }
    Ok(Cow::Owned(out))
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator() {
        assert_eq!(classify("--", OptionStyle::Posix), Token::Terminator);
    }

    #[test]
    fn long_with_and_without_value() {
        assert_eq!(
            classify("--str", OptionStyle::Posix),
            Token::Long {
                name: "str",
                value: None
            }
        );
        assert_eq!(
            classify("--str=a=b", OptionStyle::Posix),
            Token::Long {
                name: "str",
                value: Some("a=b")
            }
        );
        assert_eq!(
            classify("--str=", OptionStyle::Posix),
            Token::Long {
                name: "str",
                value: Some("")
            }
        );
    }

    #[test]
    fn short_cluster_and_inline() {
        assert_eq!(
            classify("-abc", OptionStyle::Posix),
            Token::Short {
                body: "abc",
                value: None
            }
        );
        assert_eq!(
            classify("-o=file", OptionStyle::Posix),
            Token::Short {
                body: "o",
                value: Some("file")
            }
        );
        assert_eq!(
            classify("-ab=c", OptionStyle::Posix),
            Token::Short {
                body: "ab=c",
                value: None
            }
        );
    }

    #[test]
    fn lone_dash_is_positional() {
        assert_eq!(classify("-", OptionStyle::Posix), Token::Positional("-"));
        assert_eq!(classify("file", OptionStyle::Posix), Token::Positional("file"));
    }

    #[test]
    fn windows_slash_forms() {
        assert_eq!(
            classify("/verbose", OptionStyle::Windows),
            Token::Long {
                name: "verbose",
                value: None
            }
        );
        assert_eq!(
            classify("/out:x.txt", OptionStyle::Windows),
            Token::Long {
                name: "out",
                value: Some("x.txt")
            }
        );
        assert_eq!(
            classify("/v", OptionStyle::Windows),
            Token::Short {
                body: "v",
                value: None
            }
        );
        assert_eq!(
            classify("/tmp", OptionStyle::Posix),
            Token::Positional("/tmp")
        );
    }

    #[test]
    fn option_shape() {
        assert!(looks_like_option("-o", OptionStyle::Posix));
        assert!(looks_like_option("--other", OptionStyle::Posix));
        assert!(looks_like_option("-3.14", OptionStyle::Posix));
        assert!(!looks_like_option("-", OptionStyle::Posix));
        assert!(!looks_like_option("value", OptionStyle::Posix));
        assert!(!looks_like_option("/x", OptionStyle::Posix));
        assert!(looks_like_option("/x", OptionStyle::Windows));
    }

    #[test]
    fn negative_numbers() {
        assert!(is_negative_number("-3"));
        assert!(is_negative_number("-3.2"));
        assert!(!is_negative_number("--3"));
        assert!(!is_negative_number("-x"));
        assert!(!is_negative_number("-"));
    }

    #[test]
    fn unquote_cases() {
        assert_eq!(unquote("abc").unwrap(), "abc");
        assert_eq!(unquote("\"abc\"").unwrap(), "abc");
        assert_eq!(unquote("\"\"").unwrap(), "");
        assert_eq!(unquote("\"\\\"abc\\\"\"").unwrap(), "\"abc\"");
        assert_eq!(unquote("\"\\\"abc\"").unwrap(), "\"abc");
        assert_eq!(unquote("\"a\\tb\\u00e9\"").unwrap(), "a\tb\u{e9}");
        assert_eq!(unquote("\"").unwrap(), "\"");
    }

    #[test]
    fn unquote_rejects_malformed() {
        for raw in ["\"abc", "\"\"abc\"", "\"\\\"", "\"\\q\""] {
            let err = unquote(raw).unwrap_err();
            assert!(
                matches!(&err, ValueError::Syntax { literal, .. } if literal == raw),
                "{raw}: {err:?}"
            );
        }
    }
}
