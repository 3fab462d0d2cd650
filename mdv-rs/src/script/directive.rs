//! Line classification and directive splitting.
//!
//! | Line                 | Kind                                   |
//! |----------------------|----------------------------------------|
//! | `@name=value`        | variable directive (typed literal)     |
//! | `~name=expression`   | expression directive (deferred)        |
//! | `~~…`                | text, never a directive                |
//! | anything else        | text                                   |
//!
//! In a variable directive `\=` is an escaped equals sign: it neither makes
//! the line a directive nor splits it, and is unescaped in the value.
//!
//! Names must be identifiers, the same ones `{name}` accepts.

use crate::error::{Error, Result};

use super::expand::is_ident;
use super::value::Value;

/// Sigil introducing a variable directive.
pub const VARIABLE_SIGIL: char = '@';
/// Sigil introducing an expression directive.
pub const EXPRESSION_SIGIL: char = '~';

/// What a raw input line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Variable,
    Expression,
    Text,
}

/// Classify a raw line.  Pure; blank lines are [`LineKind::Text`].
pub fn classify(line: &str) -> LineKind {
    if let Some(rest) = line.strip_prefix(VARIABLE_SIGIL) {
        if find_unescaped_eq(rest).is_some() {
            return LineKind::Variable;
        }
    } else if let Some(rest) = line.strip_prefix(EXPRESSION_SIGIL) {
        if !rest.starts_with(EXPRESSION_SIGIL) && rest.contains('=') {
            return LineKind::Expression;
        }
    }
    LineKind::Text
}

/// Byte offset of the first `=` not preceded by a backslash.
fn find_unescaped_eq(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find(|&i| bytes[i] == b'=' && (i == 0 || bytes[i - 1] != b'\\'))
}

/// A parsed directive line.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `@key=value`: value already parsed into its typed form.
    Variable { key: String, value: Value },
    /// `~key=text`: text trimmed, not yet evaluated.
    Expression { key: String, text: String },
}

impl Directive {
    /// Split a directive line on its first `=`.
    ///
    /// `lineno` is only used for error reporting.  A line without a sigil,
    /// without `=`, or with an empty name is a fatal error.
    pub fn parse(line: &str, lineno: usize) -> Result<Directive> {
        let malformed = |message: &str| Error::MalformedDirective {
            line: lineno,
            message: message.to_owned(),
        };

        if let Some(rest) = line.strip_prefix(VARIABLE_SIGIL) {
            let eq = find_unescaped_eq(rest).ok_or_else(|| malformed("expected '=' after name"))?;
            let key = checked_key(rest[..eq].trim(), lineno)?;
            let raw = rest[eq + 1..].replace("\\=", "=");
            return Ok(Directive::Variable {
                key: key.to_owned(),
                value: Value::parse_literal(&raw),
            });
        }

        if let Some(rest) = line.strip_prefix(EXPRESSION_SIGIL) {
            if rest.starts_with(EXPRESSION_SIGIL) {
                return Err(malformed("'~~' does not start an expression"));
            }
            let (key, text) = rest
                .split_once('=')
                .ok_or_else(|| malformed("expected '=' after name"))?;
            let key = checked_key(key.trim(), lineno)?;
            return Ok(Directive::Expression {
                key: key.to_owned(),
                text: text.trim().to_owned(),
            });
        }

        Err(malformed("line does not start with '@' or '~'"))
    }

    /// Name this directive defines.
    pub fn key(&self) -> &str {
        match self {
            Directive::Variable { key, .. } | Directive::Expression { key, .. } => key,
        }
    }
}

fn checked_key(key: &str, lineno: usize) -> Result<&str> {
    let message = if key.is_empty() {
        "missing name before '='".to_owned()
    } else if !is_ident(key) {
        format!("'{key}' is not a valid name")
    } else {
        return Ok(key);
    };
    Err(Error::MalformedDirective { line: lineno, message })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
