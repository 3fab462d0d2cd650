//! Text line substitution.
//!
//! | Sequence    | Meaning                                              |
//! |-------------|------------------------------------------------------|
//! | `{name}`    | Current value of `name` (spaces inside braces ok)    |
//! | `{{`        | Literal `{`                                          |
//! | `}}`        | Literal `}`                                          |
//! | `/…` (BOL)  | Whole line emitted verbatim, minus the leading `/`   |
//!
//! Only identifiers are accepted between braces: no expressions, no format
//! specs.  Evaluation lives in the expression directives, never here.

use thiserror::Error;

/// Why a line could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("name '{0}' is not defined")]
    Undefined(String),
    #[error("unclosed '{{'")]
    Unclosed,
    #[error("single '}}' is not allowed (write '}}}}' for a literal brace)")]
    StrayClose,
    #[error("'{{{0}}}' is not a valid substitution (only {{name}} is supported)")]
    BadName(String),
}

/// Lines that are emitted without substitution.
///
/// Returns the output for a line that needs no resolution pass: a bare
/// newline, a line without any brace, or an escaped (`/`-prefixed) line.
/// `None` means the line must go through [`substitute`].
pub fn passthrough(line: &str) -> Option<&str> {
    if line == "\n" || !line.contains(['{', '}']) {
        return Some(line);
    }
    line.strip_prefix('/')
}

/// Replace every `{name}` in `src` with `lookup(name)`.
pub fn substitute<F>(src: &str, mut lookup: F) -> Result<String, ExpandError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let body = read_brace_body(&mut chars)?;
                let name = body.trim();
                if !is_ident(name) {
                    return Err(ExpandError::BadName(body));
                }
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => return Err(ExpandError::Undefined(name.to_owned())),
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(ExpandError::StrayClose),
            other => out.push(other),
        }
    }

    Ok(out)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Whether `s` can appear between braces: a letter or `_`, then letters,
/// digits or `_` (Unicode included).
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Read everything up to (not including) the closing `}`, which is consumed.
fn read_brace_body(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<String, ExpandError> {
    let mut body = String::new();
    for c in chars.by_ref() {
        match c {
            '}' => return Ok(body),
            '\n' => break,
            c => body.push(c),
        }
    }
    Err(ExpandError::Unclosed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
