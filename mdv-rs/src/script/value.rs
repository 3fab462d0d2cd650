//! Runtime value type shared by directives, expressions and rendering.
//!
//! Documents were historically evaluated by a Python tool, so values print
//! the way Python's `str()` prints them (`6.0`, `True`, `1e+16`) and the
//! operators follow Python's rules for mixing ints, floats, bools and
//! strings.

use std::cmp::Ordering;
use std::fmt;

use super::expr::EvalError;

/// Upper bound on the length of a string produced by `str * int`.
const MAX_REPEAT_LEN: usize = 1 << 24;

/// A resolved value held in the state store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Python `repr(float)`: shortest round-trip digits, always with a decimal
/// point or exponent, exponent form outside `[1e-4, 1e16)`.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_owned();
    }
    if (1e-4..1e16).contains(&x.abs()) {
        let s = format!("{x}");
        if s.contains('.') {
            s
        } else {
            format!("{s}.0")
        }
    } else {
        let s = format!("{x:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            None => s,
        }
    }
}

/// Parse a float the way Python's `float()` does: surrounding whitespace,
/// `inf`/`nan` spellings, and `_` separators between digits are accepted.
pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('_') {
        let bytes = s.as_bytes();
        let separated = bytes.iter().enumerate().all(|(i, &b)| {
            b != b'_'
                || (i > 0
                    && bytes[i - 1].is_ascii_digit()
                    && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
        });
        if !separated {
            return None;
        }
        return s.replace('_', "").parse().ok();
    }
    s.parse().ok()
}

/// Numeric view of a value: bools count as 0/1, strings are not numbers.
#[derive(Debug, Clone, Copy)]
enum Num {
    I(i64),
    F(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::I(n) => n as f64,
            Num::F(x) => x,
        }
    }
}

impl Value {
    /// Typed parse of a variable directive's right-hand side.
    ///
    /// First match wins: all-digit integer, float literal, `true`/`false`
    /// (any case), quoted string, raw trimmed string.
    pub fn parse_literal(raw: &str) -> Value {
        let s = raw.trim();

        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Int(n);
            }
        }
        if let Some(x) = parse_float(s) {
            return Value::Float(x);
        }
        if s.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        for quote in ['"', '\''] {
            if s.starts_with(quote) && s.ends_with(quote) {
                // A lone quote character unquotes to "".
                return Value::Str(s.get(1..s.len() - 1).unwrap_or_default().to_owned());
            }
        }
        Value::Str(s.to_owned())
    }

    /// Python truthiness: `0`, `0.0`, `""` and `False` are falsy.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Python type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
        }
    }

    fn as_num(&self) -> Option<Num> {
        match self {
            Value::Int(n) => Some(Num::I(*n)),
            Value::Bool(b) => Some(Num::I(i64::from(*b))),
            Value::Float(x) => Some(Num::F(*x)),
            Value::Str(_) => None,
        }
    }

    /// Integer view for `str * n` repetition (ints and bools only).
    fn as_repeat_count(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    fn operands(&self, rhs: &Value, op: &'static str) -> Result<(Num, Num), EvalError> {
        match (self.as_num(), rhs.as_num()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(EvalError::Operands {
                op,
                lhs: self.type_name(),
                rhs: rhs.type_name(),
            }),
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    pub fn arith_add(&self, rhs: &Value) -> Result<Value, EvalError> {
        if let (Value::Str(a), Value::Str(b)) = (self, rhs) {
            return Ok(Value::Str(format!("{a}{b}")));
        }
        match self.operands(rhs, "+")? {
            (Num::I(a), Num::I(b)) => a.checked_add(b).map(Value::Int).ok_or(EvalError::Overflow),
            (a, b) => Ok(Value::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn arith_sub(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "-")? {
            (Num::I(a), Num::I(b)) => a.checked_sub(b).map(Value::Int).ok_or(EvalError::Overflow),
            (a, b) => Ok(Value::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn arith_mul(&self, rhs: &Value) -> Result<Value, EvalError> {
        match (self, rhs) {
            (Value::Str(s), n) | (n, Value::Str(s)) if n.as_repeat_count().is_some() => {
                let count = n.as_repeat_count().unwrap_or(0).max(0) as usize;
                if s.len().saturating_mul(count) > MAX_REPEAT_LEN {
                    return Err(EvalError::Overflow);
                }
                return Ok(Value::Str(s.repeat(count)));
            }
            _ => {}
        }
        match self.operands(rhs, "*")? {
            (Num::I(a), Num::I(b)) => a.checked_mul(b).map(Value::Int).ok_or(EvalError::Overflow),
            (a, b) => Ok(Value::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// True division: always a float.
    pub fn arith_div(&self, rhs: &Value) -> Result<Value, EvalError> {
        let (a, b) = self.operands(rhs, "/")?;
        if b.as_f64() == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Value::Float(a.as_f64() / b.as_f64()))
    }

    /// Floor division (`//`).
    pub fn arith_floor_div(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "//")? {
            (Num::I(_), Num::I(0)) => Err(EvalError::DivisionByZero),
            (Num::I(a), Num::I(b)) => {
                let q = a.checked_div(b).ok_or(EvalError::Overflow)?;
                let floored = if a % b != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q };
                Ok(Value::Int(floored))
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float((a / b).floor()))
            }
        }
    }

    /// Modulo with the sign of the divisor.
    pub fn arith_rem(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "%")? {
            (Num::I(_), Num::I(0)) => Err(EvalError::DivisionByZero),
            (Num::I(a), Num::I(b)) => {
                let r = a.checked_rem(b).ok_or(EvalError::Overflow)?;
                Ok(Value::Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }))
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                let r = a % b;
                Ok(Value::Float(if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }))
            }
        }
    }

    pub fn arith_pow(&self, rhs: &Value) -> Result<Value, EvalError> {
        match self.operands(rhs, "**")? {
            (Num::I(a), Num::I(b)) if b >= 0 => {
                let exp = u32::try_from(b).map_err(|_| EvalError::Overflow)?;
                a.checked_pow(exp).map(Value::Int).ok_or(EvalError::Overflow)
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                if a == 0.0 && b < 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(a.powf(b)))
            }
        }
    }

    pub fn arith_neg(&self) -> Result<Value, EvalError> {
        match self.as_num() {
            Some(Num::I(n)) => n.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
            Some(Num::F(x)) => Ok(Value::Float(-x)),
            None => Err(EvalError::Operand { op: "unary -", ty: self.type_name() }),
        }
    }

    pub fn arith_pos(&self) -> Result<Value, EvalError> {
        match self.as_num() {
            Some(Num::I(n)) => Ok(Value::Int(n)),
            Some(Num::F(x)) => Ok(Value::Float(x)),
            None => Err(EvalError::Operand { op: "unary +", ty: self.type_name() }),
        }
    }

    // ── Comparison ────────────────────────────────────────────────────────────

    /// Equality across types: numbers compare by value (`1 == 1.0 == True`),
    /// strings by content, anything else is unequal.
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => match (self.as_num(), rhs.as_num()) {
                (Some(Num::I(a)), Some(Num::I(b))) => a == b,
                (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
                _ => false,
            },
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`.  `Ok(None)` means unordered (NaN).
    pub fn try_cmp(&self, rhs: &Value, op: &'static str) -> Result<Option<Ordering>, EvalError> {
        if let (Value::Str(a), Value::Str(b)) = (self, rhs) {
            return Ok(Some(a.cmp(b)));
        }
        match self.operands(rhs, op)? {
            (Num::I(a), Num::I(b)) => Ok(Some(a.cmp(&b))),
            (a, b) => Ok(a.as_f64().partial_cmp(&b.as_f64())),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
