//! Built-in functions callable from expressions.
//!
//! Each function receives a `Vec<Value>` of already-evaluated arguments.  All
//! of them are pure: no I/O, no clock, no randomness, so resolving the same
//! expression twice against the same state always yields the same value.

use std::cmp::Ordering;

use super::expr::EvalError;
use super::value::{parse_float, Value};

/// Dispatch a built-in function call.
///
/// Returns `None` if `name` is not a built-in.
pub fn call_builtin(name: &str, args: Vec<Value>) -> Option<Result<Value, EvalError>> {
    // Inner function returns Result<Option<Value>, EvalError>:
    //   Ok(None)    → not a builtin
    //   Ok(Some(v)) → success
    //   Err(e)      → builtin call failed
    fn inner(name: &str, args: Vec<Value>) -> Result<Option<Value>, EvalError> {
        Ok(Some(match name {
            // ── Conversions ──────────────────────────────────────────────────
            "str" => Value::Str(one("str", args)?.to_string()),
            "int" => to_int(one("int", args)?)?,
            "float" => to_float(one("float", args)?)?,
            "bool" => Value::Bool(one("bool", args)?.as_bool()),

            // ── Strings ──────────────────────────────────────────────────────
            "len" => match one("len", args)? {
                Value::Str(s) => Value::Int(s.chars().count() as i64),
                other => {
                    return Err(EvalError::InvalidValue(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    )))
                }
            },
            "upper" => Value::Str(one_str("upper", args)?.to_uppercase()),
            "lower" => Value::Str(one_str("lower", args)?.to_lowercase()),

            // ── Math ─────────────────────────────────────────────────────────
            "abs" => match one("abs", args)? {
                Value::Int(n) => Value::Int(n.checked_abs().ok_or(EvalError::Overflow)?),
                Value::Bool(b) => Value::Int(i64::from(b)),
                Value::Float(x) => Value::Float(x.abs()),
                other => {
                    return Err(EvalError::Operand {
                        op: "abs()",
                        ty: other.type_name(),
                    })
                }
            },
            "round" => round(args)?,
            "min" => extremum("min", args, Ordering::Less)?,
            "max" => extremum("max", args, Ordering::Greater)?,

            _ => return Ok(None),
        }))
    }

    inner(name, args).transpose()
}

// ── Argument helpers ──────────────────────────────────────────────────────────

fn one(name: &'static str, args: Vec<Value>) -> Result<Value, EvalError> {
    let got = args.len();
    let mut it = args.into_iter();
    match (it.next(), it.next()) {
        (Some(v), None) => Ok(v),
        _ => Err(EvalError::Arity {
            name,
            expected: "exactly one",
            got,
        }),
    }
}

fn one_str(name: &'static str, args: Vec<Value>) -> Result<String, EvalError> {
    match one(name, args)? {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::Operand {
            op: name,
            ty: other.type_name(),
        }),
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

fn float_to_int(x: f64) -> Result<i64, EvalError> {
    if !x.is_finite() {
        return Err(EvalError::InvalidValue(format!(
            "cannot convert float {} to integer",
            Value::Float(x)
        )));
    }
    let t = x.trunc();
    // i64::MAX is not representable as f64; 2^63 is the first value out of range.
    if t < -9_223_372_036_854_775_808.0 || t >= 9_223_372_036_854_775_808.0 {
        return Err(EvalError::Overflow);
    }
    Ok(t as i64)
}

fn to_int(v: Value) -> Result<Value, EvalError> {
    match v {
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Float(x) => float_to_int(x).map(Value::Int),
        Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| {
            EvalError::InvalidValue(format!("invalid literal for int() with base 10: '{s}'"))
        }),
    }
}

fn to_float(v: Value) -> Result<Value, EvalError> {
    match v {
        Value::Int(n) => Ok(Value::Float(n as f64)),
        Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Value::Float(x) => Ok(Value::Float(x)),
        Value::Str(s) => parse_float(&s).map(Value::Float).ok_or_else(|| {
            EvalError::InvalidValue(format!("could not convert string to float: '{s}'"))
        }),
    }
}

// ── Math helpers ──────────────────────────────────────────────────────────────

/// `round(x)` / `round(x, ndigits)` with round-half-to-even.
fn round(args: Vec<Value>) -> Result<Value, EvalError> {
    let got = args.len();
    let mut it = args.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(x), None, None) => match x {
            Value::Int(n) => Ok(Value::Int(n)),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::Float(f) => float_to_int(f.round_ties_even()).map(Value::Int),
            other => Err(EvalError::Operand {
                op: "round()",
                ty: other.type_name(),
            }),
        },
        (Some(x), Some(nd), None) => {
            let digits = match nd {
                Value::Int(n) => n,
                Value::Bool(b) => i64::from(b),
                other => {
                    return Err(EvalError::Operand {
                        op: "round() ndigits",
                        ty: other.type_name(),
                    })
                }
            };
            match x {
                Value::Int(n) => round_int(n, digits).map(Value::Int),
                Value::Bool(b) => round_int(i64::from(b), digits).map(Value::Int),
                Value::Float(f) if !f.is_finite() => Ok(Value::Float(f)),
                Value::Float(f) => {
                    let scale = 10f64.powi(digits.clamp(-308, 308) as i32);
                    Ok(Value::Float((f * scale).round_ties_even() / scale))
                }
                other => Err(EvalError::Operand {
                    op: "round()",
                    ty: other.type_name(),
                }),
            }
        }
        _ => Err(EvalError::Arity {
            name: "round",
            expected: "one or two",
            got,
        }),
    }
}

/// Round an integer to `digits` decimal places; only negative `digits` change
/// anything (`round(1250, -2) == 1200`).
fn round_int(n: i64, digits: i64) -> Result<i64, EvalError> {
    if digits >= 0 {
        return Ok(n);
    }
    let Some(p) = u32::try_from(digits.unsigned_abs())
        .ok()
        .and_then(|e| 10i64.checked_pow(e))
    else {
        // More digits than an i64 can hold: everything rounds to zero.
        return Ok(0);
    };
    let r = n.rem_euclid(p);
    let mut q = n.div_euclid(p);
    if r * 2 > p || (r * 2 == p && q % 2 != 0) {
        q += 1;
    }
    q.checked_mul(p).ok_or(EvalError::Overflow)
}

fn extremum(name: &'static str, args: Vec<Value>, want: Ordering) -> Result<Value, EvalError> {
    let mut it = args.into_iter();
    let Some(mut best) = it.next() else {
        return Err(EvalError::Arity {
            name,
            expected: "at least one",
            got: 0,
        });
    };
    for v in it {
        if v.try_cmp(&best, name)? == Some(want) {
            best = v;
        }
    }
    Ok(best)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
