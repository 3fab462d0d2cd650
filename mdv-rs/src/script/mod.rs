//! Directive language.
//!
//! This module implements the line interpreter, covering:
//!
//! - Line classification (`@name=value`, `~name=expression`, text)
//! - Typed literals and Python-flavoured values (int, float, bool, str)
//! - A sandboxed expression evaluator with a handful of pure built-ins
//! - `{name}` substitution in text lines, with `/` line escapes
//!
//! # Quick start
//!
//! ```rust
//! use mdv::script::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! let out = interp.process(["@a=2\n", "~b=a*3\n", "Value: {b}\n"]).unwrap();
//! assert_eq!(out, ["Value: 6\n"]);
//! ```

pub mod builtins;
pub mod directive;
pub mod expand;
pub mod expr;
pub mod interp;
pub mod value;

// Re-exports for convenience.
pub use directive::{classify, Directive, LineKind};
pub use expr::{EvalContext, EvalError};
pub use interp::{render_str, Interpreter};
pub use value::Value;
