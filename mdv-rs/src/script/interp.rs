//! Document interpreter.
//!
//! The [`Interpreter`] owns the two pieces of per-document state:
//!
//! - the **state store**, `name → Value`, holding literal variables and the
//!   most recent result of every expression;
//! - the **expression registry**, `name → text`, holding expressions that are
//!   re-evaluated before each text line that needs substitution.
//!
//! Right after any directive a name lives in at most one of the two maps:
//! defining a variable drops a pending expression of the same name, and
//! defining an expression drops the stored value.
//!
//! One interpreter is built per document pass and consumed by it.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::{Error, Result};
use super::{
    directive::{classify, Directive, LineKind},
    expand::{passthrough, substitute, ExpandError},
    expr::eval_str,
    value::Value,
};

#[derive(Debug, Default)]
pub struct Interpreter {
    variables: IndexMap<String, Value>,
    expressions: IndexMap<String, String>,
    rendered: Vec<String>,
    line_no: usize,
    verbose: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An interpreter that reports overwrites, self-references and
    /// expression fallbacks as warnings.
    pub fn with_verbose(verbose: bool) -> Self {
        Interpreter {
            verbose,
            ..Self::default()
        }
    }

    // ── Line loop ─────────────────────────────────────────────────────────────

    /// Run a full pass over `lines` and return the rendered output lines.
    ///
    /// Fails with [`Error::EmptyOutput`] when no line produced output.
    pub fn process<I, S>(&mut self, lines: I) -> Result<&[String]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.interpret_line(line.as_ref())?;
        }
        if self.rendered.is_empty() {
            return Err(Error::EmptyOutput);
        }
        Ok(&self.rendered)
    }

    /// Interpret one raw line (terminator included, if any).
    pub fn interpret_line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        match classify(line) {
            LineKind::Text => {
                let out = self.render_text(line)?;
                self.rendered.push(out);
            }
            LineKind::Variable | LineKind::Expression => {
                let directive = Directive::parse(line, self.line_no)?;
                debug!("line {}: {directive:?}", self.line_no);
                self.apply(directive);
            }
        }
        Ok(())
    }

    // ── Directives ────────────────────────────────────────────────────────────

    /// Apply a parsed directive to the state store / expression registry.
    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Variable { key, value } => self.define_variable(key, value),
            Directive::Expression { key, text } => self.define_expression(key, text),
        }
    }

    fn define_variable(&mut self, key: String, value: Value) {
        if self.expressions.shift_remove(&key).is_some() && self.verbose {
            warn!("'{key}' already defined as expression, overwriting as variable");
        }
        self.variables.insert(key, value);
    }

    fn define_expression(&mut self, key: String, text: String) {
        if self.variables.shift_remove(&key).is_some() && self.verbose {
            warn!("'{key}' already defined as variable, overwriting as expression");
        }
        if text == key {
            // `~x=x` would never resolve; it means the literal string "x".
            if self.verbose {
                warn!("expression '{key}' refers to itself, storing it as the string \"{key}\"");
            }
            self.expressions.shift_remove(&key);
            self.variables.insert(key.clone(), Value::Str(key));
            return;
        }
        self.expressions.insert(key, text);
    }

    // ── Resolution ────────────────────────────────────────────────────────────

    /// Evaluate every registered expression against the current state store
    /// and store the results.
    ///
    /// All expressions see the store as it was before this pass, so an
    /// expression depending on another one picks up that value one text line
    /// later.  An expression that fails to evaluate resolves to its own text.
    pub fn resolve_expressions(&mut self) {
        let resolved: Vec<(String, Value)> = self
            .expressions
            .iter()
            .map(|(key, text)| {
                let value = match eval_str(text, &self.variables) {
                    Ok(v) => v,
                    Err(e) => {
                        if self.verbose {
                            warn!("error evaluating expression for '{key}': {e}; treating it as a string");
                        }
                        Value::Str(text.clone())
                    }
                };
                (key.clone(), value)
            })
            .collect();

        for (key, value) in resolved {
            self.variables.insert(key, value);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render one text line against the current state.
    pub fn render_text(&mut self, line: &str) -> Result<String> {
        if let Some(out) = passthrough(line) {
            return Ok(out.to_owned());
        }
        self.resolve_expressions();
        let variables = &self.variables;
        substitute(line, |name| variables.get(name).map(Value::to_string)).map_err(|e| {
            let line = self.line_no;
            match e {
                ExpandError::Undefined(name) => Error::UnresolvedReference { line, name },
                other => Error::Template {
                    line,
                    message: other.to_string(),
                },
            }
        })
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// Rendered lines so far, in input order.
    pub fn rendered(&self) -> &[String] {
        &self.rendered
    }

    pub fn into_rendered(self) -> Vec<String> {
        self.rendered
    }

    /// Concatenation of all rendered lines.
    pub fn output(&self) -> String {
        self.rendered.concat()
    }

    /// Current value of `name` in the state store.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Registered expression text for `name`.
    pub fn expression(&self, name: &str) -> Option<&str> {
        self.expressions.get(name).map(String::as_str)
    }

    /// State store entries in definition order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Expression registry entries in definition order.
    pub fn expressions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.expressions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Split `src` into lines (terminators kept) and render it in one pass.
pub fn render_str(src: &str, verbose: bool) -> Result<String> {
    let mut interp = Interpreter::with_verbose(verbose);
    interp.process(src.split_inclusive('\n'))?;
    Ok(interp.output())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
