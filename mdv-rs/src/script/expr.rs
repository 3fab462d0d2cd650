//! Expression lexer, AST, parser, and evaluator.
//!
//! The language is a small, side-effect free subset of Python expressions:
//! literals, names, arithmetic, comparison (chainable), boolean logic, the
//! `a if c else b` conditional and calls to a fixed set of builtins.  There
//! is no assignment and no way to reach anything outside the environment
//! handed to [`eval_expr`].
//!
//! Operator precedence (lowest → highest):
//!   conditional  →  or  →  and  →  not  →  comparison  →
//!   additive  →  multiplicative  →  unary  →  power  →  primary

use std::cmp::Ordering;

use indexmap::IndexMap;
use thiserror::Error;

use super::builtins::call_builtin;
use super::value::Value;

/// Maximum nesting of parentheses / unary operators accepted by the parser.
const MAX_DEPTH: usize = 64;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("name '{0}' is not defined")]
    UnknownName(String),
    #[error("function '{0}' is not defined")]
    UnknownFunction(String),
    #[error("unsupported operand type(s) for {op}: '{lhs}' and '{rhs}'")]
    Operands {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("bad operand type for {op}: '{ty}'")]
    Operand { op: &'static str, ty: &'static str },
    #[error("{name}() takes {expected} argument(s) ({got} given)")]
    Arity {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("{0}")]
    InvalidValue(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
}

// ── EvalContext ───────────────────────────────────────────────────────────────

/// Environment the evaluator reads names from.
///
/// The interpreter evaluates against a plain map of resolved values; tests
/// plug in their own maps.  Function calls go to the builtin table unless an
/// implementor overrides [`EvalContext::call_fn`].
pub trait EvalContext {
    /// Look up a resolved name.
    fn get_var(&self, name: &str) -> Option<Value>;

    /// Invoke a function by name.
    fn call_fn(&self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        call_builtin(name, args).unwrap_or_else(|| Err(EvalError::UnknownFunction(name.to_owned())))
    }
}

impl EvalContext for IndexMap<String, Value> {
    fn get_var(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,

    // Comparison
    Eq, // ==
    Ne, // !=
    Lt,
    Le,
    Gt,
    Ge,

    // Logical (symbolic spellings; `and`/`or`/`not` arrive as identifiers)
    And,  // &&
    Or,   // ||
    Bang, // !

    // Misc
    Comma,
    LParen,
    RParen,
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    src: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_digits(&mut self, s: &mut String, radix: u32) {
        while let Some(c) = self.peek().filter(|c| c.is_digit(radix)) {
            s.push(c);
            self.pos += 1;
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token, EvalError> {
        // Hex literal
        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.pos += 1;
            let mut hex = String::new();
            self.take_digits(&mut hex, 16);
            if hex.is_empty() {
                return Err(EvalError::Syntax("invalid hexadecimal literal".into()));
            }
            return i64::from_str_radix(&hex, 16)
                .map(Token::Int)
                .map_err(|_| EvalError::Overflow);
        }

        let mut s = String::new();
        s.push(first);
        let mut is_float = first == '.';
        self.take_digits(&mut s, 10);
        if !is_float && self.peek() == Some('.') {
            is_float = true;
            s.push('.');
            self.pos += 1;
            self.take_digits(&mut s, 10);
        }
        if matches!(self.peek(), Some('e' | 'E'))
            && (matches!(self.peek2(), Some(c) if c.is_ascii_digit())
                || (matches!(self.peek2(), Some('+' | '-'))
                    && matches!(self.src.get(self.pos + 2), Some(c) if c.is_ascii_digit())))
        {
            is_float = true;
            s.push('e');
            self.pos += 1;
            if let Some(sign) = self.peek().filter(|c| matches!(*c, '+' | '-')) {
                s.push(sign);
                self.pos += 1;
            }
            self.take_digits(&mut s, 10);
        }

        if is_float {
            s.parse()
                .map(Token::Float)
                .map_err(|_| EvalError::Syntax(format!("invalid number '{s}'")))
        } else {
            s.parse().map(Token::Int).map_err(|_| EvalError::Overflow)
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, EvalError> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(EvalError::Syntax("unterminated string literal".into()));
                }
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => s.push(c),
                    Some(c) => {
                        s.push('\\');
                        s.push(c);
                    }
                    None => return Err(EvalError::Syntax("unterminated string literal".into())),
                },
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
            }
        }
        Ok(Token::Str(s))
    }

    fn read_ident(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            s.push(c);
            self.pos += 1;
        }
        Token::Ident(s)
    }

    fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_ws();
        let ch = match self.advance() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        Ok(match ch {
            '0'..='9' => self.read_number(ch)?,
            '.' if matches!(self.peek(), Some(c) if c.is_ascii_digit()) => self.read_number(ch)?,
            '"' | '\'' => self.read_string(ch)?,
            c if c.is_alphabetic() || c == '_' => self.read_ident(c),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                if self.eat('*') {
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '/' => {
                if self.eat('/') {
                    Token::SlashSlash
                } else {
                    Token::Slash
                }
            }
            '%' => Token::Percent,
            '!' => {
                if self.eat('=') {
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            '=' if self.eat('=') => Token::Eq,
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '&' if self.eat('&') => Token::And,
            '|' if self.eat('|') => Token::Or,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c => return Err(EvalError::Syntax(format!("unexpected character '{c}'"))),
        })
    }

    fn tokenize(mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    /// `a ** b` (the only right-associative operator).
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// `a + b - c`, `a and b and c`: one precedence level, folded left to
    /// right.  Kept flat so a long chain never becomes a deep tree.
    Chain(Box<Expr>, Vec<(BinOp, Expr)>),
    /// `a < b <= c` — evaluated pairwise, short-circuiting.
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    /// `then if cond else otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call(String, Vec<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Token::Ident(name) if name == kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, EvalError>) -> Result<T, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::Syntax("expression nested too deeply".into()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        self.nested(Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> Result<Expr, EvalError> {
        let then = self.parse_or()?;
        if !self.eat_keyword("if") {
            return Ok(then);
        }
        let cond = self.parse_or()?;
        if !self.eat_keyword("else") {
            return Err(EvalError::Syntax("expected 'else' in conditional expression".into()));
        }
        let otherwise = self.parse_expr()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_and()?;
        let mut rest = Vec::new();
        while self.eat(&Token::Or) || self.eat_keyword("or") {
            rest.push((BinOp::Or, self.parse_and()?));
        }
        Ok(chain(first, rest))
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_not()?;
        let mut rest = Vec::new();
        while self.eat(&Token::And) || self.eat_keyword("and") {
            rest.push((BinOp::And, self.parse_not()?));
        }
        Ok(chain(first, rest))
    }

    fn parse_not(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Bang) || self.eat_keyword("not") {
            let inner = self.nested(Self::parse_not)?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Eq => CmpOp::Eq,
                Token::Ne => CmpOp::Ne,
                Token::Lt => CmpOp::Lt,
                Token::Le => CmpOp::Le,
                Token::Gt => CmpOp::Gt,
                Token::Ge => CmpOp::Ge,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_multiplicative()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.parse_multiplicative()?));
        }
        Ok(chain(first, rest))
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::SlashSlash => BinOp::FloorDiv,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.parse_unary()?));
        }
        Ok(chain(first, rest))
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Pos,
            _ => return self.parse_power(),
        };
        self.pos += 1;
        let inner = self.nested(Self::parse_unary)?;
        Ok(Expr::Unary(op, Box::new(inner)))
    }

    fn parse_power(&mut self) -> Result<Expr, EvalError> {
        let base = self.parse_primary()?;
        if self.eat(&Token::StarStar) {
            // Right-associative and binds tighter than a unary minus on its left.
            let exp = self.nested(Self::parse_unary)?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Ident(name) => {
                match name.as_str() {
                    "True" => return Ok(Expr::Literal(Value::Bool(true))),
                    "False" => return Ok(Expr::Literal(Value::Bool(false))),
                    "and" | "or" | "not" | "if" | "else" => {
                        return Err(EvalError::Syntax(format!("unexpected keyword '{name}'")));
                    }
                    _ => {}
                }
                if !self.eat(&Token::LParen) {
                    return Ok(Expr::Var(name));
                }
                let mut args = Vec::new();
                if self.peek() != &Token::RParen {
                    args.push(self.parse_expr()?);
                    while self.eat(&Token::Comma) {
                        args.push(self.parse_expr()?);
                    }
                }
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax(format!("expected ')' after args to {name}")));
                }
                Ok(Expr::Call(name, args))
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax("expected ')'".into()));
                }
                Ok(inner)
            }
            Token::Eof => Err(EvalError::Syntax("unexpected end of expression".into())),
            other => Err(EvalError::Syntax(format!("unexpected token {other:?}"))),
        }
    }
}

fn chain(first: Expr, rest: Vec<(BinOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain(Box::new(first), rest)
    }
}

/// Parse an expression string into an AST.  Trailing tokens are an error.
pub fn parse_expr(src: &str) -> Result<Expr, EvalError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(EvalError::Syntax(format!("unexpected token {other:?}"))),
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate an [`Expr`] AST node against the given context.
pub fn eval_expr(expr: &Expr, ctx: &dyn EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Var(name) => ctx
            .get_var(name)
            .ok_or_else(|| EvalError::UnknownName(name.clone())),

        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, ctx)?;
            match op {
                UnaryOp::Neg => v.arith_neg(),
                UnaryOp::Pos => v.arith_pos(),
                UnaryOp::Not => Ok(Value::Bool(!v.as_bool())),
            }
        }

        Expr::Chain(first, rest) => {
            let mut acc = eval_expr(first, ctx)?;
            for (op, rhs) in rest {
                // `and`/`or` short-circuit and yield the deciding operand.  A
                // chain never mixes them, so an early return is final.
                acc = match op {
                    BinOp::And if !acc.as_bool() => return Ok(acc),
                    BinOp::Or if acc.as_bool() => return Ok(acc),
                    BinOp::And | BinOp::Or => eval_expr(rhs, ctx)?,
                    _ => eval_binop(*op, &acc, &eval_expr(rhs, ctx)?)?,
                };
            }
            Ok(acc)
        }

        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            let r = eval_expr(rhs, ctx)?;
            eval_binop(*op, &l, &r)
        }

        Expr::Compare(first, rest) => {
            let mut lhs = eval_expr(first, ctx)?;
            for (op, rhs_expr) in rest {
                let rhs = eval_expr(rhs_expr, ctx)?;
                if !compare(*op, &lhs, &rhs)? {
                    return Ok(Value::Bool(false));
                }
                lhs = rhs;
            }
            Ok(Value::Bool(true))
        }

        Expr::Conditional { cond, then, otherwise } => {
            if eval_expr(cond, ctx)?.as_bool() {
                eval_expr(then, ctx)
            } else {
                eval_expr(otherwise, ctx)
            }
        }

        Expr::Call(name, arg_exprs) => {
            let mut args = Vec::with_capacity(arg_exprs.len());
            for ae in arg_exprs {
                args.push(eval_expr(ae, ctx)?);
            }
            ctx.call_fn(name, args)
        }
    }
}

fn eval_binop(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => l.arith_add(r),
        BinOp::Sub => l.arith_sub(r),
        BinOp::Mul => l.arith_mul(r),
        BinOp::Div => l.arith_div(r),
        BinOp::FloorDiv => l.arith_floor_div(r),
        BinOp::Rem => l.arith_rem(r),
        BinOp::Pow => l.arith_pow(r),
        BinOp::And | BinOp::Or => unreachable!("short-circuit operators are folded in Expr::Chain"),
    }
}

fn compare(op: CmpOp, l: &Value, r: &Value) -> Result<bool, EvalError> {
    let ord = match op {
        CmpOp::Eq => return Ok(l.loose_eq(r)),
        CmpOp::Ne => return Ok(!l.loose_eq(r)),
        _ => l.try_cmp(r, op.symbol())?,
    };
    Ok(match (op, ord) {
        (_, None) => false,
        (CmpOp::Lt, Some(o)) => o == Ordering::Less,
        (CmpOp::Le, Some(o)) => o != Ordering::Greater,
        (CmpOp::Gt, Some(o)) => o == Ordering::Greater,
        (CmpOp::Ge, Some(o)) => o != Ordering::Less,
        (CmpOp::Eq | CmpOp::Ne, Some(_)) => unreachable!("equality handled above"),
    })
}

/// Convenience: parse and evaluate an expression string.
pub fn eval_str(src: &str, ctx: &dyn EvalContext) -> Result<Value, EvalError> {
    let expr = parse_expr(src)?;
    eval_expr(&expr, ctx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn eval(src: &str) -> Value {
        eval_str(src, &env(&[])).expect("eval failed")
    }

    fn eval_err(src: &str) -> EvalError {
        eval_str(src, &env(&[])).expect_err("eval unexpectedly succeeded")
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn literals() {
        assert_eq!(eval("42"), Value::Int(42));
        assert_eq!(eval("3.14"), Value::Float(3.14));
        assert_eq!(eval(".5"), Value::Float(0.5));
        assert_eq!(eval("1e3"), Value::Float(1000.0));
        assert_eq!(eval("0xff"), Value::Int(255));
        assert_eq!(eval("\"hello\""), Value::Str("hello".into()));
        assert_eq!(eval("'it\\'s'"), Value::Str("it's".into()));
        assert_eq!(eval("True"), Value::Bool(true));
        assert_eq!(eval("False"), Value::Bool(false));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("2 + 3"), Value::Int(5));
        assert_eq!(eval("10 - 4"), Value::Int(6));
        assert_eq!(eval("3 * 4"), Value::Int(12));
        assert_eq!(eval("10 / 4"), Value::Float(2.5));
        assert_eq!(eval("10 // 3"), Value::Int(3));
        assert_eq!(eval("10 % 3"), Value::Int(1));
        assert_eq!(eval("2 ** 10"), Value::Int(1024));
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2 + 3 * 4"), Value::Int(14));
        assert_eq!(eval("(2 + 3) * 4"), Value::Int(20));
        assert_eq!(eval("-2 ** 2"), Value::Int(-4));
        assert_eq!(eval("2 ** 3 ** 2"), Value::Int(512));
        assert_eq!(eval("2 ** -1"), Value::Float(0.5));
        assert_eq!(eval("not 1 == 2"), Value::Bool(true));
    }

    #[test]
    fn unary() {
        assert_eq!(eval("-5"), Value::Int(-5));
        assert_eq!(eval("-(3 + 2)"), Value::Int(-5));
        assert_eq!(eval("+7"), Value::Int(7));
        assert_eq!(eval("!0"), Value::Bool(true));
        assert_eq!(eval("not ''"), Value::Bool(true));
    }

    #[test]
    fn comparison() {
        assert_eq!(eval("3 == 3"), Value::Bool(true));
        assert_eq!(eval("3 != 4"), Value::Bool(true));
        assert_eq!(eval("2 < 3"), Value::Bool(true));
        assert_eq!(eval("3 >= 3"), Value::Bool(true));
        assert_eq!(eval("'a' < 'b'"), Value::Bool(true));
        assert_eq!(eval("1 == 1.0"), Value::Bool(true));
        assert_eq!(eval("1 == '1'"), Value::Bool(false));
    }

    #[test]
    fn chained_comparison() {
        assert_eq!(eval("1 < 2 < 3"), Value::Bool(true));
        assert_eq!(eval("1 < 3 < 2"), Value::Bool(false));
        assert_eq!(eval("3 > 2 == 2"), Value::Bool(true));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(eval("1 and 2"), Value::Int(2));
        assert_eq!(eval("0 and 2"), Value::Int(0));
        assert_eq!(eval("0 or 'x'"), Value::Str("x".into()));
        assert_eq!(eval("'' || 'y'"), Value::Str("y".into()));
        assert_eq!(eval("1 && 0"), Value::Int(0));
        // Right side is never evaluated once the left side decides.
        assert_eq!(eval("0 and missing"), Value::Int(0));
        assert_eq!(eval("1 or missing"), Value::Int(1));
    }

    #[test]
    fn conditional() {
        assert_eq!(eval("10 if 1 else 20"), Value::Int(10));
        assert_eq!(eval("10 if 0 else 20"), Value::Int(20));
        assert_eq!(eval("'a' if 0 else 'b' if 1 else 'c'"), Value::Str("b".into()));
    }

    #[test]
    fn variable_lookup() {
        let ctx = env(&[("x", Value::Int(7)), ("name", Value::from("World"))]);
        assert_eq!(eval_str("x + 1", &ctx), Ok(Value::Int(8)));
        assert_eq!(eval_str("'Hello, ' + name", &ctx), Ok(Value::from("Hello, World")));
        assert_eq!(eval_str("name * 2", &ctx), Ok(Value::from("WorldWorld")));
    }

    #[test]
    fn function_calls() {
        let ctx = env(&[("s", Value::from("abc"))]);
        assert_eq!(eval_str("len(s) * 2", &ctx), Ok(Value::Int(6)));
        assert_eq!(eval_str("max(1, 5, 3)", &ctx), Ok(Value::Int(5)));
        assert_eq!(
            eval_str("nope(1)", &ctx),
            Err(EvalError::UnknownFunction("nope".into()))
        );
    }

    #[test]
    fn errors() {
        assert_eq!(eval_err("missing"), EvalError::UnknownName("missing".into()));
        assert_eq!(eval_err("1 / 0"), EvalError::DivisionByZero);
        assert!(matches!(eval_err("'a' + 1"), EvalError::Operands { op: "+", .. }));
        assert!(matches!(eval_err("'a' < 1"), EvalError::Operands { op: "<", .. }));
        assert!(matches!(eval_err("1 +"), EvalError::Syntax(_)));
        assert!(matches!(eval_err("(1"), EvalError::Syntax(_)));
        assert!(matches!(eval_err("1 2"), EvalError::Syntax(_)));
        assert!(matches!(eval_err("'open"), EvalError::Syntax(_)));
        assert!(matches!(eval_err("a = 1"), EvalError::Syntax(_)));
        assert!(matches!(eval_err("1 if 1"), EvalError::Syntax(_)));
        assert_eq!(eval_err("99999999999999999999"), EvalError::Overflow);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let src = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(matches!(eval_err(&src), EvalError::Syntax(_)));
        let src = format!("{}1", "-".repeat(500));
        assert!(matches!(eval_err(&src), EvalError::Syntax(_)));
    }

    #[test]
    fn long_flat_chains_evaluate() {
        let src = vec!["1"; 200_000].join("+");
        assert_eq!(eval(&src), Value::Int(200_000));
        let src = vec!["2"; 50_000].join(" - ");
        assert_eq!(eval(&src), Value::Int(2 - 2 * 49_999));
        let src = vec!["1"; 100_000].join("*");
        assert_eq!(eval(&src), Value::Int(1));
        let src = vec!["True"; 100_000].join(" and ");
        assert_eq!(eval(&src), Value::Bool(true));
        let src = format!("{} or 7", vec!["0"; 100_000].join(" or "));
        assert_eq!(eval(&src), Value::Int(7));
        let src = vec!["1 < 2"; 50_000].join(" and ");
        assert_eq!(eval(&src), Value::Bool(true));
    }

    #[test]
    fn chains_fold_left() {
        assert_eq!(eval("10 - 3 - 2"), Value::Int(5));
        assert_eq!(eval("100 // 7 // 2"), Value::Int(7));
        assert_eq!(eval("2 * 3 + 4 * 5 - 6"), Value::Int(20));
        assert_eq!(eval("0 and 1 and missing"), Value::Int(0));
        assert_eq!(eval("0 or '' or 'x' or missing"), Value::from("x"));
        assert_eq!(eval("1 and 0 or 5"), Value::Int(5));
    }

    #[test]
    fn unicode_names() {
        let vars = env(&[("ü", Value::Int(2)), ("größe", Value::Int(3))]);
        assert_eq!(eval_str("ü * größe", &vars), Ok(Value::Int(6)));
        assert_eq!(eval_str("_ü1 + 1", &vars), Err(EvalError::UnknownName("_ü1".into())));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            eval_err("'a' + 1").to_string(),
            "unsupported operand type(s) for +: 'str' and 'int'"
        );
        assert_eq!(eval_err("x").to_string(), "name 'x' is not defined");
    }
}
