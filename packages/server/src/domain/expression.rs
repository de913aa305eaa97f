//! Arithmetic expression evaluator.
//!
//! Accepts standard infix arithmetic over `f64` with the binary operators
//! `+ - * / ^`, unary `+`/`-`, parentheses, and the single-argument functions
//! `sin`, `cos`, `log` (natural) and `log10`. Input is lower-cased before
//! parsing, so function names are case-insensitive.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | IDENT '(' args ')' | '(' expr ')'
//! args    := expr (',' expr)*
//! ```
//!
//! `^` is right associative and binds tighter than unary minus, so
//! `-2 ^ 2 = -4` and `2 ^ 3 ^ 2 = 512`. The two-operand form `a op b` used by
//! older clients is a subset of this grammar.

use thiserror::Error;

/// Longest accepted input, in bytes.
const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses, calls and unary operators.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("{0}")]
    InvalidExpression(String),

    #[error("division by zero")]
    DivisionByZero,
}

impl EvaluationError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidExpression(reason.into())
    }
}

/// Parse and evaluate `expression`.
pub fn evaluate(expression: &str) -> Result<f64, EvaluationError> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(EvaluationError::invalid("expression is too long"));
    }

    let lowered = expression.to_lowercase();
    let tokens = tokenize(&lowered)?;
    if tokens.is_empty() {
        return Err(EvaluationError::invalid("expression is empty"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(EvaluationError::invalid(format!(
            "unexpected token: {}",
            token
        )));
    }

    if !value.is_finite() {
        return Err(EvaluationError::invalid("result is not a finite number"));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvaluationError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[start..end];
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| EvaluationError::invalid(format!("invalid number: {}", literal)))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '^' => Token::Caret,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    other => {
                        return Err(EvaluationError::invalid(format!(
                            "unsupported operator: {}",
                            other
                        )));
                    }
                };
                tokens.push(token);
                chars.next();
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), EvaluationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvaluationError::invalid("expression is nested too deeply"));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                value += self.term()?;
            } else if self.eat(&Token::Minus) {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value *= self.unary()?;
            } else if self.eat(&Token::Slash) {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                value /= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, EvaluationError> {
        if self.eat(&Token::Minus) {
            self.descend()?;
            let value = -self.unary()?;
            self.depth -= 1;
            Ok(value)
        } else if self.eat(&Token::Plus) {
            self.descend()?;
            let value = self.unary()?;
            self.depth -= 1;
            Ok(value)
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<f64, EvaluationError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<f64, EvaluationError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvaluationError::invalid("missing closing parenthesis"));
                }
                self.depth -= 1;
                Ok(value)
            }
            Some(Token::Ident(name)) => self.call(name),
            Some(token) => Err(EvaluationError::invalid(format!(
                "unexpected token: {}",
                token
            ))),
            None => Err(EvaluationError::invalid("unexpected end of expression")),
        }
    }

    fn call(&mut self, name: String) -> Result<f64, EvaluationError> {
        let function = Function::lookup(&name)?;
        if !self.eat(&Token::LParen) {
            return Err(EvaluationError::invalid(format!(
                "function {} must be called with parentheses",
                name
            )));
        }
        self.descend()?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                if self.eat(&Token::RParen) {
                    break;
                }
                return Err(EvaluationError::invalid("missing closing parenthesis"));
            }
        }
        self.depth -= 1;

        match args.as_slice() {
            [arg] => Ok(function.apply(*arg)),
            _ => Err(EvaluationError::invalid(format!(
                "function {} expects 1 argument, got {}",
                name,
                args.len()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Function {
    Sin,
    Cos,
    Ln,
    Log10,
}

impl Function {
    fn lookup(name: &str) -> Result<Self, EvaluationError> {
        match name {
            "sin" => Ok(Self::Sin),
            "cos" => Ok(Self::Cos),
            "log" => Ok(Self::Ln),
            "log10" => Ok(Self::Log10),
            other => Err(EvaluationError::invalid(format!(
                "unknown function: {}",
                other
            ))),
        }
    }

    fn apply(self, arg: f64) -> f64 {
        match self {
            Self::Sin => arg.sin(),
            Self::Cos => arg.cos(),
            Self::Ln => arg.ln(),
            Self::Log10 => arg.log10(),
        }
    }
}
