//! Arithmetic tool
//!
//! Input is screened against a fixed character set before anything is parsed, then
//! evaluated by a small recursive-descent parser over `+ - * / // **`, unary signs
//! and parentheses. A trailing `=` is accepted and ignored.

use super::ToolResult;
use thiserror::Error;

/// Every character a valid expression may contain
pub const ALLOWED_CHARS: &str = "0123456789+-*/().= ";

pub const REJECTION_MESSAGE: &str = "Error: only basic arithmetic operators are supported";

/// Nesting limit for parentheses, unary signs and exponent chains
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("empty expression")]
    Empty,
    #[error("unexpected '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("expression is nested too deeply")]
    TooDeep,
    #[error("result is not a real number")]
    NotReal,
}

pub fn calculate(expression: &str) -> ToolResult {
    if !expression.chars().all(|c| ALLOWED_CHARS.contains(c)) {
        return ToolResult::error(REJECTION_MESSAGE);
    }

    match evaluate(expression) {
        Ok(value) => {
            let shown = expression.trim().trim_end_matches('=').trim_end();
            ToolResult::success(format!("Result: {} = {}", shown, format_number(value)))
        }
        Err(e) => ToolResult::error(format!("Calculation error: {}", e)),
    }
}

/// Evaluate an expression made of characters from [`ALLOWED_CHARS`]
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let body = expression.trim_end().trim_end_matches('=');
    let mut parser = Parser {
        chars: body.chars().collect(),
        pos: 0,
        depth: 0,
    };

    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Err(CalcError::Empty);
    }

    let value = parser.expr()?;
    parser.skip_whitespace();
    match parser.peek() {
        None if value.is_nan() => Err(CalcError::NotReal),
        None => Ok(value),
        Some(c) => Err(CalcError::UnexpectedChar(c, parser.pos)),
    }
}

/// Integral results print without a fractional part
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// True when the next two characters are `op` twice, e.g. `**`
    fn peek_double(&self, op: char) -> bool {
        self.peek() == Some(op) && self.chars.get(self.pos + 1) == Some(&op)
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := factor (('*' | '/' | '//') factor)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some('/') => {
                    let floor = self.peek_double('/');
                    self.pos += if floor { 2 } else { 1 };
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value = if floor {
                        (value / divisor).floor()
                    } else {
                        value / divisor
                    };
                }
                _ => return Ok(value),
            }
        }
    }

    // factor := ('+' | '-') factor | power
    //
    // Every nested construct passes through here, so the depth bound covers
    // parentheses, sign runs and exponent chains alike.
    fn factor(&mut self) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        self.depth += 1;
        let result = self.signed();
        self.depth -= 1;
        result
    }

    fn signed(&mut self) -> Result<f64, CalcError> {
        self.skip_whitespace();
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            _ => self.power(),
        }
    }

    // power := primary ('**' factor)?
    //
    // Right-associative and tighter than a leading sign: -2**2 is -4.
    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        self.skip_whitespace();
        if !self.peek_double('*') {
            return Ok(base);
        }
        self.pos += 2;
        let exponent = self.factor()?;
        if base == 0.0 && exponent < 0.0 {
            return Err(CalcError::DivisionByZero);
        }
        Ok(base.powf(exponent))
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, CalcError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_whitespace();
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(c) => Err(CalcError::UnexpectedChar(c, self.pos)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(CalcError::UnexpectedChar(c, self.pos)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse()
            .map_err(|_| CalcError::InvalidNumber(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        let result = calculate("2+2");
        assert!(result.success);
        assert_eq!(result.output, "Result: 2+2 = 4");
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(evaluate("-(1 + 2) * -2"), Ok(6.0));
        assert_eq!(evaluate("10 - 4 - 3"), Ok(3.0));
        assert_eq!(evaluate("7 / 2"), Ok(3.5));
    }

    #[test]
    fn test_trailing_equals_is_ignored() {
        assert_eq!(evaluate("6*7="), Ok(42.0));
        assert_eq!(calculate("1.5 * 2 = ").output, "Result: 1.5 * 2 = 3");
    }

    #[test]
    fn test_rejects_disallowed_characters() {
        let result = calculate("import os");
        assert!(!result.success);
        assert_eq!(result.output, REJECTION_MESSAGE);

        assert_eq!(calculate("2**3; rm").output, REJECTION_MESSAGE);
        assert_eq!(calculate("abs(-1)").output, REJECTION_MESSAGE);
    }

    #[test]
    fn test_division_by_zero() {
        let result = calculate("1/0");
        assert!(!result.success);
        assert_eq!(result.output, "Calculation error: division by zero");
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(evaluate(""), Err(CalcError::Empty));
        assert_eq!(evaluate("(1+2"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("1 2"), Err(CalcError::UnexpectedChar('2', 2)));
        assert!(matches!(evaluate("1..2"), Err(CalcError::InvalidNumber(_))));
        assert!(calculate("3 = 3").output.starts_with("Calculation error:"));
    }

    #[test]
    fn test_non_integral_output() {
        assert_eq!(calculate("1/4").output, "Result: 1/4 = 0.25");
    }

    #[test]
    fn test_power_operator() {
        assert_eq!(calculate("2**3").output, "Result: 2**3 = 8");
        assert_eq!(evaluate("-2**2"), Ok(-4.0));
        assert_eq!(evaluate("(-2)**2"), Ok(4.0));
        assert_eq!(evaluate("2**3**2"), Ok(512.0));
        assert_eq!(evaluate("2**-1"), Ok(0.5));
        assert_eq!(evaluate("3 * 2 ** 2"), Ok(12.0));
        assert_eq!(evaluate("0**-1"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("(-8)**0.5"), Err(CalcError::NotReal));
        assert_eq!(evaluate("2* *3"), Err(CalcError::UnexpectedChar('*', 3)));
    }

    #[test]
    fn test_floor_division() {
        assert_eq!(calculate("7//2").output, "Result: 7//2 = 3");
        assert_eq!(evaluate("-7 // 2"), Ok(-4.0));
        assert_eq!(evaluate("7.5 // 2"), Ok(3.0));
        assert_eq!(evaluate("1 + 9 // 4 * 2"), Ok(5.0));
        assert_eq!(evaluate("5 // 0"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let signs = format!("{}1", "-".repeat(200_000));
        let result = calculate(&signs);
        assert!(!result.success);
        assert_eq!(result.output, "Calculation error: expression is nested too deeply");

        let parens = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(evaluate(&parens), Err(CalcError::TooDeep));

        let exponents = format!("2{}", "**1".repeat(10_000));
        assert_eq!(evaluate(&exponents), Err(CalcError::TooDeep));
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_DEPTH / 2;
        let parens = format!("{}7{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(evaluate(&parens), Ok(7.0));
        assert_eq!(evaluate("--+-1"), Ok(-1.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_deep_nesting_inside_runtime_task() {
        let parens = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let result = tokio::spawn(async move { calculate(&parens) }).await.unwrap();
        assert!(result.output.starts_with("Calculation error:"));
    }
}
