//! Restricted arithmetic evaluator.
//!
//! Accepts only decimal numbers, `+ - * /`, unary sign and parentheses.
//! Anything else is an error; user text is never handed to a general-purpose
//! evaluator.
//!
//! Grammar:
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! number := digit+ ('.' digit+)? | '.' digit+
//! ```

use thiserror::Error;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum ArithmeticError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected '{found}' at position {position}")]
    Unexpected { found: char, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Characters that survive the pre-evaluation strip.
pub fn is_expression_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// Evaluate an arithmetic expression. Whitespace is ignored.
pub fn evaluate(input: &str) -> Result<f64, ArithmeticError> {
    let chars: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() {
        return Err(ArithmeticError::Empty);
    }

    let mut parser = Parser { chars, pos: 0 };
    let value = parser.expr(0)?;

    if let Some(&found) = parser.chars.get(parser.pos) {
        return Err(ArithmeticError::Unexpected {
            found,
            position: parser.pos,
        });
    }
    if !value.is_finite() {
        return Err(ArithmeticError::NonFinite);
    }
    Ok(value)
}

/// Render a result the way a person would write it: `48`, `2.5`, `0.3`.
pub fn format_number(value: f64) -> String {
    // Past 1e15 an f64 has no fractional digits left to clean up, and scaling
    // by 1e10 could overflow to infinity.
    let rounded = if value.abs() >= 1e15 {
        value
    } else {
        (value * 1e10).round() / 1e10
    };
    // Avoid printing "-0".
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self, depth: usize) -> Result<f64, ArithmeticError> {
        let mut value = self.term(depth)?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term(depth)?;
            if op == '+' {
                value += rhs;
            } else {
                value -= rhs;
            }
        }
        Ok(value)
    }

    fn term(&mut self, depth: usize) -> Result<f64, ArithmeticError> {
        let mut value = self.factor(depth)?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor(depth)?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self, depth: usize) -> Result<f64, ArithmeticError> {
        if depth > MAX_DEPTH {
            return Err(ArithmeticError::TooDeep);
        }

        match self.peek() {
            None => Err(ArithmeticError::UnexpectedEnd),
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor(depth + 1)?)
            }
            Some('+') => {
                self.pos += 1;
                self.factor(depth + 1)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr(depth + 1)?;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(found) => Err(ArithmeticError::Unexpected {
                        found,
                        position: self.pos,
                    }),
                    None => Err(ArithmeticError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(found) => Err(ArithmeticError::Unexpected {
                found,
                position: self.pos,
            }),
        }
    }

    fn number(&mut self) -> Result<f64, ArithmeticError> {
        let start = self.pos;
        let mut seen_dot = false;
        let mut digits = 0;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            self.pos += 1;
        }

        if digits == 0 {
            return Err(ArithmeticError::Unexpected {
                found: '.',
                position: start,
            });
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        literal.parse::<f64>().map_err(|_| ArithmeticError::Unexpected {
            found: self.chars[start],
            position: start,
        })
    }
}
