//! Parser for CSS-style transform strings emitted by the manipulation surface.
//!
//! # Grammar
//!
//! ```text
//! transform := "none" | "" | function+
//! function  := name "(" value (","? value)* ")"
//! value     := number unit?
//! unit      := "px" | "deg" | "rad" | "turn" | "grad"
//! name      := matrix | translate | translateX | translateY
//!            | rotate | scale | scaleX | scaleY
//! ```
//!
//! Functions compose left to right, so `translate(..) rotate(..)` rotates
//! first and then translates, as in CSS.

use std::f64::consts::PI;
use std::str::FromStr;

use super::{AffineTransform2D, TransformError};

/// Parse a transform string into a matrix.
///
/// # Errors
///
/// Returns `TransformError::Parse` for malformed input or non-finite numbers,
/// `TransformError::UnknownFunction` for unsupported functions, and
/// `TransformError::Arity` when a function has the wrong argument count.
///
/// # Example
///
/// ```ignore
/// let m = parse_transform("matrix(0, 1, -1, 0, 20, 10)")?;
/// assert_eq!(m.tx, 20.0);
/// ```
pub fn parse_transform(input: &str) -> Result<AffineTransform2D, TransformError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "none" {
        return Ok(AffineTransform2D::IDENTITY);
    }

    let mut parser = Parser::new(input);
    let mut acc = AffineTransform2D::IDENTITY;
    loop {
        parser.skip_whitespace();
        if parser.at_end() {
            break;
        }
        let function = parser.function()?;
        acc = acc * function;
    }

    if !acc.is_finite() {
        return Err(TransformError::NonFinite);
    }
    Ok(acc)
}

impl FromStr for AffineTransform2D {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_transform(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Value<'a> {
    number: f64,
    unit: &'a str,
    offset: usize,
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> TransformError {
        TransformError::Parse {
            offset,
            message: message.into(),
        }
    }

    fn expect(&mut self, ch: u8) -> Result<(), TransformError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == ch => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(
                self.pos,
                format!("expected '{}', found '{}'", ch as char, c as char),
            )),
            None => Err(self.error(self.pos, format!("expected '{}'", ch as char))),
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == b'%') {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn function(&mut self) -> Result<AffineTransform2D, TransformError> {
        let start = self.pos;
        let name = self.ident();
        if name.is_empty() {
            return Err(self.error(start, "expected a transform function"));
        }
        self.expect(b'(')?;
        let args = self.arguments()?;
        self.expect(b')')?;
        build(name, &args)
    }

    fn arguments(&mut self) -> Result<Vec<Value<'a>>, TransformError> {
        let mut args = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b')') if !args.is_empty() => return Ok(args),
                Some(b',') if !args.is_empty() => {
                    self.pos += 1;
                    self.skip_whitespace();
                    args.push(self.value()?);
                }
                _ => args.push(self.value()?),
            }
        }
    }

    // Number: [+-]?([0-9]+(.[0-9]*)?|.[0-9]+)([eE][+-]?[0-9]+)?
    fn value(&mut self) -> Result<Value<'a>, TransformError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }

        let digits_start = self.pos;
        self.digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.digits();
        }
        if self.pos == digits_start || &self.input[digits_start..self.pos] == "." {
            return Err(self.error(start, "expected a number"));
        }

        // Only treat 'e' as an exponent when digits follow, so "1em" stays a unit.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut look = self.pos + 1;
            if matches!(self.bytes.get(look), Some(b'+' | b'-')) {
                look += 1;
            }
            if matches!(self.bytes.get(look), Some(c) if c.is_ascii_digit()) {
                self.pos = look;
                self.digits();
            }
        }

        let number: f64 = self.input[start..self.pos]
            .parse()
            .map_err(|_| self.error(start, "invalid number"))?;
        if !number.is_finite() {
            return Err(self.error(start, "number out of range"));
        }

        let unit = self.ident();
        Ok(Value {
            number,
            unit,
            offset: start,
        })
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
    }
}

fn build(name: &str, args: &[Value<'_>]) -> Result<AffineTransform2D, TransformError> {
    match name {
        "matrix" => {
            arity(name, args, 6, 6, "6")?;
            let v = unitless(args)?;
            Ok(AffineTransform2D::new(v[0], v[1], v[2], v[3], v[4], v[5]))
        }
        "translate" => {
            arity(name, args, 1, 2, "1 or 2")?;
            let x = length(&args[0])?;
            let y = args.get(1).map(length).transpose()?.unwrap_or(0.0);
            Ok(AffineTransform2D::translate(x, y))
        }
        "translateX" => {
            arity(name, args, 1, 1, "1")?;
            Ok(AffineTransform2D::translate(length(&args[0])?, 0.0))
        }
        "translateY" => {
            arity(name, args, 1, 1, "1")?;
            Ok(AffineTransform2D::translate(0.0, length(&args[0])?))
        }
        "rotate" => {
            arity(name, args, 1, 1, "1")?;
            Ok(AffineTransform2D::rotate(angle(&args[0])?))
        }
        "scale" => {
            arity(name, args, 1, 2, "1 or 2")?;
            let v = unitless(args)?;
            let sx = v[0];
            let sy = v.get(1).copied().unwrap_or(sx);
            Ok(AffineTransform2D::scale(sx, sy))
        }
        "scaleX" => {
            arity(name, args, 1, 1, "1")?;
            Ok(AffineTransform2D::scale(unitless(args)?[0], 1.0))
        }
        "scaleY" => {
            arity(name, args, 1, 1, "1")?;
            Ok(AffineTransform2D::scale(1.0, unitless(args)?[0]))
        }
        other => Err(TransformError::UnknownFunction(other.to_string())),
    }
}

fn arity(
    function: &str,
    args: &[Value<'_>],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), TransformError> {
    if args.len() < min || args.len() > max {
        return Err(TransformError::Arity {
            function: function.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn unexpected_unit(value: &Value<'_>) -> TransformError {
    TransformError::Parse {
        offset: value.offset,
        message: format!("unexpected unit '{}'", value.unit),
    }
}

fn unitless(args: &[Value<'_>]) -> Result<Vec<f64>, TransformError> {
    args.iter()
        .map(|v| {
            if v.unit.is_empty() {
                Ok(v.number)
            } else {
                Err(unexpected_unit(v))
            }
        })
        .collect()
}

fn length(value: &Value<'_>) -> Result<f64, TransformError> {
    match value.unit {
        "" | "px" => Ok(value.number),
        _ => Err(unexpected_unit(value)),
    }
}

fn angle(value: &Value<'_>) -> Result<f64, TransformError> {
    match value.unit {
        "deg" => Ok(value.number.to_radians()),
        "rad" => Ok(value.number),
        "turn" => Ok(value.number * 2.0 * PI),
        "grad" => Ok(value.number * PI / 200.0),
        "" if value.number == 0.0 => Ok(0.0),
        _ => Err(unexpected_unit(value)),
    }
}
