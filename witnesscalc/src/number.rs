//! Numeric literals in JSON input.

use field::WitnessField;
use serde_json::{Number, Value};

use crate::errors::WitnessCalcError;

/// A validated literal: its digits without prefix, and their base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberLiteral {
    pub digits: String,
    pub radix: u32,
}

impl NumberLiteral {
    /// The literal's value reduced into `F`. No digits at all reads as zero.
    pub fn to_field<F: WitnessField>(&self) -> Result<F, WitnessCalcError> {
        F::from_digits(&self.digits, self.radix).ok_or_else(|| WitnessCalcError::InvalidNumber {
            literal: self.digits.clone(),
        })
    }
}

/// Splits off a `0b`, `0o` or `0x` prefix (either case) and checks every
/// remaining character against the base's alphabet. Without a prefix the
/// whole literal is decimal. A bare prefix or an empty string has no invalid
/// character and is accepted.
pub fn parse_literal(literal: &str) -> Result<NumberLiteral, WitnessCalcError> {
    let (digits, radix) = match literal.get(..2) {
        Some("0b" | "0B") => (&literal[2..], 2),
        Some("0o" | "0O") => (&literal[2..], 8),
        Some("0x" | "0X") => (&literal[2..], 16),
        _ => (literal, 10),
    };
    if !digits.bytes().all(|b| is_digit(b, radix)) {
        return Err(WitnessCalcError::InvalidNumber {
            literal: literal.to_string(),
        });
    }
    Ok(NumberLiteral {
        digits: digits.to_string(),
        radix,
    })
}

/// Literal for a scalar JSON value.
///
/// JSON numbers become base-10 integers truncated toward zero, so `2.9`
/// reads as `2`. Negative numbers then fail digit validation like any other
/// literal with a sign.
pub fn literal_from_json(value: &Value) -> Result<NumberLiteral, WitnessCalcError> {
    match value {
        Value::String(literal) => parse_literal(literal),
        Value::Number(number) => parse_literal(&render_integer(number)),
        other => Err(WitnessCalcError::InvalidJsonType {
            found: json_type(other),
        }),
    }
}

fn render_integer(number: &Number) -> String {
    if let Some(unsigned) = number.as_u64() {
        unsigned.to_string()
    } else if let Some(signed) = number.as_i64() {
        signed.to_string()
    } else {
        format!("{:.0}", number.as_f64().unwrap_or_default().trunc())
    }
}

fn is_digit(byte: u8, radix: u32) -> bool {
    match radix {
        16 => byte.is_ascii_hexdigit(),
        _ => byte.is_ascii_digit() && u32::from(byte - b'0') < radix,
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
