//! Kubernetes resource quantity parsing.
//!
//! Converts strings such as `"1Gi"`, `"500M"`, `"1.5Ti"` or `"12e6"` into an
//! integer number of base units, rounding any fractional remainder up.

use thiserror::Error;

/// Digits in `i128::MAX`.
const MAX_INTEGER_DIGITS: usize = 39;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),

    #[error("unknown suffix in quantity {0:?}")]
    UnknownSuffix(String),

    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// Parse a quantity into its integer value in base units.
///
/// The number is scaled as a decimal digit string, so neither long
/// fractions nor large suffixes lose precision before rounding.
pub fn parse_quantity(quantity: &str) -> Result<i128, QuantityError> {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (negative, unsigned) = match quantity.as_bytes()[0] {
        b'-' => (true, &quantity[1..]),
        b'+' => (false, &quantity[1..]),
        _ => (false, quantity),
    };

    let number_len = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_len);

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(QuantityError::InvalidNumber(quantity.to_string()));
    }

    let (binary_exponent, decimal_exponent) = parse_suffix(suffix)
        .ok_or_else(|| QuantityError::UnknownSuffix(quantity.to_string()))?;

    let fraction = fraction.trim_end_matches('0');
    let mut digits: Vec<u8> = whole.bytes().chain(fraction.bytes()).map(|b| b - b'0').collect();
    let mut point = whole.len() as i64;

    for _ in 0..binary_exponent {
        double(&mut digits, &mut point);
    }
    point += i64::from(decimal_exponent);

    let split = point.clamp(0, digits.len() as i64) as usize;
    let (integer, remainder) = digits.split_at(split);
    let padding = (point - split as i64).max(0) as usize;

    let value = integer_value(integer, padding)
        .ok_or_else(|| QuantityError::OutOfRange(quantity.to_string()))?;
    let value = value
        .checked_add(i128::from(remainder.iter().any(|&d| d != 0)))
        .ok_or_else(|| QuantityError::OutOfRange(quantity.to_string()))?;

    Ok(if negative { -value } else { value })
}

/// Multiply a decimal digit string by two in place.
fn double(digits: &mut Vec<u8>, point: &mut i64) {
    let mut carry = 0;
    for digit in digits.iter_mut().rev() {
        let doubled = *digit * 2 + carry;
        *digit = doubled % 10;
        carry = doubled / 10;
    }
    if carry > 0 {
        digits.insert(0, carry);
        *point += 1;
    }
}

/// Integer digits followed by `padding` zeros, or `None` if that overflows.
fn integer_value(integer: &[u8], padding: usize) -> Option<i128> {
    let significant = integer
        .iter()
        .position(|&d| d != 0)
        .map_or(&[][..], |start| &integer[start..]);
    if significant.is_empty() {
        return Some(0);
    }
    if significant.len() + padding > MAX_INTEGER_DIGITS {
        return None;
    }

    let mut value: i128 = 0;
    for &digit in significant.iter().chain(std::iter::repeat_n(&0, padding)) {
        value = value.checked_mul(10)?.checked_add(i128::from(digit))?;
    }
    Some(value)
}

/// Returns `(binary exponent, decimal exponent)` for a suffix.
fn parse_suffix(suffix: &str) -> Option<(u32, i32)> {
    let scale = match suffix {
        "" => (0, 0),
        "Ki" => (10, 0),
        "Mi" => (20, 0),
        "Gi" => (30, 0),
        "Ti" => (40, 0),
        "Pi" => (50, 0),
        "Ei" => (60, 0),
        "n" => (0, -9),
        "u" => (0, -6),
        "m" => (0, -3),
        "k" => (0, 3),
        "M" => (0, 6),
        "G" => (0, 9),
        "T" => (0, 12),
        "P" => (0, 15),
        "E" => (0, 18),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            (0, exponent.parse::<i32>().ok()?)
        }
    };
    Some(scale)
}
