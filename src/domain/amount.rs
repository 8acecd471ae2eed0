//! Exact conversion between human decimal jetton amounts and base units.
//!
//! A jetton with `decimals = d` stores `amount * 10^d` on chain. All
//! conversions here are integer-only; a float never touches an amount.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while converting a decimal amount to base units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Amount {amount} has {fraction_digits} decimal places, but the token supports at most {decimals}")]
    Precision {
        amount: String,
        decimals: u8,
        fraction_digits: usize,
    },
    #[error("Amount {0} is too large")]
    Overflow(String),
    #[error("Unsupported token precision: {0} decimals")]
    UnsupportedDecimals(u8),
}

/// `10^decimals`, or an error when it does not fit in `u128`.
pub fn scale(decimals: u8) -> Result<u128, AmountError> {
    10u128
        .checked_pow(u32::from(decimals))
        .ok_or(AmountError::UnsupportedDecimals(decimals))
}

/// Convert a decimal amount such as `"50.5"` to base units.
///
/// Fails with [`AmountError::Precision`] instead of truncating when the
/// amount has more fractional digits than `decimals`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<u128, AmountError> {
    let s = amount.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (s, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(AmountError::Invalid(s.to_string()));
    }

    if frac.len() > usize::from(decimals) {
        return Err(AmountError::Precision {
            amount: s.to_string(),
            decimals,
            fraction_digits: frac.len(),
        });
    }

    let overflow = || AmountError::Overflow(s.to_string());
    let unit = scale(decimals)?;

    let int_value = parse_digits(int).ok_or_else(overflow)?;
    // frac.len() <= decimals, so the exponent cannot underflow
    let frac_scale = scale(decimals - frac.len() as u8)?;
    let frac_value = parse_digits(frac)
        .and_then(|v| v.checked_mul(frac_scale))
        .ok_or_else(overflow)?;

    int_value
        .checked_mul(unit)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)
}

/// Format base units back to a normalized decimal string.
///
/// Trailing fractional zeros and the point are dropped: `5050` at two
/// decimals is `"50.5"`, `10000` is `"100"`.
pub fn from_base_units(value: u128, decimals: u8) -> Result<String, AmountError> {
    let unit = scale(decimals)?;
    let int = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return Ok(int.to_string());
    }
    let frac = format!("{:0width$}", frac, width = usize::from(decimals));
    Ok(format!("{}.{}", int, frac.trim_end_matches('0')))
}

/// Compare two base-unit quantities.
pub fn compare(a: u128, b: u128) -> Ordering {
    a.cmp(&b)
}

/// Insert `,` between thousands in the integer part of a decimal string.
pub fn group_thousands(decimal: &str) -> String {
    let (int, frac) = match decimal.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (decimal, None),
    };

    let mut grouped = String::with_capacity(int.len() + int.len() / 3 + 1);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

fn parse_digits(digits: &str) -> Option<u128> {
    digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
    })
}

/// A jetton quantity: exact base units plus the precision they are scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    base_units: u128,
    decimals: u8,
}

impl Amount {
    /// Parse a human decimal amount at the given precision.
    pub fn parse(amount: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self {
            base_units: to_base_units(amount, decimals)?,
            decimals,
        })
    }

    pub fn base_units(&self) -> u128 {
        self.base_units
    }

    pub fn is_zero(&self) -> bool {
        self.base_units == 0
    }

    /// Normalized decimal form with thousands grouped, e.g. `1,234.5`.
    pub fn display_grouped(&self) -> String {
        group_thousands(&self.to_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // decimals were checked by `parse`
        let text = from_base_units(self.base_units, self.decimals).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
