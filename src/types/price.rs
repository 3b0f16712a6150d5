//! Fixed-point limit prices.
//!
//! Prices are stored as integer ticks of 1/10 000 of the quote currency
//! (four decimal places). Integer ticks make price-level keys exact and
//! comparisons total, which floating point cannot guarantee.

use super::error::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of ticks per whole currency unit (4 decimal places).
pub const PRICE_SCALE: u64 = 10_000;

/// A strictly positive fixed-point price.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Construct from raw ticks. Fails on zero.
    pub fn from_ticks(ticks: u64) -> Result<Self, OrderError> {
        if ticks == 0 {
            return Err(OrderError::InvalidPrice {
                input: "0".to_string(),
            });
        }
        Ok(Price(ticks))
    }

    /// Construct from a floating-point value, rounding to the nearest tick.
    ///
    /// Fails on non-finite, non-positive, or sub-tick inputs.
    pub fn from_f64(value: f64) -> Result<Self, OrderError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(OrderError::InvalidPrice {
                input: value.to_string(),
            });
        }
        let ticks = (value * PRICE_SCALE as f64).round();
        if ticks < 1.0 || ticks > u64::MAX as f64 {
            return Err(OrderError::InvalidPrice {
                input: value.to_string(),
            });
        }
        Ok(Price(ticks as u64))
    }

    /// Raw tick count.
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Value as a float, for reporting and valuation.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }
}

impl fmt::Display for Price {
    /// Renders with four decimal places, e.g. `150.0000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / PRICE_SCALE, self.0 % PRICE_SCALE)
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Price {
    type Err = OrderError;

    /// Exact decimal parse with up to four fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || OrderError::InvalidPrice {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        let whole: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };
        if frac_part.len() > 4 || frac_part.chars().any(|c| !c.is_ascii_digit()) {
            return Err(err());
        }
        let mut frac: u64 = 0;
        if !frac_part.is_empty() {
            frac = frac_part.parse().map_err(|_| err())?;
            frac *= 10u64.pow(4 - frac_part.len() as u32);
        }
        let ticks = whole
            .checked_mul(PRICE_SCALE)
            .and_then(|t| t.checked_add(frac))
            .ok_or_else(err)?;
        Price::from_ticks(ticks).map_err(|_| err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f64_rounds_to_tick() {
        assert_eq!(Price::from_f64(150.0).unwrap().ticks(), 1_500_000);
        assert_eq!(Price::from_f64(99.995).unwrap().ticks(), 999_950);
        assert_eq!(Price::from_f64(0.0001).unwrap().ticks(), 1);
    }

    #[test]
    fn rejects_non_positive() {
        assert!(Price::from_f64(0.0).is_err());
        assert!(Price::from_f64(-1.5).is_err());
        assert!(Price::from_f64(f64::NAN).is_err());
        assert!(Price::from_ticks(0).is_err());
    }

    #[test]
    fn display_uses_four_decimals() {
        assert_eq!(Price::from_f64(150.0).unwrap().to_string(), "150.0000");
        assert_eq!(Price::from_f64(102.5).unwrap().to_string(), "102.5000");
        assert_eq!(Price::from_ticks(7).unwrap().to_string(), "0.0007");
    }

    #[test]
    fn parse_is_exact() {
        assert_eq!("150.0000".parse::<Price>().unwrap().ticks(), 1_500_000);
        assert_eq!("101".parse::<Price>().unwrap().ticks(), 1_010_000);
        assert_eq!("0.25".parse::<Price>().unwrap().ticks(), 2_500);
        assert_eq!(".5".parse::<Price>().unwrap().ticks(), 5_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Price>().is_err());
        assert!("-5".parse::<Price>().is_err());
        assert!("1.23456".parse::<Price>().is_err());
        assert!("abc".parse::<Price>().is_err());
        assert!("0".parse::<Price>().is_err());
        assert!("1.2x".parse::<Price>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let p = Price::from_f64(123.4567).unwrap();
        let back: Price = p.to_string().parse().unwrap();
        assert_eq!(p, back);
    }
}
