//! Unit price of a cart line item.
//!
//! Prices are held as [`Decimal`] in memory and written to storage as plain
//! JSON numbers, which is what existing stored carts contain.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit price in the store's currency.
///
/// Currency handling, tax and totals are outside the cart's concerns; the
/// price is carried through untouched for display by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents (two decimal places).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        let price = Price::from_cents(1050);
        assert_eq!(serde_json::to_string(&price).unwrap(), "10.5");
    }

    #[test]
    fn test_deserializes_integer_and_float() {
        let whole: Price = serde_json::from_str("10").unwrap();
        assert_eq!(whole.amount(), Decimal::new(10, 0));

        let fractional: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(fractional.amount().round_dp(2), Decimal::new(1999, 2));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
    }
}
