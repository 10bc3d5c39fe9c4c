//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., pesos, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// Line total for `quantity` units of this price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Add another price of the same currency.
    ///
    /// Returns `None` when the currencies differ; a cart never mixes
    /// currencies, so a mismatch means corrupt input.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency_code != other.currency_code {
            return None;
        }
        Some(Self {
            amount: self.amount + other.amount,
            currency_code: self.currency_code,
        })
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    COP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::COP | Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// ISO 4217 code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::COP => "COP",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times() {
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
        assert_eq!(price.times(3).amount, Decimal::new(5997, 2));
    }

    #[test]
    fn test_checked_add_same_currency() {
        let a = Price::new(Decimal::new(1000, 2), CurrencyCode::COP);
        let b = Price::new(Decimal::new(550, 2), CurrencyCode::COP);
        assert_eq!(a.checked_add(&b).unwrap().amount, Decimal::new(1550, 2));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Price::new(Decimal::new(1000, 2), CurrencyCode::COP);
        let b = Price::new(Decimal::new(550, 2), CurrencyCode::EUR);
        assert!(a.checked_add(&b).is_none());
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(199, 1), CurrencyCode::USD);
        assert_eq!(price.display(), "$19.90");
    }

    #[test]
    fn test_zero() {
        assert_eq!(Price::zero(CurrencyCode::COP).amount, Decimal::ZERO);
    }
}
