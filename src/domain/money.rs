//! Money type
//!
//! Domain primitive for plan and installment amounts.
//! All amounts are validated at construction time, so invalid values
//! cannot exist inside the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed amount (NUMERIC(10,2) column: 8 integer digits)
const MAX_AMOUNT: &str = "99999999.99";

/// Monetary amounts carry at most 2 decimal places
const MAX_SCALE: u32 = 2;

/// Money represents a validated monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 2 decimal places
/// - Fits a NUMERIC(10,2) column
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use payplan::domain::Money;
///
/// let amount = Money::new(Decimal::new(25000, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(25000, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

/// Errors that can occur when creating a Money value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Money {
    /// Create a new Money value with validation.
    ///
    /// # Errors
    /// - `MoneyError::NotPositive` if value <= 0
    /// - `MoneyError::TooManyDecimals` if more than 2 decimal places
    /// - `MoneyError::Overflow` if the value does not fit NUMERIC(10,2)
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value <= Decimal::ZERO {
            return Err(MoneyError::NotPositive(value));
        }

        if value.normalize().scale() > MAX_SCALE {
            return Err(MoneyError::TooManyDecimals(value.scale()));
        }

        let max = Decimal::from_str(MAX_AMOUNT).expect("Invalid MAX_AMOUNT constant");
        if value > max {
            return Err(MoneyError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| MoneyError::ParseError(e.to_string()))?;
        Money::new(decimal)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::from_str(&value)
    }
}

impl From<Money> for String {
    fn from(amount: Money) -> Self {
        format!("{:.2}", amount.0)
    }
}
