//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and other methods
//! that validate domain rules.
//!
//! # Examples
//!
//! ```
//! use exchange_bridge::domain::{Currency, DomainError};
//!
//! assert!(matches!(Currency::try_new(""), Err(DomainError::EmptyCurrencyCode)));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Currency codes cannot be blank.
    #[error("currency code cannot be empty")]
    EmptyCurrencyCode,

    /// A pair string could not be split into two currencies.
    #[error("invalid currency pair '{value}'")]
    InvalidPair {
        /// The rejected text.
        value: String,
    },

    /// Amounts and prices used in orders must be positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: rust_decimal::Decimal,
    },
}
