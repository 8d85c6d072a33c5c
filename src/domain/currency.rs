//! Currency and currency-pair value types.
//!
//! Both types are immutable and compare by value. The canonical text form of
//! a pair is `BASE/COUNTER`; exchange-specific wire forms (`BTC_USDT`,
//! `ETHBTC`, ...) are produced and parsed by the exchange adapters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Currency code, upper-cased on construction.
///
/// The inner String is private so every instance goes through the
/// normalizing constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a currency from a code.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCurrencyCode`] if the code is blank.
    pub fn try_new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(DomainError::EmptyCurrencyCode);
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Get the currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Ordered `(base, counter)` pair of currencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: Currency,
    counter: Currency,
}

impl CurrencyPair {
    /// Create a pair from its two legs.
    #[must_use]
    pub const fn new(base: Currency, counter: Currency) -> Self {
        Self { base, counter }
    }

    /// Create a pair from two currency codes.
    ///
    /// # Errors
    ///
    /// Returns an error if either code is blank.
    pub fn from_codes(base: &str, counter: &str) -> Result<Self, DomainError> {
        Ok(Self::new(Currency::try_new(base)?, Currency::try_new(counter)?))
    }

    /// The currency being bought or sold.
    #[must_use]
    pub const fn base(&self) -> &Currency {
        &self.base
    }

    /// The currency the base is priced in.
    #[must_use]
    pub const fn counter(&self) -> &Currency {
        &self.counter
    }

    /// Render the pair with a custom separator, e.g. `BTC_USDT`.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        format!("{}{}{}", self.base, separator, self.counter)
    }

    /// Parse a pair rendered with a custom separator.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPair`] if the separator is missing or a
    /// leg is blank.
    pub fn split(s: &str, separator: &str) -> Result<Self, DomainError> {
        let (base, counter) = s.split_once(separator).ok_or_else(|| DomainError::InvalidPair {
            value: s.to_string(),
        })?;
        Self::from_codes(base, counter).map_err(|_| DomainError::InvalidPair {
            value: s.to_string(),
        })
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.counter)
    }
}

impl FromStr for CurrencyPair {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::split(s, "/")
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.to_string()
    }
}
