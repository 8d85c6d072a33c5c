//! Exchange metadata: per-currency and per-pair trading parameters.
//!
//! - [`CurrencyMetaData`] - Precision and withdrawal fee of one currency
//! - [`CurrencyPairMetaData`] - Fee, amount limits and price scale of one pair
//! - [`ExchangeMetaData`] - The full table an exchange facade works from
//!
//! Optional fields model "unknown", which is distinct from zero: a pair with
//! `maximum_amount: None` has no known upper bound, not an upper bound of 0.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::currency::{Currency, CurrencyPair};

/// Metadata of a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyMetaData {
    /// Number of decimal places amounts of this currency are expressed in.
    pub scale: u32,
    /// Fee charged on withdrawal, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_fee: Option<Decimal>,
}

impl CurrencyMetaData {
    #[must_use]
    pub const fn new(scale: u32, withdrawal_fee: Option<Decimal>) -> Self {
        Self {
            scale,
            withdrawal_fee,
        }
    }
}

/// Metadata of a single trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPairMetaData {
    /// Fee rate applied to trades (e.g. 0.002 = 0.2%).
    pub trading_fee: Decimal,
    /// Smallest order amount accepted, in base currency.
    pub minimum_amount: Decimal,
    /// Largest order amount accepted, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_amount: Option<Decimal>,
    /// Number of decimal places in prices.
    pub price_scale: u32,
}

/// Reason an order amount falls outside a pair's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountViolation {
    BelowMinimum { minimum: Decimal },
    AboveMaximum { maximum: Decimal },
}

impl CurrencyPairMetaData {
    #[must_use]
    pub const fn new(
        trading_fee: Decimal,
        minimum_amount: Decimal,
        maximum_amount: Option<Decimal>,
        price_scale: u32,
    ) -> Self {
        Self {
            trading_fee,
            minimum_amount,
            maximum_amount,
            price_scale,
        }
    }

    /// Round a price to this pair's price scale (half-up, as exchanges quote).
    #[must_use]
    pub fn round_price(&self, price: Decimal) -> Decimal {
        price.round_dp_with_strategy(self.price_scale, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Check an order amount against the known limits.
    pub fn check_amount(&self, amount: Decimal) -> Result<(), AmountViolation> {
        if amount < self.minimum_amount {
            return Err(AmountViolation::BelowMinimum {
                minimum: self.minimum_amount,
            });
        }
        match self.maximum_amount {
            Some(maximum) if amount > maximum => Err(AmountViolation::AboveMaximum { maximum }),
            _ => Ok(()),
        }
    }
}

/// Metadata table of one exchange.
///
/// Loaded once from a static source when the exchange is constructed, then
/// reconciled with vendor data on initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMetaData {
    #[serde(default)]
    pub currencies: HashMap<Currency, CurrencyMetaData>,
    #[serde(default)]
    pub currency_pairs: HashMap<CurrencyPair, CurrencyPairMetaData>,
}

impl ExchangeMetaData {
    #[must_use]
    pub fn new(
        currencies: HashMap<Currency, CurrencyMetaData>,
        currency_pairs: HashMap<CurrencyPair, CurrencyPairMetaData>,
    ) -> Self {
        Self {
            currencies,
            currency_pairs,
        }
    }

    #[must_use]
    pub fn currency(&self, currency: &Currency) -> Option<&CurrencyMetaData> {
        self.currencies.get(currency)
    }

    #[must_use]
    pub fn pair(&self, pair: &CurrencyPair) -> Option<&CurrencyPairMetaData> {
        self.currency_pairs.get(pair)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty() && self.currency_pairs.is_empty()
    }
}
