//! Public trade and ticker types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency::CurrencyPair;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A public trade execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub pair: CurrencyPair,
    /// Vendor trade id, when the vendor assigns one.
    pub id: Option<String>,
    /// Taker side.
    pub side: OrderSide,
    pub price: Decimal,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// 24h market summary for a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    pub pair: CurrencyPair,
    pub open: Option<Decimal>,
    pub last: Decimal,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub volume: Option<Decimal>,
}
