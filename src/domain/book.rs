//! Order book types for market depth representation.
//!
//! This module provides types for representing order book state:
//!
//! - [`PriceLevel`] - A single price level with size
//! - [`OrderBook`] - Complete order book for a single pair
//!
//! # Order Book Structure
//!
//! An order book has two sides:
//! - **Bids**: Buy orders, sorted by price descending (best bid first)
//! - **Asks**: Sell orders, sorted by price ascending (best ask first)
//!
//! # Examples
//!
//! ```
//! use exchange_bridge::domain::{CurrencyPair, OrderBook, PriceLevel};
//! use rust_decimal_macros::dec;
//!
//! let pair = CurrencyPair::from_codes("BTC", "USDT").unwrap();
//! let book = OrderBook::with_levels(
//!     pair,
//!     vec![PriceLevel::new(dec!(100), dec!(1)), PriceLevel::new(dec!(101), dec!(2))],
//!     vec![PriceLevel::new(dec!(103), dec!(1)), PriceLevel::new(dec!(102), dec!(5))],
//! );
//!
//! assert_eq!(book.best_bid().unwrap().price(), dec!(101));
//! assert_eq!(book.best_ask().unwrap().price(), dec!(102));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency::CurrencyPair;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Volume represented as a Decimal for precision.
pub type Volume = Decimal;

/// A single price level in an order book.
///
/// Represents aggregated orders at a specific price point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// The price at this level.
    price: Price,
    /// Total volume available at this price.
    size: Volume,
}

impl PriceLevel {
    /// Creates a new price level.
    #[must_use]
    pub const fn new(price: Price, size: Volume) -> Self {
        Self { price, size }
    }

    /// Returns the price at this level.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Returns the total volume at this level.
    #[must_use]
    pub const fn size(&self) -> Volume {
        self.size
    }
}

/// Order book for a single currency pair.
///
/// Levels are kept sorted best-first on construction, whatever order the
/// vendor delivered them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBook {
    pair: CurrencyPair,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    timestamp: Option<DateTime<Utc>>,
}

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub const fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            bids: Vec::new(),
            asks: Vec::new(),
            timestamp: None,
        }
    }

    /// Creates an order book with the given levels, sorting each side.
    #[must_use]
    pub fn with_levels(
        pair: CurrencyPair,
        mut bids: Vec<PriceLevel>,
        mut asks: Vec<PriceLevel>,
    ) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            pair,
            bids,
            asks,
            timestamp: None,
        }
    }

    /// Attach the vendor timestamp of this book.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub const fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// Returns all bid levels, best first.
    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Returns all ask levels, best first.
    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Best bid (highest buy price).
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Best ask (lowest sell price).
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Keep at most `depth` levels per side.
    #[must_use]
    pub fn truncated(mut self, depth: usize) -> Self {
        self.bids.truncate(depth);
        self.asks.truncate(depth);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> CurrencyPair {
        CurrencyPair::from_codes("ETH", "BTC").unwrap()
    }

    #[test]
    fn empty_book_has_no_best_levels() {
        let book = OrderBook::new(pair());
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn levels_are_sorted_best_first() {
        let book = OrderBook::with_levels(
            pair(),
            vec![
                PriceLevel::new(dec!(0.050), dec!(1)),
                PriceLevel::new(dec!(0.052), dec!(1)),
                PriceLevel::new(dec!(0.051), dec!(1)),
            ],
            vec![
                PriceLevel::new(dec!(0.055), dec!(1)),
                PriceLevel::new(dec!(0.053), dec!(1)),
            ],
        );

        let bids: Vec<_> = book.bids().iter().map(PriceLevel::price).collect();
        assert_eq!(bids, vec![dec!(0.052), dec!(0.051), dec!(0.050)]);
        assert_eq!(book.best_ask().unwrap().price(), dec!(0.053));
    }

    #[test]
    fn truncated_limits_depth() {
        let book = OrderBook::with_levels(
            pair(),
            vec![
                PriceLevel::new(dec!(3), dec!(1)),
                PriceLevel::new(dec!(2), dec!(1)),
            ],
            vec![PriceLevel::new(dec!(4), dec!(1))],
        )
        .truncated(1);

        assert_eq!(book.bids().len(), 1);
        assert_eq!(book.asks().len(), 1);
        assert_eq!(book.best_bid().unwrap().price(), dec!(3));
    }
}
