//! Exchange-agnostic domain types.
//!
//! Everything an exchange adapter produces lands in one of these types, so
//! callers never see vendor wire formats.

pub mod account;
pub mod book;
pub mod currency;
pub mod error;
pub mod metadata;
pub mod order;
pub mod trade;

pub use account::Balance;
pub use book::{OrderBook, Price, PriceLevel, Volume};
pub use currency::{Currency, CurrencyPair};
pub use error::DomainError;
pub use metadata::{AmountViolation, CurrencyMetaData, CurrencyPairMetaData, ExchangeMetaData};
pub use order::{LimitOrderRequest, Order, OrderId, OrderStatus};
pub use trade::{OrderSide, Ticker, Trade};
