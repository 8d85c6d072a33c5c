//! Streaming ports: vendor feed sessions and snapshot sources.
//!
//! A [`BookFeed`] is one transport session (typically a WebSocket) already
//! translated into [`FeedMessage`]s. A [`SnapshotSource`] returns a full
//! order book with the update id it is consistent with. The stream driver
//! combines both to maintain a live book.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CurrencyPair, Order, OrderBook, PriceLevel, Trade};
use crate::error::Error;

/// Incremental order-book change covering update ids `first..=last`.
///
/// A level with size zero removes that price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDelta {
    pub pair: CurrencyPair,
    pub first_update_id: u64,
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Full order book consistent with `last_update_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot {
    pub last_update_id: u64,
    pub book: OrderBook,
}

/// Normalized message from a vendor feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMessage {
    Delta(BookDelta),
    Trade(Trade),
    /// Change to one of the account's own orders. Only authenticated
    /// sessions carry these.
    OrderChange(Order),
    /// Subscription acks, pongs and other frames with no market data.
    Heartbeat,
}

/// Normalized item delivered to stream subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Current book after a snapshot or an applied delta.
    Book(OrderBook),
    /// Public trade execution.
    Trade(Trade),
    /// An account order was placed, filled or cancelled.
    Order(Order),
}

/// One transport session to a vendor's streaming API.
#[async_trait]
pub trait BookFeed: Send {
    /// Open the session.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Subscribe to book and trade updates for a pair, plus the account's
    /// order changes on that pair when the session is authenticated.
    async fn subscribe(&mut self, pair: &CurrencyPair) -> Result<(), Error>;

    /// Receive the next message.
    ///
    /// Returns `None` once the session has ended. Must be cancel-safe: the
    /// driver polls it inside `select!` alongside snapshot requests.
    async fn next_message(&mut self) -> Option<Result<FeedMessage, Error>>;

    /// Release the session. Called once per session by the driver.
    async fn close(&mut self);

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}

/// Creates a fresh [`BookFeed`] for every (re)connection.
pub trait FeedConnector: Send + Sync + 'static {
    type Feed: BookFeed + 'static;

    fn create(&self) -> Self::Feed;
}

/// Fetches full order-book snapshots over REST.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn fetch_snapshot(&self, pair: &CurrencyPair) -> Result<BookSnapshot, Error>;
}
