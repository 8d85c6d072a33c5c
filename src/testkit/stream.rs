//! Channel-backed streaming doubles.
//!
//! - [`ChannelConnector`] hands out one [`ChannelFeed`] per session. Each
//!   feed is driven by its [`FeedHandle`]; once the prepared feeds are used
//!   up, further sessions refuse to connect.
//! - [`ChannelSnapshots`] answers snapshot requests on demand through a
//!   [`SnapshotHandle`], so tests decide when a snapshot arrives.
//!
//! Counters are shared across every feed of one connector so tests can
//! assert how many sessions were opened and closed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::domain::{CurrencyPair, OrderBook, PriceLevel};
use crate::error::{Error, Result};
use crate::port::{BookDelta, BookFeed, BookSnapshot, FeedConnector, FeedMessage, SnapshotSource};

type Script = Option<Result<FeedMessage>>;

/// Session counters shared by all feeds of a connector.
#[derive(Debug, Default)]
pub struct FeedCounters {
    created: AtomicU32,
    connects: AtomicU32,
    subscribes: AtomicU32,
    closes: AtomicU32,
}

impl FeedCounters {
    pub fn created(&self) -> u32 {
        self.created.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn subscribes(&self) -> u32 {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A [`BookFeed`] whose messages come from a [`FeedHandle`].
pub struct ChannelFeed {
    messages: Option<mpsc::UnboundedReceiver<Script>>,
    counters: Arc<FeedCounters>,
    subscribed: Arc<Mutex<Vec<CurrencyPair>>>,
}

/// Control side of a [`ChannelFeed`].
#[derive(Clone)]
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<Script>,
    subscribed: Arc<Mutex<Vec<CurrencyPair>>>,
}

impl FeedHandle {
    /// Queue a normalized message.
    pub fn send(&self, message: FeedMessage) {
        let _ = self.tx.send(Some(Ok(message)));
    }

    /// Queue an order-book delta.
    pub fn delta(&self, delta: BookDelta) {
        self.send(FeedMessage::Delta(delta));
    }

    /// Queue a transport error.
    pub fn fail(&self, reason: &str) {
        let _ = self.tx.send(Some(Err(Error::Connection(reason.to_string()))));
    }

    /// End the session as if the vendor closed it.
    pub fn end(&self) {
        let _ = self.tx.send(None);
    }

    /// Pairs subscribed on this session.
    pub fn subscribed(&self) -> Vec<CurrencyPair> {
        self.subscribed.lock().clone()
    }
}

#[async_trait]
impl BookFeed for ChannelFeed {
    async fn connect(&mut self) -> Result<()> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        if self.messages.is_none() {
            return Err(Error::Connection("connection refused".into()));
        }
        Ok(())
    }

    async fn subscribe(&mut self, pair: &CurrencyPair) -> Result<()> {
        self.counters.subscribes.fetch_add(1, Ordering::SeqCst);
        self.subscribed.lock().push(pair.clone());
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<FeedMessage>> {
        match self.messages.as_mut()?.recv().await {
            Some(Some(message)) => Some(message),
            Some(None) | None => None,
        }
    }

    async fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.messages = None;
    }

    fn exchange_name(&self) -> &'static str {
        "mock"
    }
}

/// Hands out prepared [`ChannelFeed`]s in order.
pub struct ChannelConnector {
    feeds: Mutex<VecDeque<ChannelFeed>>,
    counters: Arc<FeedCounters>,
}

impl ChannelConnector {
    /// Prepare `sessions` feeds; returns their handles in session order.
    pub fn new(sessions: usize) -> (Self, Vec<FeedHandle>) {
        let counters = Arc::new(FeedCounters::default());
        let mut feeds = VecDeque::with_capacity(sessions);
        let mut handles = Vec::with_capacity(sessions);
        for _ in 0..sessions {
            let (tx, rx) = mpsc::unbounded_channel();
            let subscribed = Arc::new(Mutex::new(Vec::new()));
            feeds.push_back(ChannelFeed {
                messages: Some(rx),
                counters: Arc::clone(&counters),
                subscribed: Arc::clone(&subscribed),
            });
            handles.push(FeedHandle { tx, subscribed });
        }
        (
            Self {
                feeds: Mutex::new(feeds),
                counters,
            },
            handles,
        )
    }

    pub fn counters(&self) -> Arc<FeedCounters> {
        Arc::clone(&self.counters)
    }
}

impl FeedConnector for ChannelConnector {
    type Feed = ChannelFeed;

    fn create(&self) -> ChannelFeed {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        self.feeds.lock().pop_front().unwrap_or_else(|| ChannelFeed {
            messages: None,
            counters: Arc::clone(&self.counters),
            subscribed: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

/// A [`SnapshotSource`] answered through a [`SnapshotHandle`].
pub struct ChannelSnapshots {
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<BookSnapshot>>>,
    requests: Arc<AtomicU32>,
}

/// Control side of [`ChannelSnapshots`].
#[derive(Clone)]
pub struct SnapshotHandle {
    tx: mpsc::UnboundedSender<Result<BookSnapshot>>,
    requests: Arc<AtomicU32>,
}

impl ChannelSnapshots {
    pub fn new() -> (Self, SnapshotHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let requests = Arc::new(AtomicU32::new(0));
        (
            Self {
                rx: tokio::sync::Mutex::new(rx),
                requests: Arc::clone(&requests),
            },
            SnapshotHandle { tx, requests },
        )
    }
}

impl SnapshotHandle {
    /// Answer the next snapshot request.
    pub fn respond(&self, snapshot: BookSnapshot) {
        let _ = self.tx.send(Ok(snapshot));
    }

    /// Fail the next snapshot request.
    pub fn fail(&self, reason: &str) {
        let _ = self.tx.send(Err(Error::Connection(reason.to_string())));
    }

    /// Snapshot requests made so far.
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ChannelSnapshots {
    async fn fetch_snapshot(&self, _pair: &CurrencyPair) -> Result<BookSnapshot> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.rx.lock().await.recv().await {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

/// `(price, size)` tuples to levels.
pub fn levels(side: &[(Decimal, Decimal)]) -> Vec<PriceLevel> {
    side.iter()
        .map(|(price, size)| PriceLevel::new(*price, *size))
        .collect()
}

/// Delta covering update ids `first..=last`.
pub fn delta(
    pair: &CurrencyPair,
    first: u64,
    last: u64,
    bids: &[(Decimal, Decimal)],
    asks: &[(Decimal, Decimal)],
) -> BookDelta {
    BookDelta {
        pair: pair.clone(),
        first_update_id: first,
        last_update_id: last,
        bids: levels(bids),
        asks: levels(asks),
        timestamp: None,
    }
}

/// Snapshot consistent with update id `id`.
pub fn snapshot(
    pair: &CurrencyPair,
    id: u64,
    bids: &[(Decimal, Decimal)],
    asks: &[(Decimal, Decimal)],
) -> BookSnapshot {
    BookSnapshot {
        last_update_id: id,
        book: OrderBook::with_levels(pair.clone(), levels(bids), levels(asks)),
    }
}
