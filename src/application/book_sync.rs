//! Order-book reconstruction from a snapshot plus sequenced deltas.
//!
//! [`BookSynchronizer`] is a synchronous state machine with no I/O. The
//! stream driver feeds it session events, deltas and snapshots, and acts on
//! the returned [`SyncOutcome`].
//!
//! ```text
//! Disconnected ──begin_connect──▶ Connecting ──session_established──▶ SyncingSnapshot
//!       ▲                                                                │      ▲
//!       │ connection_lost                                       snapshot │      │ gap
//!       │                                                                ▼      │
//!       └──────────────────────────────────────────────────────────────  Live ──┘
//! ```
//!
//! Every entry into `SyncingSnapshot` starts a new generation. Snapshots are
//! tagged with the generation they were requested in and discarded if it is
//! no longer current, so nothing derived from pre-gap state survives a
//! resync.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{CurrencyPair, OrderBook, Price, PriceLevel, Volume};
use crate::port::{BookDelta, BookSnapshot};

/// Lifecycle of one pair's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    SyncingSnapshot,
    Live,
    Closed,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::SyncingSnapshot => "syncing_snapshot",
            Self::Live => "live",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What the driver should do after feeding the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Delta held until the snapshot arrives.
    Buffered,
    /// Nothing to do: stale, duplicate, or received in the wrong state.
    Ignored,
    /// The book changed; publish it.
    Book(OrderBook),
    /// Sequence broken. State already reset; request a snapshot for `generation`.
    ResyncRequired { generation: u64 },
}

/// Per-pair book state machine.
#[derive(Debug)]
pub struct BookSynchronizer {
    pair: CurrencyPair,
    depth: usize,
    max_buffered: usize,
    state: StreamState,
    generation: u64,
    buffer: Vec<BookDelta>,
    bids: BTreeMap<Reverse<Price>, Volume>,
    asks: BTreeMap<Price, Volume>,
    last_update_id: u64,
    /// Whether a delta has been applied since the last snapshot.
    bridged: bool,
    timestamp: Option<DateTime<Utc>>,
}

impl BookSynchronizer {
    /// `depth` limits published levels per side; `max_buffered` caps deltas
    /// held while a snapshot is outstanding.
    pub fn new(pair: CurrencyPair, depth: usize, max_buffered: usize) -> Self {
        Self {
            pair,
            depth,
            max_buffered,
            state: StreamState::Disconnected,
            generation: 0,
            buffer: Vec::new(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            last_update_id: 0,
            bridged: false,
            timestamp: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn begin_connect(&mut self) {
        self.reset_book();
        self.state = StreamState::Connecting;
    }

    /// Session is up; returns the generation to request a snapshot for.
    pub fn session_established(&mut self) -> u64 {
        self.enter_syncing()
    }

    pub fn connection_lost(&mut self) {
        if self.state != StreamState::Closed {
            self.reset_book();
            self.state = StreamState::Disconnected;
        }
    }

    pub fn close(&mut self) {
        self.reset_book();
        self.state = StreamState::Closed;
    }

    /// Discard all book state and start a new snapshot generation.
    pub fn resync(&mut self) -> u64 {
        self.enter_syncing()
    }

    pub fn on_delta(&mut self, delta: BookDelta) -> SyncOutcome {
        match self.state {
            StreamState::SyncingSnapshot => {
                if self.buffer.len() >= self.max_buffered {
                    warn!(
                        pair = %self.pair,
                        buffered = self.buffer.len(),
                        "Delta buffer full while awaiting snapshot"
                    );
                    return SyncOutcome::ResyncRequired {
                        generation: self.resync(),
                    };
                }
                self.buffer.push(delta);
                SyncOutcome::Buffered
            }
            StreamState::Live => match self.apply_sequenced(&delta) {
                Ok(true) => SyncOutcome::Book(self.book()),
                Ok(false) => SyncOutcome::Ignored,
                Err(gap) => {
                    warn!(
                        pair = %self.pair,
                        expected = gap.expected,
                        first = gap.first,
                        last = gap.last,
                        "Order book sequence gap, resyncing"
                    );
                    SyncOutcome::ResyncRequired {
                        generation: self.resync(),
                    }
                }
            },
            _ => SyncOutcome::Ignored,
        }
    }

    /// Load a snapshot requested in `generation` and replay buffered deltas.
    pub fn on_snapshot(&mut self, snapshot: BookSnapshot, generation: u64) -> SyncOutcome {
        if self.state != StreamState::SyncingSnapshot || generation != self.generation {
            debug!(
                pair = %self.pair,
                snapshot_generation = generation,
                current_generation = self.generation,
                "Discarding stale snapshot"
            );
            return SyncOutcome::Ignored;
        }

        self.load_snapshot(&snapshot);
        let buffered = std::mem::take(&mut self.buffer);
        let replayed = buffered.len();

        for delta in &buffered {
            if let Err(gap) = self.apply_sequenced(delta) {
                warn!(
                    pair = %self.pair,
                    snapshot_id = snapshot.last_update_id,
                    expected = gap.expected,
                    first = gap.first,
                    "Buffered deltas do not follow snapshot, resyncing"
                );
                return SyncOutcome::ResyncRequired {
                    generation: self.resync(),
                };
            }
        }

        self.state = StreamState::Live;
        debug!(
            pair = %self.pair,
            snapshot_id = snapshot.last_update_id,
            replayed,
            last_update_id = self.last_update_id,
            "Order book live"
        );
        SyncOutcome::Book(self.book())
    }

    /// Current book truncated to the configured depth.
    #[must_use]
    pub fn book(&self) -> OrderBook {
        let bids = self
            .bids
            .iter()
            .take(self.depth)
            .map(|(Reverse(price), size)| PriceLevel::new(*price, *size))
            .collect();
        let asks = self
            .asks
            .iter()
            .take(self.depth)
            .map(|(price, size)| PriceLevel::new(*price, *size))
            .collect();
        let book = OrderBook::with_levels(self.pair.clone(), bids, asks);
        match self.timestamp {
            Some(ts) => book.at(ts),
            None => book,
        }
    }

    fn enter_syncing(&mut self) -> u64 {
        self.reset_book();
        self.generation += 1;
        self.state = StreamState::SyncingSnapshot;
        self.generation
    }

    fn reset_book(&mut self) {
        self.buffer.clear();
        self.bids.clear();
        self.asks.clear();
        self.last_update_id = 0;
        self.bridged = false;
        self.timestamp = None;
    }

    fn load_snapshot(&mut self, snapshot: &BookSnapshot) {
        self.bids.clear();
        self.asks.clear();
        for level in snapshot.book.bids() {
            if !level.size().is_zero() {
                self.bids.insert(Reverse(level.price()), level.size());
            }
        }
        for level in snapshot.book.asks() {
            if !level.size().is_zero() {
                self.asks.insert(level.price(), level.size());
            }
        }
        self.last_update_id = snapshot.last_update_id;
        self.bridged = false;
        self.timestamp = snapshot.book.timestamp();
    }

    /// Apply a delta if it continues the sequence.
    ///
    /// `Ok(false)` means the delta is entirely covered by current state.
    fn apply_sequenced(&mut self, delta: &BookDelta) -> Result<bool, Gap> {
        if delta.last_update_id <= self.last_update_id {
            return Ok(false);
        }
        let expected = self.last_update_id + 1;
        let contiguous = if self.bridged {
            delta.first_update_id == expected
        } else {
            delta.first_update_id <= expected
        };
        if !contiguous {
            return Err(Gap {
                expected,
                first: delta.first_update_id,
                last: delta.last_update_id,
            });
        }

        for level in &delta.bids {
            if level.size().is_zero() {
                self.bids.remove(&Reverse(level.price()));
            } else {
                self.bids.insert(Reverse(level.price()), level.size());
            }
        }
        for level in &delta.asks {
            if level.size().is_zero() {
                self.asks.remove(&level.price());
            } else {
                self.asks.insert(level.price(), level.size());
            }
        }
        self.last_update_id = delta.last_update_id;
        self.bridged = true;
        if delta.timestamp.is_some() {
            self.timestamp = delta.timestamp;
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy)]
struct Gap {
    expected: u64,
    first: u64,
    last: u64,
}
