//! Fan-out of one upstream per pair to many subscribers.
//!
//! The first subscription for a pair spawns an [`UpstreamDriver`]; later
//! subscriptions join its broadcast channel. Each [`Subscription`] holds a
//! shared guard. When the last guard drops, the upstream's token is
//! cancelled and the driver closes its session.
//!
//! A subscriber joining a `Live` upstream starts from the upstream's current
//! book, then follows the broadcast. The first broadcast book may repeat it.

use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::driver::{EventSender, UpstreamDriver};
use crate::application::StreamState;
use crate::domain::{CurrencyPair, ExchangeMetaData, OrderBook};
use crate::error::StreamError;
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::{FeedConnector, SnapshotSource, StreamEvent};

/// Cancels the upstream when the last subscriber lets go.
#[derive(Debug)]
struct UpstreamGuard {
    pair: CurrencyPair,
    cancel: CancellationToken,
}

impl Drop for UpstreamGuard {
    fn drop(&mut self) {
        debug!(pair = %self.pair, "Last subscriber gone, stopping upstream");
        self.cancel.cancel();
    }
}

struct Upstream {
    events: EventSender,
    state: watch::Receiver<StreamState>,
    latest: watch::Receiver<Option<OrderBook>>,
    cancel: CancellationToken,
    guard: Weak<UpstreamGuard>,
}

impl Upstream {
    fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

/// Current merged metadata of the exchange being streamed.
type MetadataView = Arc<dyn Fn() -> Arc<ExchangeMetaData> + Send + Sync>;

/// Shared streaming entry point for one exchange.
pub struct StreamHub<C: FeedConnector, S: SnapshotSource> {
    connector: Arc<C>,
    snapshots: Arc<S>,
    config: StreamConfig,
    upstreams: DashMap<CurrencyPair, Upstream>,
    metadata: Option<MetadataView>,
}

impl<C: FeedConnector, S: SnapshotSource> StreamHub<C, S> {
    #[must_use]
    pub fn new(connector: C, snapshots: S, config: StreamConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            snapshots: Arc::new(snapshots),
            config,
            upstreams: DashMap::new(),
            metadata: None,
        }
    }

    /// Only stream pairs listed in the exchange's merged metadata.
    ///
    /// `metadata` is read on every subscription, so a table swapped in by a
    /// later initialization applies without rebuilding the hub.
    #[must_use]
    pub fn with_metadata<F>(mut self, metadata: F) -> Self
    where
        F: Fn() -> Arc<ExchangeMetaData> + Send + Sync + 'static,
    {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Subscribe to normalized book, trade and order events for `pair`.
    ///
    /// Joins the running upstream for the pair or starts a new one in
    /// `Connecting`. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnknownPair`] if a metadata table is attached
    /// and does not list `pair`.
    pub fn subscribe(&self, pair: CurrencyPair) -> Result<Subscription, StreamError> {
        if let Some(metadata) = &self.metadata {
            if metadata().pair(&pair).is_none() {
                warn!(pair = %pair, "Refusing subscription to unlisted pair");
                return Err(StreamError::UnknownPair {
                    pair: pair.to_string(),
                });
            }
        }

        self.upstreams.retain(|_, upstream| upstream.is_running());

        match self.upstreams.entry(pair.clone()) {
            Entry::Occupied(mut occupied) => {
                let upstream = occupied.get();
                if let Some(guard) = upstream.guard.upgrade().filter(|_| upstream.is_running()) {
                    debug!(pair = %pair, "Joining running upstream");
                    // Receiver first: a book published in between arrives twice
                    // rather than not at all.
                    let events = upstream.events.subscribe();
                    let initial = upstream.latest.borrow().clone();
                    return Ok(Subscription {
                        pair,
                        initial,
                        events,
                        state: upstream.state.clone(),
                        finished: upstream.cancel.clone(),
                        _guard: guard,
                    });
                }
                let (upstream, subscription) = self.spawn(pair);
                occupied.insert(upstream);
                Ok(subscription)
            }
            Entry::Vacant(vacant) => {
                let (upstream, subscription) = self.spawn(pair);
                vacant.insert(upstream);
                Ok(subscription)
            }
        }
    }

    fn spawn(&self, pair: CurrencyPair) -> (Upstream, Subscription) {
        let cancel = CancellationToken::new();
        let (events, receiver) = broadcast::channel(self.config.channel_capacity.max(1));
        let (state_tx, state) = watch::channel(StreamState::Disconnected);
        let (latest_tx, latest) = watch::channel(None);
        let guard = Arc::new(UpstreamGuard {
            pair: pair.clone(),
            cancel: cancel.clone(),
        });

        let driver = UpstreamDriver::new(
            pair.clone(),
            Arc::clone(&self.connector),
            Arc::clone(&self.snapshots),
            self.config.clone(),
            events.clone(),
            state_tx,
            latest_tx,
            cancel.clone(),
        );
        tokio::spawn(driver.run());

        let upstream = Upstream {
            events,
            state: state.clone(),
            latest,
            cancel: cancel.clone(),
            guard: Arc::downgrade(&guard),
        };
        let subscription = Subscription {
            pair,
            initial: None,
            events: receiver,
            state,
            finished: cancel,
            _guard: guard,
        };
        (upstream, subscription)
    }

    /// Pairs with a running upstream.
    #[must_use]
    pub fn active_pairs(&self) -> Vec<CurrencyPair> {
        self.upstreams
            .iter()
            .filter(|entry| entry.value().is_running())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

/// One consumer's view of a pair stream.
///
/// Dropping the subscription has the same effect as [`cancel`](Self::cancel).
pub struct Subscription {
    pair: CurrencyPair,
    initial: Option<OrderBook>,
    events: broadcast::Receiver<Result<StreamEvent, StreamError>>,
    state: watch::Receiver<StreamState>,
    finished: CancellationToken,
    _guard: Arc<UpstreamGuard>,
}

impl Subscription {
    #[must_use]
    pub const fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// Current upstream state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Next event, or `None` once the stream has ended.
    ///
    /// A terminal `Err(StreamError::Unrecoverable)` is delivered before
    /// `None`. A subscriber that falls more than the channel capacity behind
    /// skips the missed events.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, StreamError>> {
        if let Some(book) = self.initial.take() {
            return Some(Ok(StreamEvent::Book(book)));
        }
        loop {
            let received = tokio::select! {
                biased;
                received = self.events.recv() => received,
                () = self.finished.cancelled() => return None,
            };
            match received {
                Ok(item) => return Some(item),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(pair = %self.pair, skipped, "Subscriber lagging, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving. The upstream stops once no subscription remains.
    pub fn cancel(self) {
        drop(self);
    }
}
