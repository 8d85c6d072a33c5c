//! Upstream task: one vendor session per pair, reconnecting on failure.
//!
//! The driver owns a [`BookSynchronizer`] and is the only writer of the
//! pair's broadcast channel. Every session is closed exactly once, whether
//! it ends by cancellation, vendor close or transport error.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::backoff::Backoff;
use crate::application::{BookSynchronizer, StreamState, SyncOutcome};
use crate::domain::{CurrencyPair, OrderBook};
use crate::error::{Error, StreamError};
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::{BookFeed, BookSnapshot, FeedConnector, FeedMessage, SnapshotSource, StreamEvent};

pub(crate) type EventSender = broadcast::Sender<Result<StreamEvent, StreamError>>;

type SnapshotFuture = BoxFuture<'static, (u64, Result<BookSnapshot, Error>)>;

/// How a session ended.
enum SessionEnd {
    Cancelled,
    Failed(String),
}

pub(crate) struct UpstreamDriver<C: FeedConnector, S: SnapshotSource> {
    connector: Arc<C>,
    snapshots: Arc<S>,
    config: StreamConfig,
    sync: BookSynchronizer,
    backoff: Backoff,
    events: EventSender,
    state: watch::Sender<StreamState>,
    /// Last published book while `Live`, handed to subscribers that join late.
    latest: watch::Sender<Option<OrderBook>>,
    cancel: CancellationToken,
}

impl<C: FeedConnector, S: SnapshotSource> UpstreamDriver<C, S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        pair: CurrencyPair,
        connector: Arc<C>,
        snapshots: Arc<S>,
        config: StreamConfig,
        events: EventSender,
        state: watch::Sender<StreamState>,
        latest: watch::Sender<Option<OrderBook>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            sync: BookSynchronizer::new(pair, config.depth, config.max_buffered_deltas),
            backoff: Backoff::new(config.reconnection.clone()),
            connector,
            snapshots,
            config,
            events,
            state,
            latest,
            cancel,
        }
    }

    /// Run until cancelled or the reconnection budget is spent.
    ///
    /// Cancels its own token on exit so subscribers observe the end.
    pub(crate) async fn run(mut self) {
        let pair = self.sync.pair().clone();
        info!(pair = %pair, "Stream upstream started");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.sync.begin_connect();
            self.publish_state();

            let mut feed = self.connector.create();
            let exchange = feed.exchange_name();
            let end = self.run_session(&mut feed).await;
            feed.close().await;

            let reason = match end {
                SessionEnd::Cancelled => break,
                SessionEnd::Failed(reason) => reason,
            };

            self.sync.connection_lost();
            self.publish_state();

            match self.backoff.record_failure() {
                Some(delay) => {
                    warn!(
                        pair = %pair,
                        exchange,
                        attempt = self.backoff.failures(),
                        delay_ms = delay.as_millis() as u64,
                        error = %reason,
                        "Stream session failed, reconnecting"
                    );
                    tokio::select! {
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                None => {
                    let attempts = self.backoff.failures();
                    error!(pair = %pair, exchange, attempts, error = %reason, "Stream failed permanently");
                    let _ = self
                        .events
                        .send(Err(StreamError::Unrecoverable { attempts, reason }));
                    break;
                }
            }
        }

        self.sync.close();
        self.publish_state();
        self.cancel.cancel();
        info!(pair = %pair, "Stream upstream stopped");
    }

    async fn run_session(&mut self, feed: &mut C::Feed) -> SessionEnd {
        let cancel = self.cancel.clone();
        let pair = self.sync.pair().clone();

        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => return SessionEnd::Cancelled,
            result = open(feed, &pair) => result,
        };
        if let Err(e) = opened {
            return SessionEnd::Failed(e.to_string());
        }

        let generation = self.sync.session_established();
        self.publish_state();
        let mut pending: Option<SnapshotFuture> = Some(self.fetch_snapshot(generation));

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return SessionEnd::Cancelled,
                (generation, result) = async {
                    match pending.as_mut() {
                        Some(fetch) => fetch.await,
                        None => std::future::pending().await,
                    }
                }, if pending.is_some() => {
                    pending = None;
                    let snapshot = match result {
                        Ok(snapshot) => snapshot,
                        Err(e) => return SessionEnd::Failed(format!("snapshot failed: {e}")),
                    };
                    let outcome = self.sync.on_snapshot(snapshot, generation);
                    if let Some(generation) = self.handle(outcome) {
                        pending = Some(self.fetch_snapshot(generation));
                    }
                }
                message = feed.next_message() => match message {
                    None => return SessionEnd::Failed("session closed by vendor".into()),
                    Some(Err(e)) => return SessionEnd::Failed(e.to_string()),
                    Some(Ok(FeedMessage::Delta(delta))) => {
                        if delta.pair != pair {
                            continue;
                        }
                        let outcome = self.sync.on_delta(delta);
                        if let Some(generation) = self.handle(outcome) {
                            // Replacing the future drops the superseded request.
                            pending = Some(self.fetch_snapshot(generation));
                        }
                    }
                    Some(Ok(FeedMessage::Trade(trade))) => {
                        if trade.pair == pair {
                            self.emit(StreamEvent::Trade(trade));
                        }
                    }
                    Some(Ok(FeedMessage::OrderChange(order))) => {
                        if order.pair == pair {
                            self.emit(StreamEvent::Order(order));
                        }
                    }
                    Some(Ok(FeedMessage::Heartbeat)) => {}
                },
            }
        }
    }

    /// Publish the outcome; returns a generation when a snapshot is needed.
    fn handle(&mut self, outcome: SyncOutcome) -> Option<u64> {
        match outcome {
            SyncOutcome::Book(book) => {
                if *self.state.borrow() != StreamState::Live {
                    self.backoff.reset();
                    self.publish_state();
                }
                self.latest.send_replace(Some(book.clone()));
                self.emit(StreamEvent::Book(book));
                None
            }
            SyncOutcome::ResyncRequired { generation } => {
                self.publish_state();
                Some(generation)
            }
            SyncOutcome::Buffered | SyncOutcome::Ignored => None,
        }
    }

    fn fetch_snapshot(&self, generation: u64) -> SnapshotFuture {
        let snapshots = Arc::clone(&self.snapshots);
        let pair = self.sync.pair().clone();
        let timeout = self.config.snapshot_timeout();
        debug!(pair = %pair, generation, "Requesting order book snapshot");
        Box::pin(async move {
            let result = match tokio::time::timeout(timeout, snapshots.fetch_snapshot(&pair)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Connection(format!(
                    "snapshot timed out after {}ms",
                    timeout.as_millis()
                ))),
            };
            (generation, result)
        })
    }

    fn emit(&self, event: StreamEvent) {
        // Err only means no subscriber is listening right now.
        let _ = self.events.send(Ok(event));
    }

    fn publish_state(&self) {
        let state = self.sync.state();
        if state != StreamState::Live {
            self.latest.send_replace(None);
        }
        self.state.send_replace(state);
    }
}

async fn open<F: BookFeed>(feed: &mut F, pair: &CurrencyPair) -> Result<(), Error> {
    feed.connect().await?;
    feed.subscribe(pair).await
}
