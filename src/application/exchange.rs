//! Exchange facade core: initialization and the live metadata table.
//!
//! [`ExchangeCore`] owns the merged metadata table of one exchange instance.
//! The table lives behind an `Arc` that is swapped in a single write once a
//! whole initialization run has succeeded; readers clone the `Arc` and never
//! observe a half-merged table.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::reconcile::reconcile_exchange;
use super::snapshot::adapt_snapshot;
use crate::domain::ExchangeMetaData;
use crate::error::{Error, Result};
use crate::port::{Adapter, AdapterContext, InitState, VendorClient};

/// Immutable view of an exchange after (or before) initialization.
#[derive(Debug, Clone)]
pub struct MarketState {
    pub status: InitState,
    pub metadata: Arc<ExchangeMetaData>,
    pub context: AdapterContext,
}

/// Shared initialization logic for exchanges with a vendor catalog.
pub struct ExchangeCore<A, C> {
    name: &'static str,
    adapter: A,
    client: C,
    state: RwLock<Arc<MarketState>>,
    init_lock: Mutex<()>,
}

impl<A, C> ExchangeCore<A, C>
where
    A: Adapter,
    C: VendorClient<Currency = A::Currency, Pair = A::Pair>,
{
    /// Create the core with its static metadata table.
    pub fn new(name: &'static str, adapter: A, client: C, static_metadata: ExchangeMetaData) -> Self {
        let state = MarketState {
            status: InitState::Pending,
            metadata: Arc::new(static_metadata),
            context: AdapterContext::default(),
        };
        Self {
            name,
            adapter,
            client,
            state: RwLock::new(Arc::new(state)),
            init_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Current state, whatever its status.
    #[must_use]
    pub fn snapshot(&self) -> Arc<MarketState> {
        Arc::clone(&self.state.read())
    }

    #[must_use]
    pub fn metadata(&self) -> Arc<ExchangeMetaData> {
        Arc::clone(&self.state.read().metadata)
    }

    #[must_use]
    pub fn status(&self) -> InitState {
        self.state.read().status
    }

    /// Current state, only if initialization succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] while pending or after a failed run.
    pub fn ready(&self) -> Result<Arc<MarketState>> {
        let state = self.snapshot();
        match state.status {
            InitState::Ready => Ok(state),
            other => Err(Error::NotReady {
                exchange: self.name,
                state: other.as_str(),
            }),
        }
    }

    /// Fetch, adapt and reconcile dynamic metadata, then swap it in.
    ///
    /// Calls on the same instance are serialized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Init`] naming the exchange and the underlying vendor
    /// or adapter failure. The previous table is kept but the exchange is
    /// marked [`InitState::Failed`].
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        info!(exchange = self.name, "Initializing exchange metadata");

        match self.fetch_and_merge().await {
            Ok(next) => {
                info!(
                    exchange = self.name,
                    currencies = next.metadata.currencies.len(),
                    pairs = next.metadata.currency_pairs.len(),
                    "Exchange metadata ready"
                );
                *self.state.write() = Arc::new(next);
                Ok(())
            }
            Err(err) => {
                error!(exchange = self.name, error = %err, "Exchange initialization failed");
                let mut state = self.state.write();
                let failed = MarketState {
                    status: InitState::Failed,
                    ..MarketState::clone(&state)
                };
                *state = Arc::new(failed);
                Err(Error::init(self.name, err))
            }
        }
    }

    async fn fetch_and_merge(&self) -> Result<MarketState> {
        let currencies = self.client.fetch_all_currencies().await?;
        let pairs = self.client.fetch_all_pairs().await?;

        let snapshot = adapt_snapshot(&self.adapter, &currencies, &pairs)?;
        let previous = self.metadata();
        let merged = reconcile_exchange(&previous, snapshot.currencies, snapshot.pairs);

        Ok(MarketState {
            status: InitState::Ready,
            metadata: Arc::new(merged),
            context: snapshot.context,
        })
    }
}
