//! Exchange ports for metadata, vendor catalogs and adapters.
//!
//! - [`VendorClient`] - fetches the raw currency and pair catalogs
//! - [`Adapter`] - converts those vendor entities into domain types
//! - [`AdapterContext`] - per-cycle pair catalog the adapters consult
//! - [`Exchange`] - the facade callers initialize and read metadata from

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Currency, CurrencyMetaData, CurrencyPair, CurrencyPairMetaData, ExchangeMetaData,
};
use crate::error::{AdaptError, Error};

/// Fetches an exchange's dynamic catalogs.
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Vendor currency DTO.
    type Currency: Send;
    /// Vendor pair DTO.
    type Pair: Send;

    /// Fetch every currency the exchange lists.
    async fn fetch_all_currencies(&self) -> Result<Vec<Self::Currency>, Error>;

    /// Fetch every trading pair the exchange lists.
    async fn fetch_all_pairs(&self) -> Result<Vec<Self::Pair>, Error>;
}

/// Vendor symbols resolved to pairs, e.g. `ETHBTC -> ETH/BTC`.
///
/// Some vendors render pairs as concatenated codes that cannot be split
/// without knowing the full list of listed pairs. When several symbols name
/// the same pair, the first one listed is the pair's symbol.
#[derive(Debug, Clone, Default)]
pub struct PairCatalog {
    by_symbol: HashMap<String, CurrencyPair>,
    by_pair: HashMap<CurrencyPair, String>,
}

impl PairCatalog {
    pub fn new(entries: impl IntoIterator<Item = (String, CurrencyPair)>) -> Self {
        let mut catalog = Self::default();
        for (symbol, pair) in entries {
            let symbol = symbol.to_ascii_uppercase();
            catalog.by_pair.entry(pair.clone()).or_insert_with(|| symbol.clone());
            catalog.by_symbol.insert(symbol, pair);
        }
        catalog
    }

    /// Resolve a vendor symbol, ignoring case.
    #[must_use]
    pub fn resolve(&self, symbol: &str) -> Option<&CurrencyPair> {
        self.by_symbol.get(&symbol.to_ascii_uppercase())
    }

    /// Reverse lookup: the vendor symbol of a pair.
    #[must_use]
    pub fn symbol_of(&self, pair: &CurrencyPair) -> Option<&str> {
        self.by_pair.get(pair).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

/// State an adapter may consult during one reconciliation cycle.
///
/// Owned by a single exchange instance and rebuilt on every initialization,
/// so two exchanges in one process never see each other's catalogs.
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    catalog: Arc<PairCatalog>,
}

impl AdapterContext {
    #[must_use]
    pub fn new(catalog: PairCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &PairCatalog {
        &self.catalog
    }

    /// Resolve a vendor symbol or fail with malformed data.
    pub fn resolve_symbol(&self, symbol: &str) -> Result<CurrencyPair, AdaptError> {
        self.catalog
            .resolve(symbol)
            .cloned()
            .ok_or_else(|| AdaptError::malformed("symbol", format!("unknown pair symbol '{symbol}'")))
    }
}

/// Converts one exchange's vendor entities into domain types.
///
/// Implementations are pure: same input, same output, no I/O.
pub trait Adapter: Send + Sync {
    /// Vendor currency DTO.
    type Currency;
    /// Vendor pair DTO.
    type Pair;

    /// Vendor symbol of a pair as it appears in other payloads.
    fn pair_symbol(&self, pair: &Self::Pair) -> Option<String>;

    fn adapt_currency(&self, currency: &Self::Currency) -> Result<Currency, AdaptError>;

    fn adapt_currency_pair(
        &self,
        ctx: &AdapterContext,
        pair: &Self::Pair,
    ) -> Result<CurrencyPair, AdaptError>;

    /// Precision is required; a withdrawal fee is only reported if the vendor sent one.
    fn adapt_currency_metadata(
        &self,
        currency: &Self::Currency,
    ) -> Result<CurrencyMetaData, AdaptError>;

    fn adapt_pair_metadata(&self, pair: &Self::Pair) -> Result<CurrencyPairMetaData, AdaptError>;

    /// Whether a malformed currency fails the whole batch.
    fn is_critical_currency(&self, _currency: &Self::Currency) -> bool {
        true
    }

    /// Whether a malformed pair fails the whole batch.
    fn is_critical_pair(&self, _pair: &Self::Pair) -> bool {
        true
    }
}

/// Initialization state of an exchange facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Static metadata only; `initialize` not yet run.
    Pending,
    /// Merged metadata in place; services usable.
    Ready,
    /// Last `initialize` failed; do not trade on this instance.
    Failed,
}

impl InitState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// Exchange facade.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Exchange name for logging and error context.
    fn name(&self) -> &'static str;

    /// Snapshot of the current merged metadata table.
    fn metadata(&self) -> Arc<ExchangeMetaData>;

    fn state(&self) -> InitState;

    /// Whether the exchange authenticates with sequential nonces.
    ///
    /// Exchanges signing with a timestamp and HMAC return `false`.
    fn supports_nonce(&self) -> bool;

    /// Fetch dynamic metadata and merge it over the current table.
    ///
    /// On failure the table is left untouched and the exchange is marked
    /// [`InitState::Failed`].
    async fn initialize(&self) -> Result<(), Error>;
}
