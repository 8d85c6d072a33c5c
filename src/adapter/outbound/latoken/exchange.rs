//! Latoken exchange facade.

use std::sync::Arc;

use async_trait::async_trait;

use super::adapter::LatokenAdapter;
use super::client::LatokenClient;
use super::service::{LatokenAccount, LatokenMarketData, LatokenTrade};
use super::settings::LatokenConfig;
use crate::application::ExchangeCore;
use crate::domain::ExchangeMetaData;
use crate::error::Result;
use crate::port::{Exchange, InitState};

pub const EXCHANGE_NAME: &str = "Latoken";

/// Latoken exchange: metadata lifecycle plus REST services.
///
/// Construct with static metadata, call [`Exchange::initialize`], then use
/// [`market_data`](Self::market_data), [`account`](Self::account) and
/// [`trade`](Self::trade). Service accessors fail with `NotReady` until an
/// initialization has succeeded.
pub struct LatokenExchange {
    core: ExchangeCore<LatokenAdapter, LatokenClient>,
}

impl LatokenExchange {
    #[must_use]
    pub fn new(client: LatokenClient, static_metadata: ExchangeMetaData) -> Self {
        Self {
            core: ExchangeCore::new(EXCHANGE_NAME, LatokenAdapter, client, static_metadata),
        }
    }

    /// Build from configuration, loading static metadata if a path is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the metadata
    /// file cannot be read or parsed.
    pub fn from_config(config: &LatokenConfig) -> Result<Self> {
        let client = LatokenClient::from_config(config)?;
        let metadata = match &config.metadata_path {
            Some(path) => ExchangeMetaData::load(path)?,
            None => ExchangeMetaData::default(),
        };
        Ok(Self::new(client, metadata))
    }

    /// Public market data bound to the current metadata.
    pub fn market_data(&self) -> Result<LatokenMarketData<'_>> {
        Ok(LatokenMarketData::new(self.core.client(), self.core.ready()?))
    }

    /// Signed account queries.
    pub fn account(&self) -> Result<LatokenAccount<'_>> {
        self.core.ready()?;
        Ok(LatokenAccount::new(self.core.client()))
    }

    /// Signed order management bound to the current metadata.
    pub fn trade(&self) -> Result<LatokenTrade<'_>> {
        Ok(LatokenTrade::new(self.core.client(), self.core.ready()?))
    }
}

#[async_trait]
impl Exchange for LatokenExchange {
    fn name(&self) -> &'static str {
        EXCHANGE_NAME
    }

    fn metadata(&self) -> Arc<ExchangeMetaData> {
        self.core.metadata()
    }

    fn state(&self) -> InitState {
        self.core.status()
    }

    /// Latoken authenticates with HMAC and a timestamp window, not a nonce.
    fn supports_nonce(&self) -> bool {
        false
    }

    async fn initialize(&self) -> Result<()> {
        self.core.initialize().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn services_refuse_before_initialize() {
        let exchange = LatokenExchange::new(
            LatokenClient::new("http://127.0.0.1:1"),
            ExchangeMetaData::default(),
        );
        assert_eq!(exchange.state(), InitState::Pending);
        assert!(matches!(exchange.market_data(), Err(Error::NotReady { .. })));
        assert!(matches!(exchange.account(), Err(Error::NotReady { .. })));
        assert!(matches!(exchange.trade(), Err(Error::NotReady { .. })));
        assert!(!exchange.supports_nonce());
    }

    #[tokio::test]
    async fn unreachable_vendor_marks_exchange_failed() {
        let exchange = LatokenExchange::new(
            LatokenClient::new("http://127.0.0.1:1"),
            ExchangeMetaData::default(),
        );

        let err = exchange.initialize().await.unwrap_err();

        assert!(matches!(err, Error::Init { exchange: "Latoken", .. }));
        assert_eq!(exchange.state(), InitState::Failed);
    }
}
