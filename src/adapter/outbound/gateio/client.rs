//! Gate.io REST order-book snapshots.

use async_trait::async_trait;
use tracing::debug;

use super::adapter::{adapt_snapshot, to_wire};
use super::dto::{GateioApiError, GateioOrderBook};
use super::settings::GateioConfig;
use crate::domain::CurrencyPair;
use crate::error::{Result, VendorError};
use crate::port::{BookSnapshot, SnapshotSource};

/// Fetches `GET /spot/order_book?with_id=true` snapshots.
#[derive(Debug, Clone)]
pub struct GateioClient {
    http: reqwest::Client,
    base_url: String,
    limit: u32,
}

impl GateioClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
        }
    }

    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &GateioConfig) -> Result<Self> {
        Ok(Self {
            http: config.http.build_client()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            limit: config.snapshot_limit,
        })
    }

    /// Raw snapshot for a pair.
    pub async fn order_book(&self, pair: &CurrencyPair) -> Result<GateioOrderBook> {
        let url = format!("{}/spot/order_book", self.base_url);
        let symbol = to_wire(pair);
        let limit = self.limit.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("currency_pair", symbol.as_str()),
                ("limit", limit.as_str()),
                ("with_id", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body).into());
        }
        debug!(pair = %symbol, bytes = body.len(), "Gate.io snapshot");
        serde_json::from_str(&body).map_err(|e| VendorError::Decode(e).into())
    }

    fn api_error(status: u16, body: &str) -> VendorError {
        let message = serde_json::from_str::<GateioApiError>(body)
            .map(|e| match e.message {
                Some(message) => format!("{}: {message}", e.label),
                None => e.label,
            })
            .unwrap_or_else(|_| body.chars().take(200).collect());
        VendorError::Api { status, message }
    }
}

#[async_trait]
impl SnapshotSource for GateioClient {
    async fn fetch_snapshot(&self, pair: &CurrencyPair) -> Result<BookSnapshot> {
        let book = self.order_book(pair).await?;
        Ok(adapt_snapshot(pair, book)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_joins_label_and_message() {
        let body = r#"{"label":"INVALID_CURRENCY_PAIR","message":"Invalid currency pair FOO_BAR"}"#;
        assert!(matches!(
            GateioClient::api_error(400, body),
            VendorError::Api { status: 400, ref message }
                if message == "INVALID_CURRENCY_PAIR: Invalid currency pair FOO_BAR"
        ));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = GateioClient::new("https://api.gateio.ws/api/v4/", 50);
        assert_eq!(client.base_url, "https://api.gateio.ws/api/v4");
    }
}
