//! Latoken REST API client.
//!
//! Public endpoints (catalogs, market data) are plain GETs. Account and
//! order endpoints are signed with [`LatokenSigner`] and need credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::dto::{
    LatokenBalance, LatokenCancelledOrder, LatokenCurrency, LatokenErrorBody, LatokenNewOrder,
    LatokenOrder, LatokenOrderBook, LatokenPair, LatokenTicker, LatokenTrades,
};
use super::settings::{LatokenConfig, ENV_API_KEY, ENV_API_SECRET};
use super::signer::LatokenSigner;
use crate::domain::OrderSide;
use crate::error::{ConfigError, Result, VendorError};
use crate::port::{RequestSigner, VendorClient};

const CURRENCIES_PATH: &str = "/api/v1/ExchangeInfo/currencies";
const PAIRS_PATH: &str = "/api/v1/ExchangeInfo/pairs";
const BALANCES_PATH: &str = "/api/v1/Account/balances";
const ACTIVE_ORDERS_PATH: &str = "/api/v1/Order/active";
const NEW_ORDER_PATH: &str = "/api/v1/Order/new";
const CANCEL_ORDER_PATH: &str = "/api/v1/Order/cancel";

/// HTTP client for the Latoken REST API.
pub struct LatokenClient {
    http: HttpClient,
    base_url: String,
    signer: Option<LatokenSigner>,
    retry_max_attempts: u32,
    retry_backoff: Duration,
}

impl LatokenClient {
    /// Unauthenticated client with a single attempt per request.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer: None,
            retry_max_attempts: 1,
            retry_backoff: Duration::ZERO,
        }
    }

    /// Build from configuration, signing requests if credentials are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &LatokenConfig) -> Result<Self> {
        Ok(Self {
            http: config.http.build_client()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            signer: config.credentials.clone().map(LatokenSigner::new),
            retry_max_attempts: config.http.retry_max_attempts,
            retry_backoff: config.http.retry_backoff(),
        })
    }

    #[must_use]
    pub fn with_signer(mut self, signer: LatokenSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        self.get_with_retry(&url, &[]).await
    }

    async fn get_signed<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (url, headers) = self.signed_url(path, params)?;
        self.get_with_retry(&url, &headers).await
    }

    /// Signed call sent exactly once.
    ///
    /// Placing and cancelling orders is not idempotent: a request that timed
    /// out may already have been accepted by the exchange.
    async fn submit_signed<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (url, headers) = self.signed_url(path, params)?;
        self.execute(&url, &headers, 1).await
    }

    fn signed_url(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(String, Vec<(&'static str, String)>)> {
        let signer = self.signer.as_ref().ok_or(ConfigError::MissingCredentials {
            env_key: ENV_API_KEY,
            env_secret: ENV_API_SECRET,
        })?;
        let signed = signer.sign("GET", path, params)?;
        let url = format!("{}{}?{}", self.base_url, path, signed.query);
        Ok((url, signed.headers))
    }

    async fn get_with_retry<T>(&self, url: &str, headers: &[(&'static str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(url, headers, self.retry_max_attempts.max(1)).await
    }

    async fn execute<T>(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        max_attempts: u32,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let mut request = self.http.get(url);
            for (name, value) in headers {
                request = request.header(*name, value);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            if !status.is_success() {
                return Err(Self::api_error(status.as_u16(), &body).into());
            }
            debug!(url, bytes = body.len(), "Latoken response");
            return serde_json::from_str(&body).map_err(|e| VendorError::Decode(e).into());
        }
    }

    fn api_error(status: u16, body: &str) -> VendorError {
        let message = serde_json::from_str::<LatokenErrorBody>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        VendorError::Api { status, message }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "Latoken request failed, retrying"
        );
        if !self.retry_backoff.is_zero() {
            sleep(self.retry_backoff).await;
        }
    }

    pub async fn order_book(&self, symbol: &str, limit: u32) -> Result<LatokenOrderBook> {
        self.get_public(&format!("/api/v1/MarketData/orderBook/{symbol}/{limit}"))
            .await
    }

    pub async fn trades(&self, symbol: &str, limit: u32) -> Result<LatokenTrades> {
        self.get_public(&format!("/api/v1/MarketData/trades/{symbol}/{limit}"))
            .await
    }

    pub async fn ticker(&self, symbol: &str) -> Result<LatokenTicker> {
        self.get_public(&format!("/api/v1/MarketData/ticker/{symbol}"))
            .await
    }

    pub async fn balances(&self) -> Result<Vec<LatokenBalance>> {
        self.get_signed(BALANCES_PATH, &[]).await
    }

    pub async fn active_orders(&self, symbol: &str) -> Result<Vec<LatokenOrder>> {
        self.get_signed(ACTIVE_ORDERS_PATH, &[("symbol", symbol.to_string())])
            .await
    }

    pub async fn new_limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        price: rust_decimal::Decimal,
        amount: rust_decimal::Decimal,
    ) -> Result<LatokenNewOrder> {
        let params = [
            ("symbol", symbol.to_string()),
            ("side", side.to_string()),
            ("price", price.normalize().to_string()),
            ("amount", amount.normalize().to_string()),
            ("orderType", "limit".to_string()),
        ];
        self.submit_signed(NEW_ORDER_PATH, &params).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<LatokenCancelledOrder> {
        self.submit_signed(CANCEL_ORDER_PATH, &[("orderId", order_id.to_string())])
            .await
    }
}

#[async_trait]
impl VendorClient for LatokenClient {
    type Currency = LatokenCurrency;
    type Pair = LatokenPair;

    async fn fetch_all_currencies(&self) -> Result<Vec<LatokenCurrency>> {
        self.get_public(CURRENCIES_PATH).await
    }

    async fn fetch_all_pairs(&self) -> Result<Vec<LatokenPair>> {
        self.get_public(PAIRS_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::http::HttpConfig;

    #[test]
    fn new_strips_trailing_slash_and_uses_single_attempt() {
        let client = LatokenClient::new("https://api.latoken.com/");
        assert_eq!(client.base_url(), "https://api.latoken.com");
        assert_eq!(client.retry_max_attempts, 1);
        assert!(client.signer.is_none());
    }

    #[test]
    fn from_config_uses_http_settings() {
        let config = LatokenConfig {
            http: HttpConfig {
                retry_max_attempts: 5,
                retry_backoff_ms: 1000,
                ..HttpConfig::default()
            },
            ..LatokenConfig::default()
        };
        let client = LatokenClient::from_config(&config).unwrap();
        assert_eq!(client.retry_max_attempts, 5);
        assert_eq!(client.retry_backoff, Duration::from_secs(1));
    }

    #[test]
    fn api_error_prefers_vendor_message() {
        let body = r#"{"error":{"message":"Invalid signature","errorType":"Auth","statusCode":401}}"#;
        assert!(matches!(
            LatokenClient::api_error(401, body),
            VendorError::Api { status: 401, ref message } if message == "Invalid signature"
        ));
        assert!(matches!(
            LatokenClient::api_error(502, "Bad Gateway"),
            VendorError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn signed_endpoint_without_credentials_fails_before_sending() {
        let client = LatokenClient::new("http://127.0.0.1:1");
        let err = client.balances().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::MissingCredentials { .. })
        ));
    }
}
