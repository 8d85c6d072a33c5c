//! Gate.io streaming configuration.

use serde::Deserialize;

use crate::infrastructure::config::credentials::Credentials;
use crate::infrastructure::config::http::HttpConfig;
use crate::infrastructure::config::stream::StreamConfig;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "GATEIO_API_KEY";
/// Environment variable holding the API secret.
pub const ENV_API_SECRET: &str = "GATEIO_API_SECRET";

/// Gate.io connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GateioConfig {
    /// WebSocket URL for spot market streams.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// REST API base URL, used for order-book snapshots.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Levels requested per side in REST snapshots.
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: u32,
    /// Push interval of `spot.order_book_update` (`20ms` or `100ms`).
    #[serde(default = "default_update_interval")]
    pub update_interval: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    /// Enables the private `spot.orders` channel. Loaded from the
    /// environment, never from the config file.
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

fn default_ws_url() -> String {
    "wss://api.gateio.ws/ws/v4/".into()
}

fn default_api_url() -> String {
    "https://api.gateio.ws/api/v4".into()
}

const fn default_snapshot_limit() -> u32 {
    100
}

fn default_update_interval() -> String {
    "100ms".into()
}

impl Default for GateioConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            api_url: default_api_url(),
            snapshot_limit: default_snapshot_limit(),
            update_interval: default_update_interval(),
            http: HttpConfig::default(),
            stream: StreamConfig::default(),
            credentials: None,
        }
    }
}

impl GateioConfig {
    /// Read the Gate.io key pair through `lookup`.
    pub fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
        Credentials::from_lookup(ENV_API_KEY, ENV_API_SECRET, lookup)
    }
}
