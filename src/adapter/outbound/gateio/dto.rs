//! Gate.io v4 WebSocket and REST payloads.
//!
//! Every WebSocket frame is an envelope:
//! ```json
//! {"time":1606294781,"channel":"spot.order_book_update","event":"update",
//!  "result":{"t":1606294781123,"s":"BTC_USDT","U":48776301,"u":48776306,
//!            "b":[["19137.74","0.0001"]],"a":[["19137.75","0.6135"]]}}
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const CHANNEL_BOOK_UPDATE: &str = "spot.order_book_update";
pub const CHANNEL_TRADES: &str = "spot.trades";
pub const CHANNEL_PONG: &str = "spot.pong";
/// Private channel: the account's own orders. Requires `auth`.
pub const CHANNEL_ORDERS: &str = "spot.orders";

pub const EVENT_SUBSCRIBE: &str = "subscribe";

/// Outgoing request frame.
#[derive(Debug, Serialize)]
pub struct GateioRequest {
    pub time: i64,
    pub channel: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<GateioAuth>,
}

impl GateioRequest {
    pub fn subscribe(time: i64, channel: &'static str, payload: Vec<String>) -> Self {
        Self {
            time,
            channel,
            event: Some(EVENT_SUBSCRIBE),
            payload,
            auth: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: GateioAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Signature block of a private channel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateioAuth {
    pub method: &'static str,
    #[serde(rename = "KEY")]
    pub key: String,
    #[serde(rename = "SIGN")]
    pub sign: String,
}

impl GateioAuth {
    pub fn api_key(key: impl Into<String>, sign: impl Into<String>) -> Self {
        Self {
            method: "api_key",
            key: key.into(),
            sign: sign.into(),
        }
    }
}

/// Incoming frame.
#[derive(Debug, Deserialize)]
pub struct GateioEnvelope {
    pub channel: String,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<GateioError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateioError {
    pub code: i64,
    pub message: String,
}

/// `[price, amount]` as decimal strings.
pub type GateioLevel = (Decimal, Decimal);

#[derive(Debug, Clone, Deserialize)]
pub struct GateioBookUpdate {
    /// Update time in milliseconds.
    pub t: Option<i64>,
    pub s: String,
    #[serde(rename = "U")]
    pub first_update_id: u64,
    #[serde(rename = "u")]
    pub last_update_id: u64,
    #[serde(default)]
    pub b: Vec<GateioLevel>,
    #[serde(default)]
    pub a: Vec<GateioLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateioTrade {
    pub id: u64,
    /// Milliseconds, sent as a fractional string or number.
    pub create_time_ms: Decimal,
    pub side: String,
    pub currency_pair: String,
    pub amount: Decimal,
    pub price: Decimal,
}

/// One entry of a `spot.orders` update; updates arrive as arrays.
#[derive(Debug, Clone, Deserialize)]
pub struct GateioOrderUpdate {
    pub id: String,
    pub currency_pair: String,
    pub side: String,
    pub price: Decimal,
    pub amount: Decimal,
    /// Amount still open.
    pub left: Decimal,
    /// `put`, `update` or `finish`.
    pub event: String,
    /// Why a finished order closed (`filled`, `cancelled`, `ioc`, ...).
    #[serde(default)]
    pub finish_as: Option<String>,
    #[serde(default)]
    pub create_time_ms: Option<Decimal>,
}

/// REST `GET /spot/order_book?with_id=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct GateioOrderBook {
    pub id: u64,
    /// Snapshot time in milliseconds.
    pub current: Option<i64>,
    #[serde(default)]
    pub bids: Vec<GateioLevel>,
    #[serde(default)]
    pub asks: Vec<GateioLevel>,
}

/// REST error body.
#[derive(Debug, Clone, Deserialize)]
pub struct GateioApiError {
    pub label: String,
    #[serde(default)]
    pub message: Option<String>,
}
