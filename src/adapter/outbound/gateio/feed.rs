//! Gate.io WebSocket session.
//!
//! One [`GateioFeed`] is one connection. The stream driver asks the
//! [`GateioConnector`] for a fresh feed on every reconnect, so no state
//! survives a dropped socket.
//!
//! With a signer attached the session also subscribes to the private
//! `spot.orders` channel for the pair.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use super::adapter::{adapt_frame, to_wire};
use super::dto::{
    GateioAuth, GateioRequest, CHANNEL_BOOK_UPDATE, CHANNEL_ORDERS, CHANNEL_TRADES,
    EVENT_SUBSCRIBE,
};
use super::settings::GateioConfig;
use super::signer::{GateioSigner, HEADER_KEY, HEADER_SIGN};
use crate::domain::CurrencyPair;
use crate::error::{AdaptError, Error, Result};
use crate::port::outbound::signer::RequestSigner;
use crate::port::{BookFeed, FeedConnector, FeedMessage};

pub const EXCHANGE_NAME: &str = "Gate.io";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

static CRYPTO_PROVIDER: Once = Once::new();

/// rustls needs a process-wide provider before the first TLS handshake.
fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Err means another component already installed one.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Gate.io spot market data session.
pub struct GateioFeed {
    url: String,
    update_interval: String,
    signer: Option<Arc<dyn RequestSigner>>,
    ws: Option<WsStream>,
    /// Rest of a multi-message frame, drained before the socket is read.
    pending: VecDeque<FeedMessage>,
}

impl GateioFeed {
    #[must_use]
    pub fn new(url: impl Into<String>, update_interval: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            update_interval: update_interval.into(),
            signer: None,
            ws: None,
            pending: VecDeque::new(),
        }
    }

    /// Authenticate private channel subscriptions with `signer`.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    fn auth(signer: &dyn RequestSigner, channel: &str, time: i64) -> Result<GateioAuth> {
        let signed = signer.sign(EVENT_SUBSCRIBE, channel, &[("time", time.to_string())])?;
        let header = |name: &str| {
            signed
                .headers
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| AdaptError::malformed("signature", format!("no {name} header")))
        };
        Ok(GateioAuth::api_key(header(HEADER_KEY)?, header(HEADER_SIGN)?))
    }

    async fn send(&mut self, request: &GateioRequest) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;
        let json = serde_json::to_string(request)?;
        ws.send(Message::Text(json)).await?;
        Ok(())
    }
}

#[async_trait]
impl BookFeed for GateioFeed {
    async fn connect(&mut self) -> Result<()> {
        install_crypto_provider();
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, pair: &CurrencyPair) -> Result<()> {
        let symbol = to_wire(pair);
        let now = Utc::now().timestamp();

        let book = GateioRequest::subscribe(
            now,
            CHANNEL_BOOK_UPDATE,
            vec![symbol.clone(), self.update_interval.clone()],
        );
        self.send(&book).await?;

        let trades = GateioRequest::subscribe(now, CHANNEL_TRADES, vec![symbol.clone()]);
        self.send(&trades).await?;

        if let Some(signer) = self.signer.clone() {
            let auth = Self::auth(signer.as_ref(), CHANNEL_ORDERS, now)?;
            let orders =
                GateioRequest::subscribe(now, CHANNEL_ORDERS, vec![symbol.clone()]).with_auth(auth);
            self.send(&orders).await?;
            info!(pair = %symbol, "Subscribed to book updates, trades and own orders");
        } else {
            info!(pair = %symbol, "Subscribed to book updates and trades");
        }
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<FeedMessage>> {
        if let Some(message) = self.pending.pop_front() {
            return Some(Ok(message));
        }
        let ws = self.ws.as_mut()?;

        loop {
            match ws.next().await? {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    match adapt_frame(&text) {
                        Ok(messages) => {
                            let mut messages = messages.into_iter();
                            if let Some(first) = messages.next() {
                                self.pending.extend(messages);
                                return Some(Ok(first));
                            }
                        }
                        Err(e @ (Error::Json(_) | Error::Adapt(_))) => {
                            warn!(error = %e, bytes = text.len(), "Failed to parse message");
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    return None;
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        self.pending.clear();
        if let Some(mut ws) = self.ws.take() {
            if let Err(e) = ws.close(None).await {
                debug!(error = %e, "WebSocket close handshake failed");
            }
        }
    }

    fn exchange_name(&self) -> &'static str {
        EXCHANGE_NAME
    }
}

/// Produces a new [`GateioFeed`] per connection attempt.
#[derive(Clone)]
pub struct GateioConnector {
    url: String,
    update_interval: String,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl GateioConnector {
    #[must_use]
    pub fn new(url: impl Into<String>, update_interval: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            update_interval: update_interval.into(),
            signer: None,
        }
    }

    /// Sessions sign the `spot.orders` subscription when credentials are set.
    #[must_use]
    pub fn from_config(config: &GateioConfig) -> Self {
        let connector = Self::new(config.ws_url.clone(), config.update_interval.clone());
        match &config.credentials {
            Some(credentials) => {
                connector.with_signer(Arc::new(GateioSigner::new(credentials.clone())))
            }
            None => connector,
        }
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.signer.is_some()
    }
}

impl fmt::Debug for GateioConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateioConnector")
            .field("url", &self.url)
            .field("update_interval", &self.update_interval)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl FeedConnector for GateioConnector {
    type Feed = GateioFeed;

    fn create(&self) -> GateioFeed {
        let feed = GateioFeed::new(self.url.clone(), self.update_interval.clone());
        match &self.signer {
            Some(signer) => feed.with_signer(Arc::clone(signer)),
            None => feed,
        }
    }
}
