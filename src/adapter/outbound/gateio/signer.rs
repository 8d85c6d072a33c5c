//! HMAC-SHA512 signing of private channel subscriptions.
//!
//! Gate.io authenticates a WebSocket request with the payload
//! `channel=<channel>&event=<event>&time=<seconds>`. The `time` must equal
//! the request frame's own `time` field.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::{ConfigError, Error};
use crate::infrastructure::config::credentials::Credentials;
use crate::port::outbound::signer::{RequestSigner, SignedRequest};

type HmacSha512 = Hmac<Sha512>;

pub const HEADER_KEY: &str = "KEY";
pub const HEADER_SIGN: &str = "SIGN";

/// Gate.io signer bound to one API key pair.
#[derive(Debug, Clone)]
pub struct GateioSigner {
    credentials: Credentials,
}

impl GateioSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign a request to `channel` with an explicit time in seconds.
    pub fn sign_at(&self, channel: &str, event: &str, time: i64) -> Result<SignedRequest, Error> {
        let payload = format!("channel={channel}&event={event}&time={time}");

        let mut mac = HmacSha512::new_from_slice(self.credentials.api_secret.as_bytes())
            .map_err(|e| ConfigError::InvalidValue {
                field: "api_secret",
                reason: e.to_string(),
            })?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedRequest {
            query: payload,
            headers: vec![
                (HEADER_KEY, self.credentials.api_key.clone()),
                (HEADER_SIGN, signature),
            ],
        })
    }
}

impl RequestSigner for GateioSigner {
    /// `method` is the frame's event and `path` its channel. A `time`
    /// parameter, when given, is the frame time to sign.
    fn sign(&self, method: &str, path: &str, params: &[(&str, String)]) -> Result<SignedRequest, Error> {
        let time = match params.iter().find(|(name, _)| *name == "time") {
            Some((_, value)) => value.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                field: "time",
                reason: format!("'{value}' is not a unix timestamp"),
            })?,
            None => Utc::now().timestamp(),
        };
        self.sign_at(path, method, time)
    }

    fn supports_nonce(&self) -> bool {
        false
    }
}
