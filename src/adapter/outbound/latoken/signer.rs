//! HMAC-SHA256 request signing.
//!
//! Latoken validates requests by signature and a millisecond `timestamp`
//! parameter; there is no nonce. The signed payload is the path followed by
//! `?` and the encoded query, timestamp included.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

use super::settings::Credentials;
use crate::error::{ConfigError, Error};
use crate::port::outbound::signer::{RequestSigner, SignedRequest};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_KEY: &str = "X-LA-KEY";
pub const HEADER_SIGNATURE: &str = "X-LA-SIGNATURE";
pub const HEADER_HASH_TYPE: &str = "X-LA-HASHTYPE";

/// Latoken signer bound to one API key pair.
#[derive(Debug, Clone)]
pub struct LatokenSigner {
    credentials: Credentials,
}

impl LatokenSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign with an explicit timestamp.
    pub fn sign_at(
        &self,
        path: &str,
        params: &[(&str, String)],
        timestamp_ms: i64,
    ) -> Result<SignedRequest, Error> {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in params {
            query.append_pair(name, value);
        }
        query.append_pair("timestamp", &timestamp_ms.to_string());
        let query = query.finish();

        let mut mac = HmacSha256::new_from_slice(self.credentials.api_secret.as_bytes())
            .map_err(|e| ConfigError::InvalidValue {
                field: "api_secret",
                reason: e.to_string(),
            })?;
        mac.update(path.as_bytes());
        mac.update(b"?");
        mac.update(query.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedRequest {
            query,
            headers: vec![
                (HEADER_KEY, self.credentials.api_key.clone()),
                (HEADER_SIGNATURE, signature),
                (HEADER_HASH_TYPE, "HMAC-SHA256".to_string()),
            ],
        })
    }
}

impl RequestSigner for LatokenSigner {
    fn sign(&self, _method: &str, path: &str, params: &[(&str, String)]) -> Result<SignedRequest, Error> {
        self.sign_at(path, params, Utc::now().timestamp_millis())
    }

    fn supports_nonce(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> LatokenSigner {
        LatokenSigner::new(Credentials::new("key", "secret"))
    }

    #[test]
    fn timestamp_is_appended_to_query() {
        let signed = signer()
            .sign_at("/api/v1/Order/active", &[("symbol", "LAETH".into())], 1_555_000_000_000)
            .unwrap();
        assert_eq!(signed.query, "symbol=LAETH&timestamp=1555000000000");
    }

    #[test]
    fn signature_is_hex_hmac_of_path_and_query() {
        let signed = signer().sign_at("/api/v1/Account/balances", &[], 1).unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(b"/api/v1/Account/balances?timestamp=1");
        let expected = hex::encode(mac.finalize().into_bytes());

        let signature = signed
            .headers
            .iter()
            .find(|(name, _)| *name == HEADER_SIGNATURE)
            .map(|(_, value)| value.clone())
            .unwrap();
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn same_input_same_signature() {
        let a = signer().sign_at("/p", &[("a", "1".into())], 7).unwrap();
        let b = signer().sign_at("/p", &[("a", "1".into())], 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn headers_carry_key_and_hash_type() {
        let signed = signer().sign_at("/p", &[], 7).unwrap();
        assert!(signed.headers.contains(&(HEADER_KEY, "key".to_string())));
        assert!(signed.headers.contains(&(HEADER_HASH_TYPE, "HMAC-SHA256".to_string())));
        assert!(!signer().supports_nonce());
    }
}
