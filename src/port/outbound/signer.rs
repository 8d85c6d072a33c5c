//! Request signing port for authenticated REST endpoints and private
//! WebSocket channels.

use crate::error::Error;

/// Query string and headers to attach to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Encoded query string, without the leading `?`.
    pub query: String,
    pub headers: Vec<(&'static str, String)>,
}

/// Signs authenticated requests for one exchange.
pub trait RequestSigner: Send + Sync {
    /// Sign a request to `path` carrying `params`.
    fn sign(&self, method: &str, path: &str, params: &[(&str, String)]) -> Result<SignedRequest, Error>;

    /// Whether signatures include a sequential nonce.
    fn supports_nonce(&self) -> bool;
}
