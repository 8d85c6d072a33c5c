use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to parse static metadata: {0}")]
    Metadata(#[source] serde_json::Error),

    #[error("missing credentials: set {env_key} and {env_secret}")]
    MissingCredentials {
        env_key: &'static str,
        env_secret: &'static str,
    },
}

/// A vendor entity the adapter could not interpret.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdaptError {
    #[error("malformed vendor {entity}: {reason}")]
    MalformedVendorData { entity: &'static str, reason: String },
}

impl AdaptError {
    pub fn malformed(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedVendorData {
            entity,
            reason: reason.into(),
        }
    }
}

/// Failure fetching data from an exchange API.
#[derive(Error, Debug)]
pub enum VendorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode vendor response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("vendor rejected request ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Failure of a single streaming subscription.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream transport failed permanently after {attempts} attempts: {reason}")]
    Unrecoverable { attempts: u32, reason: String },

    #[error("stream transport error: {0}")]
    Transport(String),

    #[error("no stream for unlisted pair {pair}")]
    UnknownPair { pair: String },
}

/// Order rejected locally before reaching the exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("unknown currency pair {pair}")]
    UnknownPair { pair: String },

    #[error("amount {amount} below minimum {minimum} for {pair}")]
    BelowMinimum {
        pair: String,
        amount: rust_decimal::Decimal,
        minimum: rust_decimal::Decimal,
    },

    #[error("amount {amount} above maximum {maximum} for {pair}")]
    AboveMaximum {
        pair: String,
        amount: rust_decimal::Decimal,
        maximum: rust_decimal::Decimal,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Adapt(#[from] AdaptError),

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("failed to initialize {exchange}: {source}")]
    Init {
        exchange: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("{exchange} is not ready for use (initialization {state})")]
    NotReady {
        exchange: &'static str,
        state: &'static str,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an error with the name of the exchange whose initialization it failed.
    pub fn init(exchange: &'static str, source: Error) -> Self {
        Self::Init {
            exchange,
            source: Box::new(source),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Vendor(VendorError::Http(err))
    }
}
