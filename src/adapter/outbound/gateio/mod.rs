//! Gate.io exchange integration (WebSocket order books, trades and own orders).

pub mod adapter;
pub mod client;
pub mod dto;
pub mod feed;
pub mod settings;
pub mod signer;

pub use client::GateioClient;
pub use feed::{GateioConnector, GateioFeed};
pub use settings::GateioConfig;
pub use signer::GateioSigner;
