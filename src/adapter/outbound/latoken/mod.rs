//! Latoken exchange integration (REST).

pub mod adapter;
pub mod client;
pub mod dto;
pub mod exchange;
pub mod service;
pub mod settings;
pub mod signer;

pub use adapter::LatokenAdapter;
pub use client::LatokenClient;
pub use exchange::LatokenExchange;
pub use settings::{Credentials, LatokenConfig};
pub use signer::LatokenSigner;
