//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe what the core needs from an exchange: catalog
//! fetching, entity adaptation, request signing and streaming sessions.

pub mod exchange;
pub mod signer;
pub mod stream;
