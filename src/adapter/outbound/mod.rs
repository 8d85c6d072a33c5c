//! Outbound adapters (driven side), one module per exchange.

#[cfg(feature = "gateio")]
pub mod gateio;
#[cfg(feature = "latoken")]
pub mod latoken;
