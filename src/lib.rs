//! Exchange Bridge - one trading API over heterogeneous crypto exchanges.
//!
//! Each exchange publishes its catalog (currencies, pairs, fees, limits,
//! precisions) in its own format. This crate normalizes those payloads into
//! exchange-agnostic domain types, reconciles them with locally maintained
//! static metadata, and keeps live order books for streaming exchanges.
//!
//! # Architecture
//!
//! - **`domain`** - Currencies, pairs, books, trades, orders and metadata
//! - **`port`** - Traits adapters implement: vendor clients, adapters,
//!   signers, streaming feeds and snapshot sources
//! - **`application`** - Metadata reconciliation, exchange lifecycle and the
//!   per-pair order-book synchronizer
//! - **`adapter`** - Latoken (REST) and Gate.io (WebSocket) integrations
//! - **`infrastructure`** - Configuration, static metadata files and the
//!   reconnecting stream hub
//!
//! # Features
//!
//! - `latoken` - Latoken REST exchange (default)
//! - `gateio` - Gate.io streaming order books (default)
//! - `testkit` - Test doubles for integration tests
//!
//! # Example
//!
//! ```no_run
//! use exchange_bridge::adapter::outbound::latoken::LatokenExchange;
//! use exchange_bridge::infrastructure::config::settings::Config;
//! use exchange_bridge::port::Exchange;
//!
//! # async fn run() -> exchange_bridge::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//!
//! let exchange = LatokenExchange::from_config(&config.latoken)?;
//! exchange.initialize().await?;
//! let metadata = exchange.metadata();
//! println!("{} pairs", metadata.currency_pairs.len());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
