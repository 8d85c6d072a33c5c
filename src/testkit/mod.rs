//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`vendor`] - Scripted vendor catalog: `TestAdapter`, `ScriptedVendorClient`.
//! - [`stream`] - Channel-backed feeds and snapshot sources for the stream hub.

pub mod stream;
pub mod vendor;
