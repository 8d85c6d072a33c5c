//! Streaming runtime: reconnecting upstream tasks and subscriber fan-out.

pub mod backoff;
mod driver;
pub mod hub;

pub use backoff::Backoff;
pub use hub::{StreamHub, Subscription};
