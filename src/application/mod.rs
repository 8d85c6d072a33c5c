//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod book_sync;
pub mod exchange;
pub mod reconcile;
pub mod snapshot;

pub use book_sync::{BookSynchronizer, StreamState, SyncOutcome};
pub use exchange::{ExchangeCore, MarketState};
pub use reconcile::{merge, reconcile_exchange, Reconcile};
pub use snapshot::{adapt_snapshot, AdaptedSnapshot};
