//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  reconcile, book sync   │
//!                    └────────────┬────────────┘
//!                                 │
//!                    ┌────────────┴────────────┐
//!                    ▼                         ▼
//!             ┌─────────────┐           ┌─────────────┐
//!             │   Latoken   │           │   Gate.io   │
//!             │ REST adapter│           │ WS adapter  │
//!             └─────────────┘           └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Exchange`], [`VendorClient`], [`Adapter`] - metadata and catalogs
//! - [`RequestSigner`] - authenticated request signing
//! - [`BookFeed`], [`FeedConnector`], [`SnapshotSource`] - streaming

pub mod outbound;

pub use outbound::exchange::{
    Adapter, AdapterContext, Exchange, InitState, PairCatalog, VendorClient,
};
pub use outbound::signer::{RequestSigner, SignedRequest};
pub use outbound::stream::{
    BookDelta, BookFeed, BookSnapshot, FeedConnector, FeedMessage, SnapshotSource, StreamEvent,
};
