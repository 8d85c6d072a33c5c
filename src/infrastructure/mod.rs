//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, static metadata files and the streaming
//! runtime.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`metadata`] - Static exchange metadata loading
//! - [`stream`] - Reconnecting upstream tasks and subscriber fan-out

pub mod config;
pub mod metadata;
pub mod stream;
