//! Infrastructure configuration modules.

pub mod credentials;
pub mod http;
pub mod logging;
pub mod settings;
pub mod stream;
