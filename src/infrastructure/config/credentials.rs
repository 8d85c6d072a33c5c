//! Exchange API key pairs, loaded only from the environment.

use std::fmt;

/// API key pair. The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read the pair named `env_key` and `env_secret` through `lookup`.
    ///
    /// Both values must be present and non-blank.
    pub fn from_lookup(
        env_key: &str,
        env_secret: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let key = lookup(env_key).filter(|v| !v.trim().is_empty())?;
        let secret = lookup(env_secret).filter(|v| !v.trim().is_empty())?;
        Some(Self::new(key, secret))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
