//! Latoken exchange configuration.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::infrastructure::config::http::HttpConfig;

pub use crate::infrastructure::config::credentials::Credentials;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "LATOKEN_API_KEY";
/// Environment variable holding the API secret.
pub const ENV_API_SECRET: &str = "LATOKEN_API_SECRET";

/// Latoken connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LatokenConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// JSON file with static metadata merged under the dynamic catalog.
    #[serde(default)]
    pub metadata_path: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    /// Loaded from the environment, never from the config file.
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

fn default_api_url() -> String {
    "https://api.latoken.com".into()
}

impl Default for LatokenConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            metadata_path: None,
            http: HttpConfig::default(),
            credentials: None,
        }
    }
}

impl LatokenConfig {
    /// Credentials for signed endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] if none were loaded.
    pub fn require_credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials {
                env_key: ENV_API_KEY,
                env_secret: ENV_API_SECRET,
            })
    }

    /// Read the Latoken key pair through `lookup`.
    pub fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
        Credentials::from_lookup(ENV_API_KEY, ENV_API_SECRET, lookup)
    }
}
