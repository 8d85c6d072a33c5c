//! Static exchange metadata files.
//!
//! Format:
//! ```json
//! {
//!   "currencies": { "BTC": { "scale": 8, "withdrawal_fee": "0.0005" } },
//!   "currency_pairs": {
//!     "BTC/USD": { "trading_fee": "0.002", "minimum_amount": "0.001",
//!                  "maximum_amount": "100", "price_scale": 2 }
//!   }
//! }
//! ```

use std::path::Path;

use tracing::debug;

use crate::domain::ExchangeMetaData;
use crate::error::{ConfigError, Result};

impl ExchangeMetaData {
    /// Parse a static metadata table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Metadata`] on malformed JSON or invalid codes.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content).map_err(ConfigError::Metadata)?)
    }

    /// Load a static metadata table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] or [`ConfigError::Metadata`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let table = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            currencies = table.currencies.len(),
            pairs = table.currency_pairs.len(),
            "Loaded static exchange metadata"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, CurrencyPair};
    use crate::error::Error;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const TABLE: &str = r#"{
        "currencies": { "BTC": { "scale": 8, "withdrawal_fee": "0.0005" } },
        "currency_pairs": {
            "BTC/USD": { "trading_fee": "0.002", "minimum_amount": "0.001",
                         "maximum_amount": "100", "price_scale": 2 }
        }
    }"#;

    #[test]
    fn loads_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let table = ExchangeMetaData::load(file.path()).unwrap();

        let btc = Currency::try_new("BTC").unwrap();
        assert_eq!(table.currency(&btc).unwrap().withdrawal_fee, Some(dec!(0.0005)));
        let pair = CurrencyPair::from_codes("BTC", "USD").unwrap();
        assert_eq!(table.pair(&pair).unwrap().maximum_amount, Some(dec!(100)));
    }

    #[test]
    fn empty_object_is_empty_table() {
        assert!(ExchangeMetaData::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_metadata_error() {
        let err = ExchangeMetaData::from_json("{\"currencies\": 3}").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Metadata(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ExchangeMetaData::load("/nonexistent/metadata.json").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
    }
}
