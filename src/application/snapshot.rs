//! Adapting one dynamic vendor snapshot.
//!
//! The pair catalog is built first so that adapters resolving vendor
//! symbols see the complete list of pairs from this same snapshot.

use tracing::{debug, warn};

use crate::domain::{Currency, CurrencyMetaData, CurrencyPair, CurrencyPairMetaData};
use crate::error::AdaptError;
use crate::port::{Adapter, AdapterContext, PairCatalog};

/// Domain entities adapted from one vendor snapshot.
#[derive(Debug, Clone, Default)]
pub struct AdaptedSnapshot {
    /// Pair catalog of this snapshot, for adapting later payloads.
    pub context: AdapterContext,
    pub currencies: Vec<(Currency, CurrencyMetaData)>,
    pub pairs: Vec<(CurrencyPair, CurrencyPairMetaData)>,
    /// Non-critical entities dropped as malformed.
    pub skipped: usize,
}

/// Build the catalog context from a vendor pair list.
///
/// Pairs that fail to adapt are left out here; the main pass decides
/// whether they are fatal.
pub fn build_context<A: Adapter>(adapter: &A, pairs: &[A::Pair]) -> AdapterContext {
    let bootstrap = AdapterContext::default();
    let entries = pairs.iter().filter_map(|vendor| {
        let symbol = adapter.pair_symbol(vendor)?;
        let pair = adapter.adapt_currency_pair(&bootstrap, vendor).ok()?;
        Some((symbol, pair))
    });
    AdapterContext::new(PairCatalog::new(entries))
}

/// Adapt every currency and pair of a snapshot.
///
/// # Errors
///
/// Returns the first [`AdaptError`] raised by an entity the adapter marks
/// critical. Malformed non-critical entities are skipped and counted.
pub fn adapt_snapshot<A: Adapter>(
    adapter: &A,
    currencies: &[A::Currency],
    pairs: &[A::Pair],
) -> Result<AdaptedSnapshot, AdaptError> {
    let context = build_context(adapter, pairs);
    let mut skipped = 0;

    let mut adapted_currencies = Vec::with_capacity(currencies.len());
    for vendor in currencies {
        let adapted = adapter
            .adapt_currency(vendor)
            .and_then(|currency| Ok((currency, adapter.adapt_currency_metadata(vendor)?)));
        match adapted {
            Ok(entry) => adapted_currencies.push(entry),
            Err(err) if !adapter.is_critical_currency(vendor) => {
                warn!(error = %err, "Skipping non-critical currency");
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    let mut adapted_pairs = Vec::with_capacity(pairs.len());
    for vendor in pairs {
        let adapted = adapter
            .adapt_currency_pair(&context, vendor)
            .and_then(|pair| Ok((pair, adapter.adapt_pair_metadata(vendor)?)));
        match adapted {
            Ok(entry) => adapted_pairs.push(entry),
            Err(err) if !adapter.is_critical_pair(vendor) => {
                warn!(error = %err, "Skipping non-critical pair");
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        currencies = adapted_currencies.len(),
        pairs = adapted_pairs.len(),
        catalog = context.catalog().len(),
        skipped,
        "Adapted vendor snapshot"
    );

    Ok(AdaptedSnapshot {
        context,
        currencies: adapted_currencies,
        pairs: adapted_pairs,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::vendor::{TestAdapter, TestCurrency, TestPair};
    use rust_decimal_macros::dec;

    #[test]
    fn adapts_currencies_and_pairs() {
        let adapter = TestAdapter;
        let currencies = vec![TestCurrency::new("btc", 8), TestCurrency::new("usd", 2)];
        let pairs = vec![TestPair::new("BTC", "USD", dec!(0.002), dec!(0.001))];

        let snapshot = adapt_snapshot(&adapter, &currencies, &pairs).unwrap();

        assert_eq!(snapshot.currencies.len(), 2);
        assert_eq!(snapshot.pairs.len(), 1);
        assert_eq!(snapshot.skipped, 0);
        assert!(snapshot.context.catalog().resolve("BTCUSD").is_some());
    }

    #[test]
    fn non_critical_malformed_entity_is_skipped() {
        let adapter = TestAdapter;
        let currencies = vec![
            TestCurrency::new("btc", 8),
            TestCurrency::new("", 8).non_critical(),
        ];

        let snapshot = adapt_snapshot(&adapter, &currencies, &[]).unwrap();

        assert_eq!(snapshot.currencies.len(), 1);
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn critical_malformed_entity_fails_the_batch() {
        let adapter = TestAdapter;
        let pairs = vec![
            TestPair::new("BTC", "USD", dec!(0.002), dec!(0.001)),
            TestPair::new("", "USD", dec!(0.002), dec!(0.001)),
        ];

        let result = adapt_snapshot(&adapter, &[], &pairs);

        assert!(matches!(
            result,
            Err(AdaptError::MalformedVendorData { entity: "pair", .. })
        ));
    }

    #[test]
    fn malformed_pairs_are_left_out_of_the_catalog() {
        let adapter = TestAdapter;
        let pairs = vec![
            TestPair::new("ETH", "BTC", dec!(0.001), dec!(0.01)),
            TestPair::new("", "BTC", dec!(0.001), dec!(0.01)),
        ];

        let context = build_context(&adapter, &pairs);

        assert_eq!(context.catalog().len(), 1);
    }
}
