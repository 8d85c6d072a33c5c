//! Metadata reconciliation.
//!
//! Merges freshly adapted vendor metadata into a previously known table.
//! Vendor values win for authoritative fields; optional fields the vendor
//! omits keep their previous value. Entries are only inserted or replaced,
//! never removed.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use exchange_bridge::application::reconcile::merge;
//! use exchange_bridge::domain::{Currency, CurrencyMetaData};
//! use rust_decimal_macros::dec;
//!
//! let btc = Currency::try_new("BTC").unwrap();
//! let previous = HashMap::from([(btc.clone(), CurrencyMetaData::new(8, Some(dec!(0.0005))))]);
//! let fresh = [(btc.clone(), CurrencyMetaData::new(6, None))];
//!
//! let merged = merge(&previous, fresh);
//! assert_eq!(merged[&btc], CurrencyMetaData::new(6, Some(dec!(0.0005))));
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use crate::domain::{
    Currency, CurrencyMetaData, CurrencyPair, CurrencyPairMetaData, ExchangeMetaData,
};

/// Field-level merge of a fresh metadata entry over a previous one.
pub trait Reconcile: Sized {
    /// Build the merged entry. `self` is the fresh value.
    #[must_use]
    fn reconcile(self, previous: &Self) -> Self;
}

impl Reconcile for CurrencyMetaData {
    fn reconcile(self, previous: &Self) -> Self {
        Self {
            scale: self.scale,
            withdrawal_fee: self.withdrawal_fee.or(previous.withdrawal_fee),
        }
    }
}

impl Reconcile for CurrencyPairMetaData {
    fn reconcile(self, previous: &Self) -> Self {
        Self {
            trading_fee: self.trading_fee,
            minimum_amount: self.minimum_amount,
            maximum_amount: self.maximum_amount.or(previous.maximum_amount),
            price_scale: self.price_scale,
        }
    }
}

/// Merge `fresh` entries into a copy of `previous`.
///
/// Keys only in `previous` are carried over untouched. Each merged entry
/// replaces the previous one as a whole value.
#[must_use]
pub fn merge<K, M>(previous: &HashMap<K, M>, fresh: impl IntoIterator<Item = (K, M)>) -> HashMap<K, M>
where
    K: Eq + Hash + Clone,
    M: Reconcile + Clone,
{
    let mut merged = previous.clone();
    merge_into(&mut merged, fresh);
    merged
}

/// In-place variant of [`merge`] for tables the caller already owns.
pub fn merge_into<K, M>(table: &mut HashMap<K, M>, fresh: impl IntoIterator<Item = (K, M)>)
where
    K: Eq + Hash,
    M: Reconcile,
{
    for (key, entry) in fresh {
        let merged = match table.get(&key) {
            Some(previous) => entry.reconcile(previous),
            None => entry,
        };
        table.insert(key, merged);
    }
}

/// Reconcile a whole exchange table with freshly adapted currencies and pairs.
#[must_use]
pub fn reconcile_exchange(
    previous: &ExchangeMetaData,
    currencies: Vec<(Currency, CurrencyMetaData)>,
    pairs: Vec<(CurrencyPair, CurrencyPairMetaData)>,
) -> ExchangeMetaData {
    ExchangeMetaData::new(
        merge(&previous.currencies, currencies),
        merge(&previous.currency_pairs, pairs),
    )
}
