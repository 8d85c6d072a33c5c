//! In-memory vendor catalog for exercising initialization.
//!
//! [`TestAdapter`] maps [`TestCurrency`] and [`TestPair`] one-to-one onto
//! domain types. An empty code is treated as malformed so tests can inject
//! adapter failures without a real vendor payload.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{Currency, CurrencyMetaData, CurrencyPair, CurrencyPairMetaData};
use crate::error::{AdaptError, Error, VendorError};
use crate::port::{Adapter, AdapterContext, VendorClient};

/// Vendor currency as a test would script it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCurrency {
    pub code: String,
    pub scale: u32,
    pub withdrawal_fee: Option<Decimal>,
    pub critical: bool,
}

impl TestCurrency {
    pub fn new(code: &str, scale: u32) -> Self {
        Self {
            code: code.to_string(),
            scale,
            withdrawal_fee: None,
            critical: true,
        }
    }

    pub fn withdrawal_fee(mut self, fee: Decimal) -> Self {
        self.withdrawal_fee = Some(fee);
        self
    }

    /// Mark the currency as safe to skip when malformed.
    pub fn non_critical(mut self) -> Self {
        self.critical = false;
        self
    }
}

/// Vendor pair as a test would script it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPair {
    pub base: String,
    pub counter: String,
    pub trading_fee: Decimal,
    pub minimum_amount: Decimal,
    pub maximum_amount: Option<Decimal>,
    pub price_scale: u32,
    pub critical: bool,
}

impl TestPair {
    pub fn new(base: &str, counter: &str, trading_fee: Decimal, minimum_amount: Decimal) -> Self {
        Self {
            base: base.to_string(),
            counter: counter.to_string(),
            trading_fee,
            minimum_amount,
            maximum_amount: None,
            price_scale: 1,
            critical: true,
        }
    }

    pub fn maximum_amount(mut self, maximum: Decimal) -> Self {
        self.maximum_amount = Some(maximum);
        self
    }

    pub fn price_scale(mut self, scale: u32) -> Self {
        self.price_scale = scale;
        self
    }

    pub fn non_critical(mut self) -> Self {
        self.critical = false;
        self
    }

    /// Concatenated symbol, e.g. `BTCUSD`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.counter).to_ascii_uppercase()
    }
}

/// Identity adapter for [`TestCurrency`] and [`TestPair`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TestAdapter;

impl Adapter for TestAdapter {
    type Currency = TestCurrency;
    type Pair = TestPair;

    fn pair_symbol(&self, pair: &TestPair) -> Option<String> {
        Some(pair.symbol())
    }

    fn adapt_currency(&self, currency: &TestCurrency) -> Result<Currency, AdaptError> {
        Currency::try_new(&currency.code)
            .map_err(|e| AdaptError::malformed("currency", e.to_string()))
    }

    fn adapt_currency_pair(
        &self,
        _ctx: &AdapterContext,
        pair: &TestPair,
    ) -> Result<CurrencyPair, AdaptError> {
        CurrencyPair::from_codes(&pair.base, &pair.counter)
            .map_err(|e| AdaptError::malformed("pair", e.to_string()))
    }

    fn adapt_currency_metadata(
        &self,
        currency: &TestCurrency,
    ) -> Result<CurrencyMetaData, AdaptError> {
        Ok(CurrencyMetaData::new(currency.scale, currency.withdrawal_fee))
    }

    fn adapt_pair_metadata(&self, pair: &TestPair) -> Result<CurrencyPairMetaData, AdaptError> {
        Ok(CurrencyPairMetaData::new(
            pair.trading_fee,
            pair.minimum_amount,
            pair.maximum_amount,
            pair.price_scale,
        ))
    }

    fn is_critical_currency(&self, currency: &TestCurrency) -> bool {
        currency.critical
    }

    fn is_critical_pair(&self, pair: &TestPair) -> bool {
        pair.critical
    }
}

/// Vendor client serving a fixed catalog.
///
/// A scripted failure is returned once by the next fetch of that kind;
/// later fetches succeed.
pub struct ScriptedVendorClient {
    currencies: Vec<TestCurrency>,
    pairs: Vec<TestPair>,
    currency_failure: Mutex<Option<VendorError>>,
    pair_failure: Mutex<Option<VendorError>>,
    fetch_count: Arc<AtomicU32>,
}

impl ScriptedVendorClient {
    pub fn new(currencies: Vec<TestCurrency>, pairs: Vec<TestPair>) -> Self {
        Self {
            currencies,
            pairs,
            currency_failure: Mutex::new(None),
            pair_failure: Mutex::new(None),
            fetch_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing_currencies(self, error: VendorError) -> Self {
        *self.currency_failure.lock() = Some(error);
        self
    }

    pub fn failing_pairs(self, error: VendorError) -> Self {
        *self.pair_failure.lock() = Some(error);
        self
    }

    /// Total number of fetch calls, currencies and pairs together.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VendorClient for ScriptedVendorClient {
    type Currency = TestCurrency;
    type Pair = TestPair;

    async fn fetch_all_currencies(&self) -> Result<Vec<TestCurrency>, Error> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.currency_failure.lock().take() {
            return Err(err.into());
        }
        Ok(self.currencies.clone())
    }

    async fn fetch_all_pairs(&self) -> Result<Vec<TestPair>, Error> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.pair_failure.lock().take() {
            return Err(err.into());
        }
        Ok(self.pairs.clone())
    }
}
