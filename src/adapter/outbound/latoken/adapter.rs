//! Latoken payloads to domain types.
//!
//! Latoken names pairs by concatenated codes (`LAETH`) in market and order
//! payloads; those are resolved through the pair catalog of the current
//! initialization cycle.

use chrono::{DateTime, TimeZone, Utc};

use super::dto::{
    is_active_status, LatokenBalance, LatokenCurrency, LatokenLevel, LatokenOrder,
    LatokenOrderBook, LatokenPair, LatokenTicker, LatokenTrade, LatokenTrades,
};
use crate::domain::{
    Balance, Currency, CurrencyMetaData, CurrencyPair, CurrencyPairMetaData, Order, OrderBook,
    OrderId, OrderSide, OrderStatus, PriceLevel, Ticker, Trade,
};
use crate::error::AdaptError;
use crate::port::{Adapter, AdapterContext};

/// Stateless Latoken adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatokenAdapter;

fn required<'a>(
    value: Option<&'a String>,
    entity: &'static str,
    field: &str,
) -> Result<&'a str, AdaptError> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AdaptError::malformed(entity, format!("missing {field}")))
}

fn currency(code: &str, entity: &'static str) -> Result<Currency, AdaptError> {
    Currency::try_new(code).map_err(|e| AdaptError::malformed(entity, e.to_string()))
}

impl Adapter for LatokenAdapter {
    type Currency = LatokenCurrency;
    type Pair = LatokenPair;

    fn pair_symbol(&self, pair: &LatokenPair) -> Option<String> {
        if let Some(symbol) = pair.symbol.as_ref().filter(|s| !s.is_empty()) {
            return Some(symbol.clone());
        }
        Some(format!("{}{}", pair.base_currency.as_ref()?, pair.quoted_currency.as_ref()?))
    }

    fn adapt_currency(&self, vendor: &LatokenCurrency) -> Result<Currency, AdaptError> {
        currency(required(vendor.symbol.as_ref(), "currency", "symbol")?, "currency")
    }

    fn adapt_currency_pair(
        &self,
        _ctx: &AdapterContext,
        vendor: &LatokenPair,
    ) -> Result<CurrencyPair, AdaptError> {
        let base = required(vendor.base_currency.as_ref(), "pair", "baseCurrency")?;
        let counter = required(vendor.quoted_currency.as_ref(), "pair", "quotedCurrency")?;
        Ok(CurrencyPair::new(currency(base, "pair")?, currency(counter, "pair")?))
    }

    fn adapt_currency_metadata(
        &self,
        vendor: &LatokenCurrency,
    ) -> Result<CurrencyMetaData, AdaptError> {
        let scale = vendor
            .precision
            .ok_or_else(|| AdaptError::malformed("currency", "missing precision"))?;
        // Latoken does not publish withdrawal fees.
        Ok(CurrencyMetaData::new(scale, None))
    }

    fn adapt_pair_metadata(&self, vendor: &LatokenPair) -> Result<CurrencyPairMetaData, AdaptError> {
        let trading_fee = vendor
            .taker_fee
            .ok_or_else(|| AdaptError::malformed("pair", "missing takerFee"))?;
        let minimum_amount = vendor
            .min_qty
            .ok_or_else(|| AdaptError::malformed("pair", "missing minQty"))?;
        let price_scale = vendor
            .price_precision
            .ok_or_else(|| AdaptError::malformed("pair", "missing pricePrecision"))?;
        Ok(CurrencyPairMetaData::new(
            trading_fee,
            minimum_amount,
            vendor.max_qty,
            price_scale,
        ))
    }

    fn is_critical_currency(&self, vendor: &LatokenCurrency) -> bool {
        is_active_status(vendor.status.as_deref())
    }

    fn is_critical_pair(&self, vendor: &LatokenPair) -> bool {
        is_active_status(vendor.status.as_deref())
    }
}

impl LatokenAdapter {
    fn resolve(
        ctx: &AdapterContext,
        symbol: Option<&String>,
        entity: &'static str,
    ) -> Result<CurrencyPair, AdaptError> {
        ctx.resolve_symbol(required(symbol, entity, "symbol")?)
    }

    pub fn adapt_order_book(
        ctx: &AdapterContext,
        vendor: &LatokenOrderBook,
    ) -> Result<OrderBook, AdaptError> {
        let pair = Self::resolve(ctx, vendor.symbol.as_ref(), "order book")?;
        Ok(OrderBook::with_levels(pair, levels(&vendor.bids), levels(&vendor.asks)))
    }

    pub fn adapt_trades(ctx: &AdapterContext, vendor: &LatokenTrades) -> Result<Vec<Trade>, AdaptError> {
        let pair = Self::resolve(ctx, vendor.symbol.as_ref(), "trades")?;
        vendor
            .trades
            .iter()
            .map(|trade| Self::adapt_trade(&pair, trade))
            .collect()
    }

    fn adapt_trade(pair: &CurrencyPair, vendor: &LatokenTrade) -> Result<Trade, AdaptError> {
        Ok(Trade {
            pair: pair.clone(),
            id: None,
            side: adapt_side(&vendor.side, "trade")?,
            price: vendor.price,
            amount: vendor.amount,
            timestamp: millis(vendor.timestamp, "trade")?,
        })
    }

    pub fn adapt_ticker(ctx: &AdapterContext, vendor: &LatokenTicker) -> Result<Ticker, AdaptError> {
        let pair = Self::resolve(ctx, vendor.symbol.as_ref(), "ticker")?;
        let last = vendor
            .close
            .ok_or_else(|| AdaptError::malformed("ticker", "missing close"))?;
        Ok(Ticker {
            pair,
            open: vendor.open,
            last,
            high: vendor.high,
            low: vendor.low,
            volume: vendor.volume,
        })
    }

    pub fn adapt_balance(vendor: &LatokenBalance) -> Result<Balance, AdaptError> {
        Ok(Balance {
            currency: currency(required(vendor.symbol.as_ref(), "balance", "symbol")?, "balance")?,
            available: vendor.available,
            reserved: vendor.frozen,
            pending: vendor.pending,
        })
    }

    pub fn adapt_order(ctx: &AdapterContext, vendor: &LatokenOrder) -> Result<Order, AdaptError> {
        let id = required(vendor.order_id.as_ref(), "order", "orderId")?;
        let pair = Self::resolve(ctx, vendor.symbol.as_ref(), "order")?;
        let created_at = vendor
            .time_created
            .map(|ms| millis(ms, "order"))
            .transpose()?;
        Ok(Order {
            id: OrderId::new(id),
            pair,
            side: adapt_side(&vendor.side, "order")?,
            price: vendor.price,
            amount: vendor.amount,
            filled: vendor.executed_amount,
            status: adapt_status(&vendor.order_status)?,
            created_at,
        })
    }
}

/// Latoken side strings, case-insensitive.
pub fn adapt_side(side: &str, entity: &'static str) -> Result<OrderSide, AdaptError> {
    match side.to_ascii_lowercase().as_str() {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        other => Err(AdaptError::malformed(entity, format!("unknown side '{other}'"))),
    }
}

fn adapt_status(status: &str) -> Result<OrderStatus, AdaptError> {
    match status.to_ascii_lowercase().as_str() {
        "active" | "placed" | "new" => Ok(OrderStatus::New),
        "partiallyfilled" | "partially_filled" => Ok(OrderStatus::PartiallyFilled),
        "filled" => Ok(OrderStatus::Filled),
        "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
        "rejected" => Ok(OrderStatus::Rejected),
        other => Err(AdaptError::malformed("order", format!("unknown status '{other}'"))),
    }
}

fn levels(side: &[LatokenLevel]) -> Vec<PriceLevel> {
    side.iter()
        .map(|level| PriceLevel::new(level.price, level.amount))
        .collect()
}

fn millis(ms: i64, entity: &'static str) -> Result<DateTime<Utc>, AdaptError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| AdaptError::malformed(entity, format!("timestamp {ms} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::snapshot::build_context;
    use rust_decimal_macros::dec;

    fn pair_dto(symbol: &str, base: &str, quoted: &str) -> LatokenPair {
        LatokenPair {
            pair_id: Some(1),
            symbol: Some(symbol.into()),
            base_currency: Some(base.into()),
            quoted_currency: Some(quoted.into()),
            maker_fee: Some(dec!(0.001)),
            taker_fee: Some(dec!(0.002)),
            price_precision: Some(6),
            amount_precision: Some(4),
            min_qty: Some(dec!(0.05)),
            max_qty: None,
            status: None,
        }
    }

    fn context() -> AdapterContext {
        build_context(&LatokenAdapter, &[pair_dto("LAETH", "LA", "ETH")])
    }

    #[test]
    fn currency_symbol_is_upper_cased() {
        let dto = LatokenCurrency {
            currency_id: Some(1),
            symbol: Some("la".into()),
            name: Some("Latoken".into()),
            precision: Some(8),
            kind: None,
            status: None,
        };
        assert_eq!(LatokenAdapter.adapt_currency(&dto).unwrap().code(), "LA");
        assert_eq!(
            LatokenAdapter.adapt_currency_metadata(&dto).unwrap(),
            CurrencyMetaData::new(8, None)
        );
    }

    #[test]
    fn pair_metadata_uses_taker_fee_and_min_qty() {
        let mut dto = pair_dto("LAETH", "LA", "ETH");
        dto.max_qty = Some(dec!(1000));
        let meta = LatokenAdapter.adapt_pair_metadata(&dto).unwrap();
        assert_eq!(
            meta,
            CurrencyPairMetaData::new(dec!(0.002), dec!(0.05), Some(dec!(1000)), 6)
        );
    }

    #[test]
    fn missing_quoted_currency_is_malformed() {
        let mut dto = pair_dto("LAETH", "LA", "ETH");
        dto.quoted_currency = None;
        let err = LatokenAdapter
            .adapt_currency_pair(&AdapterContext::default(), &dto)
            .unwrap_err();
        assert!(matches!(err, AdaptError::MalformedVendorData { entity: "pair", .. }));
    }

    #[test]
    fn inactive_entities_are_not_critical() {
        let mut dto = pair_dto("LAETH", "LA", "ETH");
        assert!(LatokenAdapter.is_critical_pair(&dto));
        dto.status = Some("inactive".into());
        assert!(!LatokenAdapter.is_critical_pair(&dto));
    }

    #[test]
    fn order_book_symbol_resolves_through_catalog() {
        let dto = LatokenOrderBook {
            symbol: Some("laeth".into()),
            asks: vec![LatokenLevel {
                price: dec!(0.0021),
                amount: dec!(10),
            }],
            bids: vec![],
        };
        let book = LatokenAdapter::adapt_order_book(&context(), &dto).unwrap();
        assert_eq!(book.pair(), &CurrencyPair::from_codes("LA", "ETH").unwrap());
        assert_eq!(book.best_ask().unwrap().price(), dec!(0.0021));
    }

    #[test]
    fn unknown_symbol_is_malformed() {
        let dto = LatokenTicker {
            symbol: Some("XYZBTC".into()),
            volume: None,
            open: None,
            low: None,
            high: None,
            close: Some(dec!(1)),
        };
        assert!(LatokenAdapter::adapt_ticker(&context(), &dto).is_err());
    }

    #[test]
    fn order_maps_status_and_fill() {
        let dto = LatokenOrder {
            order_id: Some("1555492358.126073.126767@0502:2".into()),
            symbol: Some("LAETH".into()),
            side: "buy".into(),
            order_type: Some("limit".into()),
            price: dec!(0.0015),
            amount: dec!(100),
            executed_amount: dec!(40),
            order_status: "partiallyFilled".into(),
            time_created: Some(1_555_492_358_126),
        };
        let order = LatokenAdapter::adapt_order(&context(), &dto).unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.remaining(), dec!(60));
        assert!(order.created_at.is_some());
    }

    #[test]
    fn unknown_side_is_malformed() {
        assert!(adapt_side("hold", "trade").is_err());
        assert_eq!(adapt_side("SELL", "trade").unwrap(), OrderSide::Sell);
    }
}
