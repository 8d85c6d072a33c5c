//! Latoken REST payloads.
//!
//! Identifying fields are optional here so that a missing value surfaces as
//! malformed vendor data from the adapter instead of failing the decode of a
//! whole list.
//!
//! Example pair:
//! ```json
//! {"pairId":502,"symbol":"LAETH","baseCurrency":"LA","quotedCurrency":"ETH",
//!  "makerFee":0.001,"takerFee":0.001,"pricePrecision":8,"amountPrecision":8,"minQty":0.05}
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenCurrency {
    pub currency_id: Option<i64>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub precision: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenPair {
    pub pair_id: Option<i64>,
    pub symbol: Option<String>,
    pub base_currency: Option<String>,
    pub quoted_currency: Option<String>,
    pub maker_fee: Option<Decimal>,
    pub taker_fee: Option<Decimal>,
    pub price_precision: Option<u32>,
    pub amount_precision: Option<u32>,
    pub min_qty: Option<Decimal>,
    pub max_qty: Option<Decimal>,
    pub status: Option<String>,
}

/// Whether a vendor `status` marks an entity as tradable. Absent means active.
#[must_use]
pub fn is_active_status(status: Option<&str>) -> bool {
    status.map_or(true, |s| s.eq_ignore_ascii_case("active"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenOrderBook {
    pub symbol: Option<String>,
    #[serde(default)]
    pub asks: Vec<LatokenLevel>,
    #[serde(default)]
    pub bids: Vec<LatokenLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatokenLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenTrades {
    pub symbol: Option<String>,
    #[serde(default)]
    pub trades: Vec<LatokenTrade>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatokenTrade {
    pub side: String,
    pub price: Decimal,
    pub amount: Decimal,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenTicker {
    pub symbol: Option<String>,
    pub volume: Option<Decimal>,
    pub open: Option<Decimal>,
    pub low: Option<Decimal>,
    pub high: Option<Decimal>,
    pub close: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenBalance {
    pub symbol: Option<String>,
    #[serde(default)]
    pub available: Decimal,
    #[serde(default)]
    pub frozen: Decimal,
    #[serde(default)]
    pub pending: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenOrder {
    pub order_id: Option<String>,
    pub symbol: Option<String>,
    pub side: String,
    pub order_type: Option<String>,
    pub price: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub executed_amount: Decimal,
    pub order_status: String,
    /// Milliseconds since the epoch.
    pub time_created: Option<i64>,
}

/// Acknowledgement of a new order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenNewOrder {
    pub order_id: String,
    pub symbol: Option<String>,
    pub side: String,
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenCancelledOrder {
    pub order_id: String,
    #[serde(default)]
    pub cancelled_amount: Decimal,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct LatokenErrorBody {
    pub error: LatokenErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatokenErrorDetail {
    pub message: String,
    pub error_type: Option<String>,
    pub status_code: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pair_decodes_numeric_fields() {
        let json = r#"{"pairId":502,"symbol":"LAETH","baseCurrency":"LA","quotedCurrency":"ETH",
            "makerFee":0.001,"takerFee":0.002,"pricePrecision":8,"amountPrecision":8,"minQty":0.05}"#;
        let pair: LatokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.taker_fee, Some(dec!(0.002)));
        assert_eq!(pair.min_qty, Some(dec!(0.05)));
        assert_eq!(pair.max_qty, None);
        assert_eq!(pair.price_precision, Some(8));
    }

    #[test]
    fn currency_without_symbol_still_decodes() {
        let json = r#"{"currencyId":1,"name":"Latoken","precision":8,"type":"ERC20"}"#;
        let currency: LatokenCurrency = serde_json::from_str(json).unwrap();
        assert!(currency.symbol.is_none());
        assert_eq!(currency.kind.as_deref(), Some("ERC20"));
    }

    #[test]
    fn status_absent_or_active_is_active() {
        assert!(is_active_status(None));
        assert!(is_active_status(Some("ACTIVE")));
        assert!(!is_active_status(Some("disabled")));
    }

    #[test]
    fn error_envelope_decodes() {
        let json = r#"{"error":{"message":"Pair not found","errorType":"NotFound","statusCode":404}}"#;
        let body: LatokenErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.message, "Pair not found");
        assert_eq!(body.error.status_code, Some(404));
    }
}
