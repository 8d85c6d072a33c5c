//! End-to-end tests of the Latoken exchange against a local HTTP fixture.

mod support;

use std::collections::HashMap;

use exchange_bridge::adapter::outbound::latoken::{
    Credentials, LatokenClient, LatokenConfig, LatokenExchange, LatokenSigner,
};
use exchange_bridge::domain::{
    Currency, CurrencyMetaData, CurrencyPairMetaData, ExchangeMetaData, LimitOrderRequest,
    OrderId, OrderSide, OrderStatus,
};
use exchange_bridge::error::{Error, OrderError, VendorError};
use exchange_bridge::infrastructure::config::http::HttpConfig;
use exchange_bridge::port::{Exchange, InitState};
use rust_decimal_macros::dec;

use support::http::FixtureServer;
use support::pair;

const CURRENCIES: &str = r#"[
    {"currencyId":1,"symbol":"LA","name":"Latoken","precision":8,"type":"ERC20"},
    {"currencyId":2,"symbol":"ETH","name":"Ethereum","precision":18},
    {"currencyId":3,"symbol":"BTC","name":"Bitcoin","precision":6},
    {"currencyId":4,"name":"Nameless","precision":2,"status":"disabled"}
]"#;

const PAIRS: &str = r#"[
    {"pairId":502,"symbol":"LAETH","baseCurrency":"LA","quotedCurrency":"ETH",
     "makerFee":0.001,"takerFee":0.002,"pricePrecision":6,"amountPrecision":8,"minQty":0.05},
    {"pairId":503,"symbol":"BTCETH","baseCurrency":"BTC","quotedCurrency":"ETH",
     "makerFee":0.001,"takerFee":0.001,"amountPrecision":8,"minQty":0.001,"status":"inactive"}
]"#;

fn static_metadata() -> ExchangeMetaData {
    let btc = Currency::try_new("BTC").unwrap();
    ExchangeMetaData::new(
        HashMap::from([(btc, CurrencyMetaData::new(8, Some(dec!(0.0005))))]),
        HashMap::from([(
            pair("LA", "ETH"),
            CurrencyPairMetaData::new(dec!(0.001), dec!(0.01), Some(dec!(100)), 4),
        )]),
    )
}

async fn fixture() -> FixtureServer {
    let server = FixtureServer::start().await;
    server.route("/api/v1/ExchangeInfo/currencies", 200, CURRENCIES);
    server.route("/api/v1/ExchangeInfo/pairs", 200, PAIRS);
    server
}

fn signed_client(server: &FixtureServer) -> LatokenClient {
    LatokenClient::new(server.url())
        .with_signer(LatokenSigner::new(Credentials::new("test-key", "test-secret")))
}

/// Client with the default retry budget and a short timeout.
fn retrying_client(server: &FixtureServer) -> LatokenClient {
    let config = LatokenConfig {
        api_url: server.url().to_string(),
        http: HttpConfig {
            timeout_ms: 200,
            retry_max_attempts: 3,
            retry_backoff_ms: 0,
            ..HttpConfig::default()
        },
        credentials: Some(Credentials::new("test-key", "test-secret")),
        ..LatokenConfig::default()
    };
    LatokenClient::from_config(&config).unwrap()
}

#[tokio::test]
async fn initialize_merges_vendor_catalog_over_static_metadata() {
    let server = fixture().await;
    let exchange = LatokenExchange::new(LatokenClient::new(server.url()), static_metadata());

    exchange.initialize().await.unwrap();

    assert_eq!(exchange.state(), InitState::Ready);
    let metadata = exchange.metadata();
    let btc = Currency::try_new("BTC").unwrap();
    // Fresh precision, preserved withdrawal fee.
    assert_eq!(
        metadata.currency(&btc),
        Some(&CurrencyMetaData::new(6, Some(dec!(0.0005))))
    );
    // Vendor omits maxQty: the static maximum survives.
    assert_eq!(
        metadata.pair(&pair("LA", "ETH")),
        Some(&CurrencyPairMetaData::new(dec!(0.002), dec!(0.05), Some(dec!(100)), 6))
    );
    // Malformed non-critical entities are skipped.
    assert_eq!(metadata.currencies.len(), 3);
    assert!(metadata.pair(&pair("BTC", "ETH")).is_none());
}

#[tokio::test]
async fn vendor_error_fails_initialization_and_keeps_static_table() {
    let server = FixtureServer::start().await;
    server.route(
        "/api/v1/ExchangeInfo/currencies",
        503,
        r#"{"error":{"message":"Service under maintenance","errorType":"Maintenance","statusCode":503}}"#,
    );
    let exchange = LatokenExchange::new(LatokenClient::new(server.url()), static_metadata());

    let err = exchange.initialize().await.unwrap_err();

    match err {
        Error::Init { exchange: "Latoken", source } => assert!(matches!(
            *source,
            Error::Vendor(VendorError::Api { status: 503, ref message })
                if message == "Service under maintenance"
        )),
        other => panic!("expected init error, got {other}"),
    }
    assert_eq!(exchange.state(), InitState::Failed);
    assert_eq!(*exchange.metadata(), static_metadata());
}

#[tokio::test]
async fn market_data_resolves_vendor_symbols() {
    let server = fixture().await;
    server.route(
        "/api/v1/MarketData/orderBook/LAETH/10",
        200,
        r#"{"symbol":"LAETH","asks":[{"price":0.00021,"amount":50},{"price":0.0002,"amount":10}],
            "bids":[{"price":0.00019,"amount":5}]}"#,
    );
    server.route(
        "/api/v1/MarketData/ticker/LAETH",
        200,
        r#"{"symbol":"LAETH","volume":1200,"open":0.00018,"low":0.00017,"high":0.00022,"close":0.0002}"#,
    );
    let exchange = LatokenExchange::new(LatokenClient::new(server.url()), static_metadata());
    exchange.initialize().await.unwrap();

    let market = exchange.market_data().unwrap();
    let book = market.order_book(&pair("LA", "ETH"), 10).await.unwrap();
    let ticker = market.ticker(&pair("LA", "ETH")).await.unwrap();

    assert_eq!(book.pair(), &pair("LA", "ETH"));
    assert_eq!(book.best_ask().unwrap().price(), dec!(0.0002));
    assert_eq!(ticker.last, dec!(0.0002));
    assert!(matches!(
        market.ticker(&pair("XRP", "ETH")).await,
        Err(Error::Order(OrderError::UnknownPair { .. }))
    ));
}

#[tokio::test]
async fn limit_order_is_validated_rounded_and_signed() {
    let server = fixture().await;
    server.route(
        "/api/v1/Order/new",
        200,
        r#"{"orderId":"1555492358.126073.1@0502:1","symbol":"LAETH","side":"buy",
            "price":0.000123,"amount":10}"#,
    );
    let exchange = LatokenExchange::new(signed_client(&server), static_metadata());
    exchange.initialize().await.unwrap();
    let trade = exchange.trade().unwrap();

    let request =
        LimitOrderRequest::try_new(pair("LA", "ETH"), OrderSide::Buy, dec!(0.00012345), dec!(10))
            .unwrap();
    let id = trade.place_limit_order(&request).await.unwrap();

    assert_eq!(id, OrderId::new("1555492358.126073.1@0502:1"));
    let sent = server.requests_to("/api/v1/Order/new");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].query.contains("symbol=LAETH"));
    assert!(sent[0].query.contains("price=0.000123"));
    assert!(sent[0].query.contains("orderType=limit"));
    assert!(sent[0].query.contains("timestamp="));
    assert_eq!(sent[0].header("X-LA-KEY"), Some("test-key"));
    assert_eq!(sent[0].header("X-LA-HASHTYPE"), Some("HMAC-SHA256"));
    assert_eq!(sent[0].header("X-LA-SIGNATURE").map(str::len), Some(64));
}

#[tokio::test]
async fn order_limits_are_enforced_before_sending() {
    let server = fixture().await;
    let exchange = LatokenExchange::new(signed_client(&server), static_metadata());
    exchange.initialize().await.unwrap();
    let trade = exchange.trade().unwrap();

    let too_small =
        LimitOrderRequest::try_new(pair("LA", "ETH"), OrderSide::Sell, dec!(0.0002), dec!(0.01))
            .unwrap();
    let too_large =
        LimitOrderRequest::try_new(pair("LA", "ETH"), OrderSide::Sell, dec!(0.0002), dec!(101))
            .unwrap();

    assert!(matches!(
        trade.place_limit_order(&too_small).await,
        Err(Error::Order(OrderError::BelowMinimum { .. }))
    ));
    assert!(matches!(
        trade.place_limit_order(&too_large).await,
        Err(Error::Order(OrderError::AboveMaximum { .. }))
    ));
    assert!(server.requests_to("/api/v1/Order/new").is_empty());
}

#[tokio::test]
async fn open_orders_and_balances_are_adapted() {
    let server = fixture().await;
    server.route(
        "/api/v1/Order/active",
        200,
        r#"[{"orderId":"42","symbol":"LAETH","side":"sell","orderType":"limit","price":0.0003,
             "amount":20,"executedAmount":5,"orderStatus":"partiallyFilled","timeCreated":1555492358000}]"#,
    );
    server.route(
        "/api/v1/Account/balances",
        200,
        r#"[{"symbol":"ETH","available":1.5,"frozen":0.25,"pending":0}]"#,
    );
    let exchange = LatokenExchange::new(signed_client(&server), static_metadata());
    exchange.initialize().await.unwrap();

    let orders = exchange.trade().unwrap().open_orders(&pair("LA", "ETH")).await.unwrap();
    let balances = exchange.account().unwrap().balances().await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::PartiallyFilled);
    assert_eq!(orders[0].remaining(), dec!(15));
    assert_eq!(balances[0].reserved, dec!(0.25));
    assert!(server.requests_to("/api/v1/Order/active")[0]
        .query
        .contains("symbol=LAETH"));
}

#[tokio::test]
async fn timed_out_order_calls_are_sent_once() {
    let server = FixtureServer::start().await;
    server.stall("/api/v1/Order/new");
    server.stall("/api/v1/Order/cancel");
    let client = retrying_client(&server);

    let placed = client
        .new_limit_order("LAETH", OrderSide::Buy, dec!(1), dec!(1))
        .await;
    let cancelled = client.cancel_order("42").await;

    assert!(matches!(placed, Err(Error::Vendor(VendorError::Http(_)))));
    assert!(matches!(cancelled, Err(Error::Vendor(VendorError::Http(_)))));
    assert_eq!(server.requests_to("/api/v1/Order/new").len(), 1);
    assert_eq!(server.requests_to("/api/v1/Order/cancel").len(), 1);
}

#[tokio::test]
async fn timed_out_reads_are_retried() {
    let server = FixtureServer::start().await;
    server.stall("/api/v1/Account/balances");
    let client = retrying_client(&server);

    assert!(client.balances().await.is_err());
    assert_eq!(server.requests_to("/api/v1/Account/balances").len(), 3);
}
