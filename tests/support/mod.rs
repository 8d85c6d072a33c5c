#![allow(dead_code)]

pub mod architecture;
pub mod http;

use std::time::Duration;

use exchange_bridge::application::StreamState;
use exchange_bridge::domain::{CurrencyPair, OrderBook};
use exchange_bridge::error::StreamError;
use exchange_bridge::infrastructure::stream::Subscription;
use exchange_bridge::port::StreamEvent;

const WAIT: Duration = Duration::from_secs(2);

pub fn pair(base: &str, counter: &str) -> CurrencyPair {
    CurrencyPair::from_codes(base, counter).expect("valid pair")
}

/// Next item, failing the test if none arrives in time.
pub async fn next_item(sub: &mut Subscription) -> Option<Result<StreamEvent, StreamError>> {
    tokio::time::timeout(WAIT, sub.next_event())
        .await
        .expect("timed out waiting for stream item")
}

/// Next event, which must be a book.
pub async fn next_book(sub: &mut Subscription) -> OrderBook {
    match next_item(sub).await {
        Some(Ok(StreamEvent::Book(book))) => book,
        other => panic!("expected book, got {other:?}"),
    }
}

/// Assert nothing is delivered for a short while.
pub async fn assert_quiet(sub: &mut Subscription) {
    let waited = tokio::time::timeout(Duration::from_millis(100), sub.next_event()).await;
    assert!(waited.is_err(), "expected no event, got {waited:?}");
}

/// Poll `condition` until it holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub async fn wait_for_state(sub: &Subscription, state: StreamState) {
    eventually(|| sub.state() == state).await;
}
