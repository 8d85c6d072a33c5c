//! Gate.io frames to normalized feed messages.
//!
//! Gate.io names pairs `BASE_COUNTER` (`BTC_USDT`) everywhere.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::dto::{
    GateioBookUpdate, GateioEnvelope, GateioLevel, GateioOrderBook, GateioOrderUpdate,
    GateioTrade, CHANNEL_BOOK_UPDATE, CHANNEL_ORDERS, CHANNEL_PONG, CHANNEL_TRADES,
};
use crate::domain::{
    CurrencyPair, Order, OrderBook, OrderId, OrderSide, OrderStatus, PriceLevel, Trade,
};
use crate::error::{AdaptError, Error, StreamError};
use crate::port::{BookDelta, BookSnapshot, FeedMessage};

const PAIR_SEPARATOR: &str = "_";

/// Render a pair in Gate.io wire form.
#[must_use]
pub fn to_wire(pair: &CurrencyPair) -> String {
    pair.join(PAIR_SEPARATOR)
}

/// Parse a Gate.io wire pair.
///
/// # Errors
///
/// Returns [`AdaptError`] if the value is not `BASE_COUNTER`.
pub fn from_wire(symbol: &str) -> Result<CurrencyPair, AdaptError> {
    CurrencyPair::split(symbol, PAIR_SEPARATOR)
        .map_err(|e| AdaptError::malformed("pair", e.to_string()))
}

/// Translate one text frame.
///
/// Most frames yield exactly one message; `spot.orders` updates batch
/// several orders and yield one message each. Subscription acks and pongs
/// become [`FeedMessage::Heartbeat`]. A frame carrying a vendor `error`
/// object is a transport-level failure.
///
/// # Errors
///
/// Returns [`Error::Json`] or [`Error::Adapt`] for frames that cannot be
/// interpreted and [`Error::Stream`] for vendor-reported errors.
pub fn adapt_frame(text: &str) -> Result<Vec<FeedMessage>, Error> {
    let envelope: GateioEnvelope = serde_json::from_str(text)?;

    if let Some(err) = envelope.error {
        return Err(StreamError::Transport(format!(
            "{} rejected by Gate.io ({}): {}",
            envelope.channel, err.code, err.message
        ))
        .into());
    }

    if envelope.channel == CHANNEL_PONG || envelope.event.as_deref() != Some("update") {
        return Ok(vec![FeedMessage::Heartbeat]);
    }

    let Some(result) = envelope.result else {
        return Ok(vec![FeedMessage::Heartbeat]);
    };

    match envelope.channel.as_str() {
        CHANNEL_BOOK_UPDATE => {
            let update: GateioBookUpdate = serde_json::from_value(result)?;
            Ok(vec![FeedMessage::Delta(adapt_delta(update)?)])
        }
        CHANNEL_TRADES => {
            let trade: GateioTrade = serde_json::from_value(result)?;
            Ok(vec![FeedMessage::Trade(adapt_trade(trade)?)])
        }
        CHANNEL_ORDERS => {
            let updates: Vec<GateioOrderUpdate> = serde_json::from_value(result)?;
            updates
                .into_iter()
                .map(|update| Ok(FeedMessage::OrderChange(adapt_order(update)?)))
                .collect()
        }
        _ => Ok(vec![FeedMessage::Heartbeat]),
    }
}

/// Translate an incremental book update.
///
/// # Errors
///
/// Returns [`AdaptError`] on a bad pair, inverted id range or timestamp.
pub fn adapt_delta(update: GateioBookUpdate) -> Result<BookDelta, AdaptError> {
    if update.first_update_id > update.last_update_id {
        return Err(AdaptError::malformed(
            "order book update",
            format!("U {} after u {}", update.first_update_id, update.last_update_id),
        ));
    }
    Ok(BookDelta {
        pair: from_wire(&update.s)?,
        first_update_id: update.first_update_id,
        last_update_id: update.last_update_id,
        bids: levels(&update.b),
        asks: levels(&update.a),
        timestamp: update.t.map(|t| millis(t, "order book update")).transpose()?,
    })
}

/// Translate a public trade.
///
/// # Errors
///
/// Returns [`AdaptError`] on a bad pair, side or timestamp.
pub fn adapt_trade(trade: GateioTrade) -> Result<Trade, AdaptError> {
    let side = side("trade", &trade.side)?;
    let ms = trade
        .create_time_ms
        .trunc()
        .to_i64()
        .ok_or_else(|| AdaptError::malformed("trade", "create_time_ms out of range"))?;
    Ok(Trade {
        pair: from_wire(&trade.currency_pair)?,
        id: Some(trade.id.to_string()),
        side,
        price: trade.price,
        amount: trade.amount,
        timestamp: millis(ms, "trade")?,
    })
}

/// Translate a change to one of the account's orders.
///
/// `put` and `update` leave the order open, partially filled once any amount
/// has traded. `finish` closes it: filled when nothing is left, cancelled
/// otherwise, whatever `finish_as` names.
///
/// # Errors
///
/// Returns [`AdaptError`] on a bad pair, side, event or timestamp.
pub fn adapt_order(update: GateioOrderUpdate) -> Result<Order, AdaptError> {
    let filled = (update.amount - update.left).max(Decimal::ZERO);
    let status = match update.event.as_str() {
        "put" | "update" if filled.is_zero() => OrderStatus::New,
        "put" | "update" => OrderStatus::PartiallyFilled,
        "finish" if update.left.is_zero() => OrderStatus::Filled,
        "finish" => OrderStatus::Cancelled,
        other => {
            return Err(AdaptError::malformed("order", format!("unknown event '{other}'")));
        }
    };
    let created_at = match update.create_time_ms {
        Some(ms) => {
            let ms = ms
                .trunc()
                .to_i64()
                .ok_or_else(|| AdaptError::malformed("order", "create_time_ms out of range"))?;
            Some(millis(ms, "order")?)
        }
        None => None,
    };
    Ok(Order {
        id: OrderId::new(update.id),
        pair: from_wire(&update.currency_pair)?,
        side: side("order", &update.side)?,
        price: update.price,
        amount: update.amount,
        filled,
        status,
        created_at,
    })
}

/// Translate a REST snapshot for `pair`.
///
/// # Errors
///
/// Returns [`AdaptError`] if the snapshot time is out of range.
pub fn adapt_snapshot(
    pair: &CurrencyPair,
    book: GateioOrderBook,
) -> Result<BookSnapshot, AdaptError> {
    let mut snapshot = OrderBook::with_levels(pair.clone(), levels(&book.bids), levels(&book.asks));
    if let Some(current) = book.current {
        snapshot = snapshot.at(millis(current, "order book")?);
    }
    Ok(BookSnapshot {
        last_update_id: book.id,
        book: snapshot,
    })
}

fn side(entity: &'static str, raw: &str) -> Result<OrderSide, AdaptError> {
    match raw {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        other => Err(AdaptError::malformed(entity, format!("unknown side '{other}'"))),
    }
}

fn levels(side: &[GateioLevel]) -> Vec<PriceLevel> {
    side.iter()
        .map(|(price, size)| PriceLevel::new(*price, *size))
        .collect()
}

fn millis(ms: i64, entity: &'static str) -> Result<DateTime<Utc>, AdaptError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| AdaptError::malformed(entity, format!("timestamp {ms} out of range")))
}
