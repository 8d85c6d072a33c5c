//! Market data, account and trade services bound to initialized metadata.
//!
//! Each handle borrows the exchange client and holds the metadata snapshot
//! current when it was created. A later `initialize()` does not change the
//! snapshot an existing handle sees.

use std::sync::Arc;

use tracing::{debug, info};

use super::adapter::{adapt_side, LatokenAdapter};
use super::client::LatokenClient;
use crate::application::MarketState;
use crate::domain::{
    AmountViolation, Balance, CurrencyPair, LimitOrderRequest, Order, OrderBook, OrderId, Ticker,
    Trade,
};
use crate::error::{OrderError, Result};

fn symbol_for(state: &MarketState, pair: &CurrencyPair) -> Result<String> {
    state
        .context
        .catalog()
        .symbol_of(pair)
        .map(str::to_string)
        .ok_or_else(|| {
            OrderError::UnknownPair {
                pair: pair.to_string(),
            }
            .into()
        })
}

/// Public market data.
pub struct LatokenMarketData<'a> {
    client: &'a LatokenClient,
    state: Arc<MarketState>,
}

impl<'a> LatokenMarketData<'a> {
    pub(super) fn new(client: &'a LatokenClient, state: Arc<MarketState>) -> Self {
        Self { client, state }
    }

    pub async fn order_book(&self, pair: &CurrencyPair, limit: u32) -> Result<OrderBook> {
        let symbol = symbol_for(&self.state, pair)?;
        let dto = self.client.order_book(&symbol, limit).await?;
        Ok(LatokenAdapter::adapt_order_book(&self.state.context, &dto)?)
    }

    pub async fn trades(&self, pair: &CurrencyPair, limit: u32) -> Result<Vec<Trade>> {
        let symbol = symbol_for(&self.state, pair)?;
        let dto = self.client.trades(&symbol, limit).await?;
        Ok(LatokenAdapter::adapt_trades(&self.state.context, &dto)?)
    }

    pub async fn ticker(&self, pair: &CurrencyPair) -> Result<Ticker> {
        let symbol = symbol_for(&self.state, pair)?;
        let dto = self.client.ticker(&symbol).await?;
        Ok(LatokenAdapter::adapt_ticker(&self.state.context, &dto)?)
    }
}

/// Signed account queries.
pub struct LatokenAccount<'a> {
    client: &'a LatokenClient,
}

impl<'a> LatokenAccount<'a> {
    pub(super) fn new(client: &'a LatokenClient) -> Self {
        Self { client }
    }

    pub async fn balances(&self) -> Result<Vec<Balance>> {
        let balances = self
            .client
            .balances()
            .await?
            .iter()
            .map(LatokenAdapter::adapt_balance)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(balances)
    }
}

/// Signed order management.
pub struct LatokenTrade<'a> {
    client: &'a LatokenClient,
    state: Arc<MarketState>,
}

impl<'a> LatokenTrade<'a> {
    pub(super) fn new(client: &'a LatokenClient, state: Arc<MarketState>) -> Self {
        Self { client, state }
    }

    pub async fn open_orders(&self, pair: &CurrencyPair) -> Result<Vec<Order>> {
        let symbol = symbol_for(&self.state, pair)?;
        let orders = self
            .client
            .active_orders(&symbol)
            .await?
            .iter()
            .map(|dto| LatokenAdapter::adapt_order(&self.state.context, dto))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    /// Validate a limit order against the pair's metadata and place it.
    ///
    /// The price is rounded to the pair's price scale before sending.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] without contacting the exchange if the pair is
    /// unknown or the amount is outside its limits.
    pub async fn place_limit_order(&self, request: &LimitOrderRequest) -> Result<OrderId> {
        let (symbol, price) = self.validate(request)?;

        let ack = self
            .client
            .new_limit_order(&symbol, request.side, price, request.amount)
            .await?;
        // Echoed side must round-trip; anything else means the payload changed shape.
        adapt_side(&ack.side, "order")?;

        info!(
            pair = %request.pair,
            side = %request.side,
            %price,
            amount = %request.amount,
            order_id = %ack.order_id,
            "Placed limit order"
        );
        Ok(OrderId::new(ack.order_id))
    }

    pub async fn cancel_order(&self, id: &OrderId) -> Result<()> {
        let ack = self.client.cancel_order(id.as_str()).await?;
        debug!(order_id = %ack.order_id, cancelled = %ack.cancelled_amount, "Cancelled order");
        Ok(())
    }

    /// Symbol and rounded price for a request that passes local checks.
    pub fn validate(&self, request: &LimitOrderRequest) -> Result<(String, rust_decimal::Decimal)> {
        let pair_name = request.pair.to_string();
        let meta = self
            .state
            .metadata
            .pair(&request.pair)
            .ok_or_else(|| OrderError::UnknownPair {
                pair: pair_name.clone(),
            })?;

        meta.check_amount(request.amount).map_err(|violation| match violation {
            AmountViolation::BelowMinimum { minimum } => OrderError::BelowMinimum {
                pair: pair_name.clone(),
                amount: request.amount,
                minimum,
            },
            AmountViolation::AboveMaximum { maximum } => OrderError::AboveMaximum {
                pair: pair_name.clone(),
                amount: request.amount,
                maximum,
            },
        })?;

        let symbol = symbol_for(&self.state, &request.pair)?;
        Ok((symbol, meta.round_price(request.price)))
    }
}
