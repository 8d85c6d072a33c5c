//! Private order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency::CurrencyPair;
use super::error::DomainError;
use super::trade::OrderSide;

/// Unique identifier for an order on an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new OrderId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an order as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::New | Self::PartiallyFilled)
    }
}

/// An order owned by the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub pair: CurrencyPair,
    pub side: OrderSide,
    pub price: Decimal,
    pub amount: Decimal,
    pub filled: Decimal,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        (self.amount - self.filled).max(Decimal::ZERO)
    }
}

/// Request to place a limit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderRequest {
    pub pair: CurrencyPair,
    pub side: OrderSide,
    pub price: Decimal,
    pub amount: Decimal,
}

impl LimitOrderRequest {
    /// Build a request, rejecting non-positive price or amount.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositive`] naming the offending field.
    pub fn try_new(
        pair: CurrencyPair,
        side: OrderSide,
        price: Decimal,
        amount: Decimal,
    ) -> Result<Self, DomainError> {
        if price <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "price",
                value: price,
            });
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "amount",
                value: amount,
            });
        }
        Ok(Self {
            pair,
            side,
            price,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> CurrencyPair {
        CurrencyPair::from_codes("LA", "ETH").unwrap()
    }

    #[test]
    fn limit_request_rejects_zero_amount() {
        let result = LimitOrderRequest::try_new(pair(), OrderSide::Buy, dec!(0.001), dec!(0));
        assert!(matches!(
            result,
            Err(DomainError::NonPositive { field: "amount", .. })
        ));
    }

    #[test]
    fn limit_request_rejects_negative_price() {
        let result = LimitOrderRequest::try_new(pair(), OrderSide::Sell, dec!(-1), dec!(10));
        assert!(matches!(
            result,
            Err(DomainError::NonPositive { field: "price", .. })
        ));
    }

    #[test]
    fn remaining_never_negative() {
        let order = Order {
            id: OrderId::new("1"),
            pair: pair(),
            side: OrderSide::Buy,
            price: dec!(0.001),
            amount: dec!(10),
            filled: dec!(12),
            status: OrderStatus::Filled,
            created_at: None,
        };
        assert_eq!(order.remaining(), Decimal::ZERO);
        assert!(!order.status.is_open());
    }
}
