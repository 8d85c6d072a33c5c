//! Account balances.

use rust_decimal::Decimal;

use super::currency::Currency;

/// Balance of one currency in the trading account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub currency: Currency,
    /// Amount free to trade or withdraw.
    pub available: Decimal,
    /// Amount locked in open orders.
    pub reserved: Decimal,
    /// Amount in pending deposits or withdrawals.
    pub pending: Decimal,
}

impl Balance {
    /// Total balance across all states.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.reserved + self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_sums_all_states() {
        let balance = Balance {
            currency: Currency::try_new("ETH").unwrap(),
            available: dec!(1.5),
            reserved: dec!(0.25),
            pending: dec!(0.05),
        };
        assert_eq!(balance.total(), dec!(1.80));
    }
}
