//! Aggregate orders and their stage projections
use shared::prelude::*;

/// Net change to each tranche over one settlement period.
///
/// Every tranche is split into an increase (`*_pos`) and a decrease
/// (`*_neg`) side. Both sides can be non-zero for the same tranche within a
/// single period, and fees are charged on each side independently.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Order {
    /// When the order was placed
    pub timestamp: Timestamp,
    /// Number of account actions folded into this aggregate
    pub orders: u64,
    /// Net collateral change carried with the order
    pub collateral: Fixed6,
    /// Maker increase
    pub maker_pos: UFixed6,
    /// Maker decrease
    pub maker_neg: UFixed6,
    /// Long increase
    pub long_pos: UFixed6,
    /// Long decrease
    pub long_neg: UFixed6,
    /// Short increase
    pub short_pos: UFixed6,
    /// Short decrease
    pub short_neg: UFixed6,
    /// Number of orders that are liquidations
    pub protection: u64,
    /// Maker size placed through a referrer. That share of the maker fee
    /// is owed to referrers.
    pub maker_referral: UFixed6,
    /// Taker size placed through a referrer
    pub taker_referral: UFixed6,
}

impl Order {
    /// `maker_pos + maker_neg`
    pub fn maker_total(&self) -> Result<UFixed6> {
        self.maker_pos.checked_add(self.maker_neg)
    }

    /// Taker size pushing the skew positive: `long_pos + short_neg`.
    pub fn taker_pos(&self) -> Result<UFixed6> {
        self.long_pos.checked_add(self.short_neg)
    }

    /// Taker size pushing the skew negative: `long_neg + short_pos`.
    pub fn taker_neg(&self) -> Result<UFixed6> {
        self.long_neg.checked_add(self.short_pos)
    }

    /// Sum of all four taker sizes.
    pub fn taker_total(&self) -> Result<UFixed6> {
        self.taker_pos()?.checked_add(self.taker_neg()?)
    }

    /// Sum of all six sizes.
    pub fn total(&self) -> Result<UFixed6> {
        self.maker_total()?.checked_add(self.taker_total()?)
    }

    /// No size in any direction.
    pub fn is_empty(&self) -> bool {
        [
            self.maker_pos,
            self.maker_neg,
            self.long_pos,
            self.long_neg,
            self.short_pos,
            self.short_neg,
        ]
        .iter()
        .all(UFixed6::is_zero)
    }

    /// Touches the maker tranche.
    pub fn is_maker(&self) -> bool {
        !self.maker_pos.is_zero() || !self.maker_neg.is_zero()
    }

    /// Touches a taker tranche.
    pub fn is_taker(&self) -> bool {
        !self.long_pos.is_zero()
            || !self.long_neg.is_zero()
            || !self.short_pos.is_zero()
            || !self.short_neg.is_zero()
    }

    /// An order with size must count at least one action, and liquidations
    /// are a subset of those actions.
    pub fn validate(&self) -> Result<()> {
        perp_ensure!(
            self.is_empty() || self.orders > 0,
            PerpError::InvalidOrder {
                reason: "order has size but an order count of zero".to_owned()
            }
        );
        perp_ensure!(
            self.protection <= self.orders || self.orders == 0,
            PerpError::InvalidOrder {
                reason: format!(
                    "{} protected orders exceed the order count of {}",
                    self.protection, self.orders
                )
            }
        );
        Ok(())
    }

    /// Part of the trade fees owed to referrers, in proportion to the
    /// referred share of each side's size.
    pub fn referral_fee(&self, maker_fee: UFixed6, taker_fee: UFixed6) -> Result<UFixed6> {
        let share = |fee: UFixed6, referral: UFixed6, total: UFixed6| {
            if total.is_zero() {
                Ok(UFixed6::zero())
            } else {
                fee.checked_mul_div(referral, total)
            }
        };
        share(maker_fee, self.maker_referral, self.maker_total()?)?.checked_add(share(
            taker_fee,
            self.taker_referral,
            self.taker_total()?,
        )?)
    }

    fn projection(&self) -> Order {
        Order {
            timestamp: self.timestamp,
            ..Order::default()
        }
    }

    /// Only the maker decrease.
    pub fn extract_maker_close(&self) -> Order {
        Order {
            maker_neg: self.maker_neg,
            ..self.projection()
        }
    }

    /// Only the taker sizes that push the skew positive.
    pub fn extract_taker_pos(&self) -> Order {
        Order {
            long_pos: self.long_pos,
            short_neg: self.short_neg,
            ..self.projection()
        }
    }

    /// Only the taker sizes that push the skew negative.
    pub fn extract_taker_neg(&self) -> Order {
        Order {
            long_neg: self.long_neg,
            short_pos: self.short_pos,
            ..self.projection()
        }
    }

    /// Only the maker increase.
    pub fn extract_maker_open(&self) -> Order {
        Order {
            maker_pos: self.maker_pos,
            ..self.projection()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Order {
        Order {
            timestamp: Timestamp::from_seconds(123),
            orders: 6,
            collateral: "-4".parse().unwrap(),
            maker_pos: 1u64.into(),
            maker_neg: 2u64.into(),
            long_pos: 3u64.into(),
            long_neg: 5u64.into(),
            short_pos: 8u64.into(),
            short_neg: 4u64.into(),
            protection: 1,
            maker_referral: "0.1".parse().unwrap(),
            taker_referral: "0.2".parse().unwrap(),
        }
    }

    #[test]
    fn totals() {
        let order = sample();
        assert_eq!(order.maker_total().unwrap(), 3u64.into());
        assert_eq!(order.taker_pos().unwrap(), 7u64.into());
        assert_eq!(order.taker_neg().unwrap(), 13u64.into());
        assert_eq!(order.taker_total().unwrap(), 20u64.into());
        assert_eq!(order.total().unwrap(), 23u64.into());
        assert!(order.is_maker());
        assert!(order.is_taker());
        assert!(!order.is_empty());
        assert!(Order::default().is_empty());
    }

    #[test]
    fn projections_are_disjoint() {
        let order = sample();
        let close = order.extract_maker_close();
        let pos = order.extract_taker_pos();
        let neg = order.extract_taker_neg();
        let open = order.extract_maker_open();

        assert_eq!(close.maker_neg, order.maker_neg);
        assert_eq!(close.total().unwrap(), order.maker_neg);
        assert_eq!(pos.taker_pos().unwrap(), order.taker_pos().unwrap());
        assert_eq!(pos.total().unwrap(), order.taker_pos().unwrap());
        assert_eq!(neg.taker_neg().unwrap(), order.taker_neg().unwrap());
        assert_eq!(neg.total().unwrap(), order.taker_neg().unwrap());
        assert_eq!(open.total().unwrap(), order.maker_pos);

        for projection in [close, pos, neg, open] {
            assert_eq!(projection.orders, 0);
            assert_eq!(projection.protection, 0);
            assert_eq!(projection.collateral, Fixed6::ZERO);
            assert_eq!(projection.maker_referral, UFixed6::zero());
            assert_eq!(projection.taker_referral, UFixed6::zero());
            assert_eq!(projection.timestamp, order.timestamp);
        }
    }

    #[test]
    fn referral_fee() {
        let order = sample();
        let maker_fee = UFixed6::from(8u64);
        let taker_fee = UFixed6::from(3u64);
        // 8·0.1/3 + 3·0.2/20
        assert_eq!(
            order.referral_fee(maker_fee, taker_fee).unwrap(),
            "0.296666".parse().unwrap()
        );
        let referred = Order {
            maker_referral: order.maker_total().unwrap(),
            taker_referral: order.taker_total().unwrap(),
            ..order
        };
        assert_eq!(
            referred.referral_fee(maker_fee, taker_fee).unwrap(),
            UFixed6::from(11u64)
        );

        // Fees without any size behind them owe nothing
        let empty = Order {
            maker_referral: UFixed6::one(),
            ..Order::default()
        };
        assert_eq!(
            empty.referral_fee(maker_fee, taker_fee).unwrap(),
            UFixed6::zero()
        );
    }

    #[test]
    fn validation() {
        sample().validate().unwrap();
        Order::default().validate().unwrap();
        Order {
            orders: 0,
            ..sample()
        }
        .validate()
        .unwrap_err();
        Order {
            protection: 7,
            ..sample()
        }
        .validate()
        .unwrap_err();
    }
}
