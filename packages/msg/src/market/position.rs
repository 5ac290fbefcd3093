//! Aggregate three-tranche position
use shared::prelude::*;
use shared::storage::StorageRange;

use super::exposure::Exposure;
use super::order::Order;

/// Currently settled size of each tranche.
///
/// Sizes are magnitudes, so a position can never hold a negative tranche.
/// Applying an [Order] that would drive a tranche below zero fails instead.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Position {
    /// Total maker size
    pub maker: UFixed6,
    /// Total long size
    pub long: UFixed6,
    /// Total short size
    pub short: UFixed6,
}

const TRANCHE_RANGE: StorageRange = StorageRange::unsigned(64);

impl Position {
    /// Signed imbalance, `long - short`.
    pub fn skew(&self) -> Result<Fixed6> {
        self.long.into_signed().checked_sub(self.short.into_signed())
    }

    /// Same as [Position::skew].
    pub fn net_exposure(&self) -> Result<Fixed6> {
        self.skew()
    }

    /// The larger of the two taker sides.
    pub fn major(&self) -> UFixed6 {
        self.long.max(self.short)
    }

    /// The smaller of the two taker sides.
    pub fn minor(&self) -> UFixed6 {
        self.long.min(self.short)
    }

    /// Major-side size that is actually backed by the minor side plus makers.
    pub fn taker_socialized(&self) -> Result<UFixed6> {
        Ok(self.major().min(self.minor().checked_add(self.maker)?))
    }

    /// Fraction of the socialized major side that makers are backing.
    pub fn socialized_maker_portion(&self) -> Result<UFixed6> {
        let socialized = self.taker_socialized()?;
        if socialized.is_zero() {
            return Ok(UFixed6::zero());
        }
        socialized
            .checked_sub(self.minor())?
            .checked_div(socialized)
    }

    /// `major / (maker + minor)`, capped at one.
    ///
    /// An empty book reports full utilization, as does a book with takers
    /// on one side and nothing to back them.
    pub fn utilization(&self) -> Result<UFixed6> {
        let backing = self.maker.checked_add(self.minor())?;
        Ok(self.major().unsafe_div(backing).min(UFixed6::one()))
    }

    /// Exposure of each tranche after socialization.
    ///
    /// Makers absorb as much of the skew as their size allows. Whatever they
    /// cannot absorb is cut from the larger taker side, so that side's
    /// exposure is capped at what the other side plus makers can pay.
    pub fn exposure(&self) -> Result<Exposure> {
        let maker = self.maker.into_signed();
        let imbalance = self.short.into_signed().checked_sub(self.long.into_signed())?;
        Ok(Exposure {
            maker: imbalance.clamp(-maker, maker),
            long: self
                .long
                .min(self.maker.checked_add(self.short)?)
                .into_signed(),
            short: -self
                .short
                .min(self.maker.checked_add(self.long)?)
                .into_signed(),
        })
    }

    /// Apply the increase and decrease sides of an order to each tranche.
    pub fn apply(&self, order: &Order) -> Result<Position> {
        fn tranche(name: &str, size: UFixed6, pos: UFixed6, neg: UFixed6) -> Result<UFixed6> {
            let increased = size.checked_add(pos)?;
            if neg > increased {
                perp_bail!(PerpError::InvalidOrder {
                    reason: format!(
                        "closing {neg} {name} would leave a negative tranche (have {increased})"
                    ),
                });
            }
            increased.checked_sub(neg)
        }

        Ok(Position {
            maker: tranche("maker", self.maker, order.maker_pos, order.maker_neg)?,
            long: tranche("long", self.long, order.long_pos, order.long_neg)?,
            short: tranche("short", self.short, order.short_pos, order.short_neg)?,
        })
    }

    /// No size in any tranche.
    pub fn is_empty(&self) -> bool {
        self.maker.is_zero() && self.long.is_zero() && self.short.is_zero()
    }
}

impl StorageRangeCheck for Position {
    fn check_storage_range(&self) -> Result<()> {
        TRANCHE_RANGE.check_ufixed6("position.maker", self.maker)?;
        TRANCHE_RANGE.check_ufixed6("position.long", self.long)?;
        TRANCHE_RANGE.check_ufixed6("position.short", self.short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(maker: u64, long: u64, short: u64) -> Position {
        Position {
            maker: maker.into(),
            long: long.into(),
            short: short.into(),
        }
    }

    fn exposure(maker: i128, long: i128, short: i128) -> Exposure {
        let whole = |x: i128| Fixed6::from_raw(x * 1_000_000);
        Exposure {
            maker: whole(maker),
            long: whole(long),
            short: whole(short),
        }
    }

    #[test]
    fn skew() {
        assert_eq!(pos(10, 10, 10).skew().unwrap(), Fixed6::ZERO);
        assert_eq!(pos(10, 10, 5).skew().unwrap(), "5".parse().unwrap());
        assert_eq!(pos(10, 5, 10).skew().unwrap(), "-5".parse().unwrap());
        assert_eq!(pos(10, 5, 10).net_exposure().unwrap(), "-5".parse().unwrap());
    }

    #[test]
    fn exposure_socialization() {
        assert_eq!(pos(10, 12, 6).exposure().unwrap(), exposure(-6, 12, -6));
        assert_eq!(pos(10, 6, 12).exposure().unwrap(), exposure(6, 6, -12));
        assert_eq!(pos(10, 18, 6).exposure().unwrap(), exposure(-10, 16, -6));
        assert_eq!(pos(10, 6, 18).exposure().unwrap(), exposure(10, 6, -16));
    }

    #[test]
    fn exposure_edges() {
        assert_eq!(pos(0, 0, 0).exposure().unwrap(), Exposure::default());
        assert_eq!(pos(10, 0, 0).exposure().unwrap(), Exposure::default());
        assert_eq!(pos(10, 7, 7).exposure().unwrap(), exposure(0, 7, -7));
        // No makers: only the matched part of the major side is exposed
        assert_eq!(pos(0, 12, 2).exposure().unwrap(), exposure(0, 2, -2));
        assert_eq!(pos(0, 5, 0).exposure().unwrap(), Exposure::default());
    }

    #[test]
    fn apply_order() {
        let order = Order {
            maker_pos: 1u64.into(),
            maker_neg: 2u64.into(),
            long_pos: 3u64.into(),
            long_neg: 5u64.into(),
            short_pos: 8u64.into(),
            short_neg: 4u64.into(),
            orders: 6,
            ..Order::default()
        };
        assert_eq!(pos(10, 6, 12).apply(&order).unwrap(), pos(9, 4, 16));
    }

    #[test]
    fn apply_rejects_negative_tranche() {
        let order = Order {
            long_neg: 7u64.into(),
            orders: 1,
            ..Order::default()
        };
        let err = pos(10, 6, 12).apply(&order).unwrap_err();
        assert_eq!(
            PerpError::try_from_anyhow(&err).unwrap().get_error_id(),
            "invalid_order"
        );
    }

    #[test]
    fn socialization_ratios() {
        let p = pos(10, 12, 8);
        assert_eq!(p.major(), 12u64.into());
        assert_eq!(p.minor(), 8u64.into());
        assert_eq!(p.taker_socialized().unwrap(), 12u64.into());
        assert_eq!(
            p.socialized_maker_portion().unwrap(),
            "0.333333".parse().unwrap()
        );
        assert_eq!(p.utilization().unwrap(), "0.666666".parse().unwrap());

        assert_eq!(pos(2, 12, 8).taker_socialized().unwrap(), 10u64.into());
        assert_eq!(pos(2, 12, 8).utilization().unwrap(), UFixed6::one());
        assert_eq!(pos(0, 0, 0).utilization().unwrap(), UFixed6::one());
        assert_eq!(pos(0, 0, 0).socialized_maker_portion().unwrap(), UFixed6::zero());
        assert_eq!(pos(10, 0, 0).utilization().unwrap(), UFixed6::zero());
    }

    quickcheck::quickcheck! {
        fn exposure_is_bounded(maker: u32, long: u32, short: u32) -> bool {
            let p = pos(maker.into(), long.into(), short.into());
            let e = p.exposure().unwrap();
            e.maker.abs_unsigned() <= p.maker
                && e.long.is_positive_or_zero()
                && e.long.abs_unsigned() <= p.long
                && !e.short.is_strictly_positive()
                && e.short.abs_unsigned() <= p.short
                && p.utilization().unwrap() <= UFixed6::one()
        }

        fn apply_then_reverse(maker: u32, long: u32, short: u32, add: u32, remove: u32) -> bool {
            let p = pos(maker.into(), long.into(), short.into());
            let open = Order {
                orders: 1,
                long_pos: u64::from(add).into(),
                short_neg: u64::from(remove.min(short)).into(),
                ..Order::default()
            };
            let reverse = Order {
                orders: 1,
                long_neg: open.long_pos,
                short_pos: open.short_neg,
                ..Order::default()
            };
            p.apply(&open).unwrap().apply(&reverse).unwrap() == p
        }
    }

    #[test]
    fn storage_range() {
        let max = Position {
            maker: UFixed6::from_raw(u128::from(u64::MAX)),
            ..Position::default()
        };
        max.check_storage_range().unwrap();
        let over = Position {
            long: UFixed6::from_raw(u128::from(u64::MAX) + 1),
            ..Position::default()
        };
        over.check_storage_range().unwrap_err();
    }
}
