//! Settlement of a single account against accumulated versions
use crate::matching::exposure_weighted;
use crate::prelude::*;

/// Per-account settlement on top of the market's [Version]s.
pub trait CheckpointExt: Sized {
    /// Amounts owed to or by an account holding `position` that placed
    /// `order` during the period ending at `to`.
    fn accumulate(
        position: &Position,
        order: &Order,
        guarantee: &Guarantee,
        from: &Version,
        to: &Version,
    ) -> Result<CheckpointAccumulationResult>;

    /// Value accrued by `position` across any number of versions without
    /// orders.
    fn accrue_idle(position: &Position, from: &Version, to: &Version) -> Result<Fixed6>;

    /// Settle the account's next period and return its new checkpoint.
    fn settle(
        &self,
        order: &Order,
        guarantee: &Guarantee,
        from: &Version,
        to: &Version,
        timestamp: Timestamp,
    ) -> Result<(Self, CheckpointAccumulationResult)>;
}

impl CheckpointExt for Checkpoint {
    fn accumulate(
        position: &Position,
        order: &Order,
        guarantee: &Guarantee,
        from: &Version,
        to: &Version,
    ) -> Result<CheckpointAccumulationResult> {
        let matching_order = guarantee.matching_order(order)?;
        let end = position.apply(order)?;

        let value_terms = [
            (from.maker_pre_value, to.maker_pre_value, position.maker),
            (from.long_pre_value, to.long_pre_value, position.long),
            (from.short_pre_value, to.short_pre_value, position.short),
            (
                from.maker_close_value,
                to.maker_close_value,
                position.maker.checked_sub(order.maker_neg)?,
            ),
            (
                from.long_close_value,
                to.long_close_value,
                position.long.checked_sub(order.long_neg)?,
            ),
            (
                from.short_close_value,
                to.short_close_value,
                position.short.checked_sub(order.short_neg)?,
            ),
            (from.long_post_value, to.long_post_value, end.long),
            (from.short_post_value, to.short_post_value, end.short),
        ];
        let collateral = value_terms
            .into_iter()
            .try_fold(Fixed6::ZERO, |total, (from, to, size)| {
                total.checked_add(Accumulator::accumulated(from, to, size)?)
            })?;

        let maker_total = order.maker_total()?;
        let taker_total = order.taker_total()?;
        let chargeable = taker_total.checked_sub(guarantee.taker_fee)?;
        let maker_fee = charge(to.maker_fee, maker_total)?;
        let taker_fee = charge(to.taker_fee, chargeable)?;
        let trade_fee = maker_fee.checked_add(taker_fee)?;

        let (exposure_pos, exposure_neg) = exposure_weighted(&matching_order, to)?;
        let spread = charge(to.spread_pos, exposure_pos)?
            .checked_add(charge(to.spread_neg, exposure_neg)?)?;

        let unguaranteed = order.orders.saturating_sub(guarantee.orders);
        let settlement_fee = charge(to.settlement_fee, UFixed6::from(unguaranteed))?
            .max_zero()
            .abs_unsigned();
        let liquidation_fee = if order.protection > 0 {
            charge(to.liquidation_fee, UFixed6::one())?
                .max_zero()
                .abs_unsigned()
        } else {
            UFixed6::zero()
        };

        let subtractive_fee = order
            .referral_fee(
                maker_fee.max_zero().abs_unsigned(),
                taker_fee.max_zero().abs_unsigned(),
            )?
            .checked_add(guarantee.referral)?;

        let result = CheckpointAccumulationResult {
            collateral,
            price_override: guarantee.price_adjustment(to.price)?,
            trade_fee,
            spread,
            settlement_fee,
            liquidation_fee,
            subtractive_fee,
        };
        debug_log!(DebugLog::Checkpoint, "{position:?} + {order:?}: {result:?}");
        Ok(result)
    }

    fn accrue_idle(position: &Position, from: &Version, to: &Version) -> Result<Fixed6> {
        Ok(Self::accumulate(
            position,
            &Order::default(),
            &Guarantee::default(),
            from,
            to,
        )?
        .collateral)
    }

    fn settle(
        &self,
        order: &Order,
        guarantee: &Guarantee,
        from: &Version,
        to: &Version,
        timestamp: Timestamp,
    ) -> Result<(Self, CheckpointAccumulationResult)> {
        let result = Self::accumulate(&self.position, order, guarantee, from, to)?;
        let checkpoint = Checkpoint {
            timestamp,
            position: self.position.apply(order)?,
            collateral: self
                .collateral
                .checked_add(order.collateral)?
                .checked_add(result.net()?)?,
            trade_fee: result.trade_fee.checked_add(result.spread)?,
            settlement_fee: result.settlement_fee.checked_add(result.liquidation_fee)?,
        };
        Ok((checkpoint, result))
    }
}

/// What `size` units pay at a per-unit charge that is stored negative.
fn charge(value: Accumulator, size: UFixed6) -> Result<Fixed6> {
    (-value.value()).checked_mul(size.into_signed())
}
