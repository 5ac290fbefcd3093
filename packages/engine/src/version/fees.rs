use super::Accumulation;
use crate::matching::{exposure_weighted, match_order};
use crate::prelude::*;

impl Accumulation<'_, '_> {
    /// Share the oracle's settlement fee between every order that did not
    /// prepay it through a guarantee.
    pub(super) fn accumulate_settlement_fee(&mut self) -> Result<()> {
        let order = self.ctx.order;
        let guarantee = self.ctx.guarantee;
        let divisor = order
            .orders
            .checked_sub(guarantee.orders)
            .ok_or_else(|| {
                perp_anyhow!(PerpError::InvalidGuarantee {
                    reason: format!(
                        "{} guaranteed orders exceed the order count of {}",
                        guarantee.orders, order.orders
                    )
                })
            })?;
        if divisor == 0 {
            return Ok(());
        }

        let fee = self.ctx.to_oracle_receipt.settlement_fee;
        self.next
            .settlement_fee
            .decrement(fee.into_signed(), UFixed6::from(divisor))?;
        self.result.settlement_fee = fee;
        Ok(())
    }

    /// Each liquidation pays a multiple of the settlement fee.
    pub(super) fn accumulate_liquidation_fee(&mut self) -> Result<()> {
        let per_liquidation = self
            .ctx
            .to_oracle_receipt
            .settlement_fee
            .checked_mul(self.ctx.risk_parameter.liquidation_fee)?;
        self.next
            .liquidation_fee
            .decrement(per_liquidation.into_signed(), UFixed6::one())?;
        self.result.liquidation_fee =
            per_liquidation.checked_mul(UFixed6::from(self.ctx.order.protection))?;
        Ok(())
    }

    /// Linear, proportional and adiabatic trade fees.
    ///
    /// Guaranteed taker size that was exempted from fees is left out of the
    /// taker charge. The adiabatic fee goes to the makers that stay open
    /// through the period, or to the market when there are none.
    pub(super) fn accumulate_trade_fee(&mut self) -> Result<()> {
        let order = self.ctx.order;
        let guarantee = self.ctx.guarantee;
        let market = self.ctx.market_parameter;
        let price = self.ctx.to_oracle_version.price.abs_unsigned();

        let maker_total = order.maker_total()?;
        let maker_fee = linear_fee(&market.maker_fee, maker_total, price)?
            .checked_add(proportional_fee(&market.maker_fee, maker_total, price)?)?;

        let taker_total = order.taker_total()?;
        let chargeable = taker_total
            .checked_sub(guarantee.taker_fee)
            .context("guarantee fee exemption exceeds taker size")?;
        let (chargeable_pos, chargeable_neg) = if taker_total.is_zero() {
            (UFixed6::zero(), UFixed6::zero())
        } else {
            let pos = chargeable.checked_mul_div(order.taker_pos()?, taker_total)?;
            (pos, chargeable.checked_sub(pos)?)
        };
        let taker_fee = linear_fee(&market.taker_fee, chargeable, price)?
            .checked_add(proportional_fee(&market.taker_fee, chargeable_pos, price)?)?
            .checked_add(proportional_fee(&market.taker_fee, chargeable_neg, price)?)?;

        let skew = self.ctx.from_position.skew()?;
        let adiabatic = adiabatic_cost(
            &market.taker_fee,
            skew,
            skew.checked_add(chargeable_pos.into_signed())?
                .checked_sub(chargeable_neg.into_signed())?,
            price.into_signed(),
        )?;

        self.next
            .maker_fee
            .decrement(maker_fee.into_signed(), maker_total)?;
        self.next.taker_fee.decrement(
            taker_fee.into_signed().checked_add(adiabatic)?,
            chargeable,
        )?;

        let makers = self
            .ctx
            .from_position
            .maker
            .checked_sub(order.maker_neg)?;
        if makers.is_zero() {
            self.global.exposure = self.global.exposure.checked_add(adiabatic)?;
        } else {
            self.next.maker_close_value.increment(adiabatic, makers)?;
        }

        self.result.trade_fee = maker_fee.checked_add(taker_fee)?;
        self.result.subtractive_fee = order.referral_fee(maker_fee, taker_fee)?;
        self.result.adiabatic_fee = adiabatic;
        Ok(())
    }

    /// Run the non-guaranteed part of the order through the synthetic book
    /// and credit the spread to the tranches that took the other side.
    pub(super) fn accumulate_spread(&mut self, matching_order: &Order) -> Result<()> {
        let from = self.ctx.from_position;
        let order = self.ctx.order;
        let matching = match_order(
            from,
            matching_order,
            &self.ctx.market_parameter.syn_book,
            self.ctx.to_oracle_version.price,
        )?;

        let next = &mut self.next;

        // Makers closing pay the position that was open before the period
        next.long_pre_value
            .increment(matching.maker_close.long.into_signed(), from.long)?;
        next.short_pre_value
            .increment(matching.maker_close.short.into_signed(), from.short)?;

        for fill in [matching.taker_pos, matching.taker_neg] {
            next.maker_close_value.increment(
                fill.maker.into_signed(),
                from.maker.checked_sub(order.maker_neg)?,
            )?;
            next.long_close_value.increment(
                fill.long.into_signed(),
                from.long.checked_sub(order.long_neg)?,
            )?;
            next.short_close_value.increment(
                fill.short.into_signed(),
                from.short.checked_sub(order.short_neg)?,
            )?;
        }

        // Makers opening pay the position that is open after the period
        next.long_post_value
            .increment(matching.maker_open.long.into_signed(), self.to_position.long)?;
        next.short_post_value.increment(
            matching.maker_open.short.into_signed(),
            self.to_position.short,
        )?;

        let (exposure_pos, exposure_neg) = exposure_weighted(matching_order, next)?;
        next.spread_pos
            .decrement(matching.spread_pos.into_signed(), exposure_pos)?;
        next.spread_neg
            .decrement(matching.spread_neg.into_signed(), exposure_neg)?;

        self.result.spread_pos = matching.spread_pos;
        self.result.spread_neg = matching.spread_neg;
        self.result.spread_maker = matching.received(Tranche::Maker)?;
        self.result.spread_long = matching.received(Tranche::Long)?;
        self.result.spread_short = matching.received(Tranche::Short)?;
        Ok(())
    }
}

fn linear_fee(curve: &FeeCurve, size: UFixed6, price: UFixed6) -> Result<UFixed6> {
    size.checked_mul(curve.linear)?.checked_mul(price)
}

/// Fee rate grows with the size of the trade relative to the curve's scale.
fn proportional_fee(curve: &FeeCurve, size: UFixed6, price: UFixed6) -> Result<UFixed6> {
    size.checked_mul(curve.proportional)?
        .checked_mul(price)?
        .checked_mul_div(size, curve.scale.raw())
}

/// `adiabatic · (to² − from²) / (2 · scale) · price`
///
/// Positive when the skew moves away from zero. With `from` at zero this is
/// the value the current skew has accumulated on the adiabatic curve.
pub(super) fn adiabatic_cost(
    curve: &FeeCurve,
    from: Fixed6,
    to: Fixed6,
    price: Fixed6,
) -> Result<Fixed6> {
    let from = from.into_number();
    let to = to.into_number();
    let area = to.checked_mul(to)?.checked_sub(from.checked_mul(from)?)?;
    let cost = area
        .checked_mul(curve.adiabatic.into_signed().into_number())?
        .checked_mul(price.into_number())?
        .checked_div(curve.scale.into_number().checked_mul(Number::from(2u64))?)?;
    Ok(Fixed6::from_number(cost))
}
