use super::Accumulation;
use crate::prelude::*;
use shared::time::SECONDS_PER_YEAR;

impl Accumulation<'_, '_> {
    /// Funding between takers, with makers backing the socialized part of
    /// the major side.
    pub(super) fn accumulate_funding(&mut self) -> Result<()> {
        let position = self.ctx.from_position;
        let risk = self.ctx.risk_parameter;
        let elapsed = self.elapsed()?;

        let (rate, rate_time) =
            p_controller_accumulate(&risk.p_controller, self.global.p_accumulator, elapsed)?;
        self.global.p_accumulator = PAccumulator {
            value: rate,
            skew: self.next_skew()?,
        };

        let notional = position
            .taker_socialized()?
            .checked_mul(self.ctx.from_oracle_version.price.abs_unsigned())?;
        let mut funding = rate_time.checked_mul_div(
            notional.into_signed(),
            UFixed6::from(SECONDS_PER_YEAR).into_signed(),
        )?;
        if risk.maker_receive_only {
            let skew = position.skew()?;
            if !funding.is_zero() && funding.is_negative() != skew.is_negative() {
                funding = -funding;
            }
        }

        let fee = funding
            .abs_unsigned()
            .checked_mul(self.ctx.market_parameter.funding_fee)?;
        let half_fee = fee.checked_div(UFixed6::from(2u64))?.into_signed();
        let mut funding_long = (-funding)
            .checked_sub(fee.into_signed())?
            .checked_add(half_fee)?;
        let mut funding_short = funding.checked_sub(half_fee)?;

        let portion = position.socialized_maker_portion()?.into_signed();
        let funding_maker = if position.long > position.short {
            let maker = funding_short.checked_mul(portion)?;
            funding_short = funding_short.checked_sub(maker)?;
            maker
        } else {
            let maker = funding_long.checked_mul(portion)?;
            funding_long = funding_long.checked_sub(maker)?;
            maker
        };

        self.next
            .maker_pre_value
            .increment(funding_maker, position.maker)?;
        self.next
            .long_pre_value
            .increment(funding_long, position.long)?;
        self.next
            .short_pre_value
            .increment(funding_short, position.short)?;

        debug_log!(
            DebugLog::Funding,
            "rate {} -> {rate}, funding {funding}, fee {fee}, maker {funding_maker}, long {funding_long}, short {funding_short}",
            self.ctx.global.p_accumulator.value
        );

        self.result.funding_fee = fee;
        self.result.funding_maker = funding_maker;
        self.result.funding_long = funding_long;
        self.result.funding_short = funding_short;
        Ok(())
    }
}

/// Move the funding rate by `elapsed · skew / k` within the controller's
/// bounds.
///
/// Returns the new rate and the rate integrated over the period. Once the
/// rate hits a bound it stays there, so the integral is split at the time
/// the bound was reached.
fn p_controller_accumulate(
    controller: &PController,
    accumulator: PAccumulator,
    elapsed: Duration,
) -> Result<(Fixed6, Fixed6)> {
    let elapsed = elapsed.as_ufixed6().into_signed();
    let k = controller.k.into_signed();
    let two = Fixed6::from(2u64);

    let unbounded = accumulator
        .value
        .checked_add(elapsed.checked_mul_div(accumulator.skew, k)?)?;
    let rate = unbounded.max(controller.min).min(controller.max);

    let rate_time = if rate == unbounded {
        accumulator
            .value
            .checked_add(rate)?
            .checked_mul_div(elapsed, two)?
    } else {
        let to_bound = if accumulator.skew.is_zero() {
            Fixed6::ZERO
        } else {
            rate.checked_sub(accumulator.value)?
                .checked_mul_div(k, accumulator.skew)?
                .max(Fixed6::ZERO)
                .min(elapsed)
        };
        accumulator
            .value
            .checked_add(rate)?
            .checked_mul_div(to_bound, two)?
            .checked_add(rate.checked_mul(elapsed.checked_sub(to_bound)?)?)?
    };

    Ok((rate, rate_time))
}
