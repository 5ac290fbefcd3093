use super::Accumulation;
use crate::prelude::*;
use shared::time::SECONDS_PER_YEAR;

impl Accumulation<'_, '_> {
    /// Takers pay interest to makers on the part of the open interest that
    /// makers back, at a rate set by utilization.
    pub(super) fn accumulate_interest(&mut self) -> Result<()> {
        let position = self.ctx.from_position;
        let takers = position.long.checked_add(position.short)?;
        if takers.is_zero() {
            return Ok(());
        }

        let notional = takers
            .min(position.maker)
            .checked_mul(self.ctx.from_oracle_version.price.abs_unsigned())?;
        let rate = self
            .ctx
            .risk_parameter
            .utilization_curve
            .compute(position.utilization()?)?;
        let interest = rate
            .checked_mul(self.elapsed()?.as_ufixed6())?
            .checked_mul_div(notional, UFixed6::from(SECONDS_PER_YEAR))?;

        let fee = interest.checked_mul(self.ctx.market_parameter.interest_fee)?;
        let interest_maker = interest.checked_sub(fee)?.into_signed();
        let long_share = interest.checked_mul_div(position.long, takers)?;
        let interest_long = -long_share.into_signed();
        let interest_short = -interest.checked_sub(long_share)?.into_signed();

        self.next
            .maker_pre_value
            .increment(interest_maker, position.maker)?;
        self.next
            .long_pre_value
            .increment(interest_long, position.long)?;
        self.next
            .short_pre_value
            .increment(interest_short, position.short)?;

        debug_log!(
            DebugLog::Interest,
            "rate {rate}, interest {interest}, fee {fee}"
        );

        self.result.interest_fee = fee;
        self.result.interest_maker = interest_maker;
        self.result.interest_long = interest_long;
        self.result.interest_short = interest_short;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::*;
    use super::*;

    fn interest_fixture(position: Position) -> Fixture {
        let mut fixture = Fixture::new(position);
        fixture.risk.utilization_curve = UtilizationCurve {
            min_rate: ufx("0.1"),
            max_rate: ufx("0.1"),
            target_rate: ufx("0.1"),
            target_utilization: ufx("0.5"),
        };
        fixture.market.interest_fee = ufx("0.02");
        fixture
    }

    #[test]
    fn makers_fully_used() {
        let response = interest_fixture(pos(10, 12, 2)).run().unwrap();
        let result = response.result;
        assert_eq!(result.interest_fee, ufx("0.00028"));
        assert_eq!(result.interest_maker, fx("0.013761"));
        assert_eq!(result.interest_long, fx("-0.012035"));
        assert_eq!(result.interest_short, fx("-0.002006"));

        let version = response.version;
        assert_eq!(version.maker_pre_value.value(), fx("0.001376"));
        assert_eq!(version.long_pre_value.value(), fx("-0.001003"));
        assert_eq!(version.short_pre_value.value(), fx("-0.001003"));
    }

    #[test]
    fn takers_smaller_than_makers() {
        let response = interest_fixture(pos(20, 8, 2)).run().unwrap();
        let result = response.result;
        assert_eq!(result.interest_long, fx("-0.011232"));
        assert_eq!(result.interest_short, fx("-0.002809"));

        let version = response.version;
        assert_eq!(version.maker_pre_value.value(), fx("0.000688"));
        assert_eq!(version.long_pre_value.value(), fx("-0.001404"));
        assert_eq!(version.short_pre_value.value(), fx("-0.001405"));
    }

    #[test]
    fn no_time_no_interest() {
        let mut fixture = interest_fixture(pos(10, 12, 2));
        fixture.to.timestamp = fixture.from.timestamp;
        let start = Version {
            maker_pre_value: Accumulator(fx("0.5")),
            long_pre_value: Accumulator(fx("-0.25")),
            short_pre_value: Accumulator(fx("1")),
            ..Version::default()
        };
        let response = fixture.run_from(&start).unwrap();
        let result = response.result;
        assert_eq!(result.interest_fee, UFixed6::zero());
        assert_eq!(result.interest_maker, Fixed6::ZERO);
        assert_eq!(result.interest_long, Fixed6::ZERO);
        assert_eq!(result.interest_short, Fixed6::ZERO);

        let version = response.version;
        assert_eq!(version.maker_pre_value, start.maker_pre_value);
        assert_eq!(version.long_pre_value, start.long_pre_value);
        assert_eq!(version.short_pre_value, start.short_pre_value);
    }

    #[test]
    fn nothing_without_takers_or_makers() {
        let response = interest_fixture(pos(10, 0, 0)).run().unwrap();
        assert_eq!(response.result.interest_maker, Fixed6::ZERO);
        let response = interest_fixture(pos(0, 5, 3)).run().unwrap();
        assert_eq!(response.result.interest_long, Fixed6::ZERO);
        assert_eq!(response.result.interest_fee, UFixed6::zero());
    }
}
