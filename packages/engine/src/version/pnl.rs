use super::fees::adiabatic_cost;
use super::Accumulation;
use crate::prelude::*;

impl Accumulation<'_, '_> {
    /// Revaluation of the skew already sitting on the adiabatic curve.
    pub(super) fn accumulate_adiabatic_exposure(&mut self) -> Result<()> {
        let position = self.ctx.from_position;
        let exposure = adiabatic_cost(
            &self.ctx.market_parameter.taker_fee,
            Fixed6::ZERO,
            position.skew()?,
            self.price_change()?,
        )?;

        if position.maker.is_zero() {
            self.result.adiabatic_exposure_market = -exposure;
            self.global.exposure = self.global.exposure.checked_sub(exposure)?;
        } else {
            self.next
                .maker_pre_value
                .decrement(exposure, position.maker)?;
            self.result.adiabatic_exposure_maker = -exposure;
        }
        self.result.adiabatic_exposure = exposure;
        Ok(())
    }

    /// Price pnl on each tranche's socialized exposure.
    pub(super) fn accumulate_pnl(&mut self) -> Result<()> {
        let position = self.ctx.from_position;
        let exposure = position.exposure()?;
        let change = self.price_change()?;

        let pnl_long = change.checked_mul(exposure.long)?;
        let pnl_short = change.checked_mul(exposure.short)?;
        let pnl_maker = -pnl_long.checked_add(pnl_short)?;

        self.next.maker_pre_value.increment(pnl_maker, position.maker)?;
        self.next.long_pre_value.increment(pnl_long, position.long)?;
        self.next.short_pre_value.increment(pnl_short, position.short)?;

        self.result.pnl_maker = pnl_maker;
        self.result.pnl_long = pnl_long;
        self.result.pnl_short = pnl_short;
        Ok(())
    }

    fn price_change(&self) -> Result<Fixed6> {
        self.ctx
            .to_oracle_version
            .price
            .checked_sub(self.ctx.from_oracle_version.price)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::*;
    use super::*;

    fn pnl(position: Position) -> VersionAccumulationResponse {
        let mut fixture = Fixture::new(position);
        fixture.to.price = fx("125");
        fixture.run().unwrap()
    }

    #[test]
    fn balanced() {
        let result = pnl(pos(10, 9, 9)).result;
        assert_eq!(result.pnl_maker, Fixed6::ZERO);
        assert_eq!(result.pnl_long, fx("18"));
        assert_eq!(result.pnl_short, fx("-18"));
    }

    #[test]
    fn makers_take_the_skew() {
        let response = pnl(pos(10, 2, 9));
        assert_eq!(response.result.pnl_maker, fx("14"));
        assert_eq!(response.result.pnl_long, fx("4"));
        assert_eq!(response.result.pnl_short, fx("-18"));
        assert_eq!(response.version.maker_pre_value.value(), fx("1.4"));
        assert_eq!(response.version.long_pre_value.value(), fx("2"));
        assert_eq!(response.version.short_pre_value.value(), fx("-2"));
    }

    #[test]
    fn major_side_socialized() {
        let result = pnl(pos(5, 20, 15)).result;
        assert_eq!(result.pnl_maker, fx("-10"));
        assert_eq!(result.pnl_long, fx("40"));
        assert_eq!(result.pnl_short, fx("-30"));
    }

    #[test]
    fn adiabatic_exposure() {
        let mut fixture = Fixture::new(pos(10, 30, 10));
        fixture.to.price = fx("125");
        fixture.market.taker_fee = FeeCurve {
            adiabatic: ufx("0.1"),
            scale: "100".parse().unwrap(),
            ..FeeCurve::default()
        };
        let response = fixture.run().unwrap();
        // 0.1 · 20² / 200 · 2
        assert_eq!(response.result.adiabatic_exposure, fx("0.4"));
        assert_eq!(response.result.adiabatic_exposure_maker, fx("-0.4"));
        assert_eq!(response.result.adiabatic_exposure_market, Fixed6::ZERO);
        // -0.04 of exposure on top of -2 of pnl per maker
        assert_eq!(response.version.maker_pre_value.value(), fx("-2.04"));

        fixture.position = pos(0, 30, 10);
        let response = fixture.run().unwrap();
        assert_eq!(response.result.adiabatic_exposure_market, fx("-0.4"));
        assert_eq!(response.global.exposure, fx("-0.4"));
    }
}
