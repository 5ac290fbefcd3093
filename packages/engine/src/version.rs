//! Accumulation of one settlement period into a new [Version].
//!
//! [AccumulateVersion::accumulate] is a pure function of its inputs. Every
//! record it touches is copied, updated and returned, so a failure at any
//! step leaves the caller's state exactly as it was.
mod fees;
mod funding;
mod interest;
mod pnl;

use crate::prelude::*;

/// Everything needed to accumulate one period.
#[derive(Clone, Copy, Debug)]
pub struct VersionAccumulationContext<'a> {
    /// Market state before the period
    pub global: &'a Global,
    /// Aggregate position before the period's orders
    pub from_position: &'a Position,
    /// Id of the aggregate order being settled
    pub order_id: u64,
    /// Aggregate order of the period
    pub order: &'a Order,
    /// Aggregate guarantee of the period
    pub guarantee: &'a Guarantee,
    /// Oracle version the period starts at
    pub from_oracle_version: &'a OracleVersion,
    /// Oracle version the period ends at
    pub to_oracle_version: &'a OracleVersion,
    /// Fees charged by the oracle for `to_oracle_version`
    pub to_oracle_receipt: &'a OracleReceipt,
    /// Market parameters in effect
    pub market_parameter: &'a MarketParameter,
    /// Risk parameters in effect
    pub risk_parameter: &'a RiskParameter,
}

/// Records produced by a successful accumulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionAccumulationResponse {
    /// The new version
    pub version: Version,
    /// Updated market state
    pub global: Global,
    /// Every subtotal of the period
    pub result: AccumulationResult,
    /// Aggregate position after the period's orders
    pub to_position: Position,
}

/// Settle a period on top of the previous version.
pub trait AccumulateVersion {
    /// Accumulate the period described by `ctx`.
    fn accumulate(&self, ctx: &VersionAccumulationContext) -> Result<VersionAccumulationResponse>;
}

impl AccumulateVersion for Version {
    fn accumulate(&self, ctx: &VersionAccumulationContext) -> Result<VersionAccumulationResponse> {
        let to = ctx.to_oracle_version;
        let mut acc = Accumulation {
            ctx,
            next: self.next(),
            global: *ctx.global,
            result: AccumulationResult::default(),
            to_position: *ctx.from_position,
        };

        acc.next.valid = to.valid;
        acc.next.price = to.price;
        acc.global.latest_id = ctx.order_id;
        if to.valid {
            acc.global.latest_price = to.price;
        }

        ctx.order.validate()?;
        let matching_order = ctx.guarantee.matching_order(ctx.order)?;
        acc.to_position = ctx.from_position.apply(ctx.order)?;
        acc.record_exposure()?;

        acc.accumulate_settlement_fee()?;
        if to.valid {
            acc.accumulate_liquidation_fee()?;
            acc.accumulate_trade_fee()?;
            acc.accumulate_spread(&matching_order)?;
        }

        if ctx.market_parameter.closed || !to.valid {
            acc.global.p_accumulator.skew = acc.next_skew()?;
        } else {
            acc.accumulate_adiabatic_exposure()?;
            acc.accumulate_funding()?;
            acc.accumulate_interest()?;
            acc.accumulate_pnl()?;
        }

        acc.accumulate_fee_buckets()?;

        debug_log!(
            DebugLog::VersionAccumulate,
            "order {} at {}: valid {}, price {}, {:?}",
            ctx.order_id,
            to.timestamp,
            to.valid,
            to.price,
            acc.result
        );

        Ok(VersionAccumulationResponse {
            version: acc.next,
            global: acc.global,
            result: acc.result,
            to_position: acc.to_position,
        })
    }
}

/// Working state of a single accumulation. Each step lives in its own
/// submodule and updates these copies in place.
struct Accumulation<'a, 'b> {
    ctx: &'a VersionAccumulationContext<'b>,
    next: Version,
    global: Global,
    result: AccumulationResult,
    to_position: Position,
}

impl Accumulation<'_, '_> {
    /// Time covered by the period.
    fn elapsed(&self) -> Result<Duration> {
        self.ctx.to_oracle_version.timestamp.checked_sub(
            self.ctx.from_oracle_version.timestamp,
            "version accumulation period",
        )
    }

    /// Normalized skew of the resulting position, driving the next funding
    /// rate change.
    fn next_skew(&self) -> Result<Fixed6> {
        let scale = self.ctx.market_parameter.syn_book.scale.into_signed();
        Ok(self
            .to_position
            .skew()?
            .checked_div(scale)?
            .max(Fixed6::NEG_ONE)
            .min(Fixed6::ONE))
    }

    /// Exposure per unit of size for each tranche.
    ///
    /// The positive side is measured after the period's orders and the
    /// negative side before them, since closes leave from the old position
    /// and opens land in the new one. Empty tranches get a ratio of one.
    fn record_exposure(&mut self) -> Result<()> {
        let from = self.ctx.from_position;
        let to = self.to_position;
        let before = from.exposure()?;
        let after = to.exposure()?;

        self.next.maker_pos_exposure = signed_ratio(after.maker, to.maker)?;
        self.next.maker_neg_exposure = signed_ratio(before.maker, from.maker)?;
        self.next.long_pos_exposure = ratio(after.long, to.long)?;
        self.next.long_neg_exposure = ratio(before.long, from.long)?;
        self.next.short_pos_exposure = ratio(after.short, to.short)?;
        self.next.short_neg_exposure = ratio(before.short, from.short)?;
        Ok(())
    }

    /// Split the period's fees between protocol, oracle and risk fund.
    fn accumulate_fee_buckets(&mut self) -> Result<()> {
        let market = self.ctx.market_parameter;
        let market_fee = self
            .result
            .trade_fee
            .checked_sub(self.result.subtractive_fee)?
            .checked_add(self.result.funding_fee)?
            .checked_add(self.result.interest_fee)?;

        let oracle = market_fee.checked_mul(market.oracle_fee)?;
        let risk = market_fee.checked_mul(market.risk_fee)?;
        let protocol = market_fee.checked_sub(oracle)?.checked_sub(risk)?;

        self.global.oracle_fee = self
            .global
            .oracle_fee
            .checked_add(oracle)?
            .checked_add(self.result.settlement_fee)?;
        self.global.risk_fee = self.global.risk_fee.checked_add(risk)?;
        self.global.protocol_fee = self.global.protocol_fee.checked_add(protocol)?;
        Ok(())
    }
}

fn signed_ratio(exposure: Fixed6, size: UFixed6) -> Result<Fixed6> {
    if size.is_zero() {
        Ok(Fixed6::ONE)
    } else {
        exposure.checked_div(size.into_signed())
    }
}

fn ratio(exposure: Fixed6, size: UFixed6) -> Result<UFixed6> {
    if size.is_zero() {
        Ok(UFixed6::one())
    } else {
        exposure.abs_unsigned().checked_div(size)
    }
}
