//! Events emitted by settlement, for off-chain bookkeeping
use cosmwasm_std::Event;
use shared::prelude::*;

use super::checkpoint::CheckpointAccumulationResult;
use super::result::AccumulationResult;

/// A new version was accumulated for the market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionAccumulatedEvent {
    /// Oracle timestamp of the new version
    pub timestamp: Timestamp,
    /// Order id that was settled
    pub order_id: u64,
    /// Validity of the new version
    pub valid: bool,
    /// Price recorded on the new version
    pub price: Fixed6,
    /// Every subtotal of the accumulation
    pub result: AccumulationResult,
}

impl PerpEvent for VersionAccumulatedEvent {}

impl From<VersionAccumulatedEvent> for Event {
    fn from(src: VersionAccumulatedEvent) -> Self {
        let r = src.result;
        Event::new("version-accumulated").add_attributes(vec![
            ("timestamp", src.timestamp.to_string()),
            ("order-id", src.order_id.to_string()),
            ("valid", src.valid.to_string()),
            ("price", src.price.to_string()),
            ("trade-fee", r.trade_fee.to_string()),
            ("subtractive-fee", r.subtractive_fee.to_string()),
            ("spread-pos", r.spread_pos.to_string()),
            ("spread-neg", r.spread_neg.to_string()),
            ("spread-maker", r.spread_maker.to_string()),
            ("spread-long", r.spread_long.to_string()),
            ("spread-short", r.spread_short.to_string()),
            ("adiabatic-fee", r.adiabatic_fee.to_string()),
            ("adiabatic-exposure", r.adiabatic_exposure.to_string()),
            (
                "adiabatic-exposure-maker",
                r.adiabatic_exposure_maker.to_string(),
            ),
            (
                "adiabatic-exposure-market",
                r.adiabatic_exposure_market.to_string(),
            ),
            ("funding-maker", r.funding_maker.to_string()),
            ("funding-long", r.funding_long.to_string()),
            ("funding-short", r.funding_short.to_string()),
            ("funding-fee", r.funding_fee.to_string()),
            ("interest-maker", r.interest_maker.to_string()),
            ("interest-long", r.interest_long.to_string()),
            ("interest-short", r.interest_short.to_string()),
            ("interest-fee", r.interest_fee.to_string()),
            ("pnl-maker", r.pnl_maker.to_string()),
            ("pnl-long", r.pnl_long.to_string()),
            ("pnl-short", r.pnl_short.to_string()),
            ("settlement-fee", r.settlement_fee.to_string()),
            ("liquidation-fee", r.liquidation_fee.to_string()),
        ])
    }
}

impl TryFrom<Event> for VersionAccumulatedEvent {
    type Error = anyhow::Error;

    fn try_from(evt: Event) -> Result<Self> {
        Ok(VersionAccumulatedEvent {
            timestamp: evt.timestamp_attr("timestamp")?,
            order_id: evt.u64_attr("order-id")?,
            valid: evt.bool_attr("valid")?,
            price: evt.signed_attr("price")?,
            result: AccumulationResult {
                trade_fee: evt.decimal_attr("trade-fee")?,
                subtractive_fee: evt.decimal_attr("subtractive-fee")?,
                spread_pos: evt.decimal_attr("spread-pos")?,
                spread_neg: evt.decimal_attr("spread-neg")?,
                spread_maker: evt.decimal_attr("spread-maker")?,
                spread_long: evt.decimal_attr("spread-long")?,
                spread_short: evt.decimal_attr("spread-short")?,
                adiabatic_fee: evt.signed_attr("adiabatic-fee")?,
                adiabatic_exposure: evt.signed_attr("adiabatic-exposure")?,
                adiabatic_exposure_maker: evt.signed_attr("adiabatic-exposure-maker")?,
                adiabatic_exposure_market: evt.signed_attr("adiabatic-exposure-market")?,
                funding_maker: evt.signed_attr("funding-maker")?,
                funding_long: evt.signed_attr("funding-long")?,
                funding_short: evt.signed_attr("funding-short")?,
                funding_fee: evt.decimal_attr("funding-fee")?,
                interest_maker: evt.signed_attr("interest-maker")?,
                interest_long: evt.signed_attr("interest-long")?,
                interest_short: evt.signed_attr("interest-short")?,
                interest_fee: evt.decimal_attr("interest-fee")?,
                pnl_maker: evt.signed_attr("pnl-maker")?,
                pnl_long: evt.signed_attr("pnl-long")?,
                pnl_short: evt.signed_attr("pnl-short")?,
                settlement_fee: evt.decimal_attr("settlement-fee")?,
                liquidation_fee: evt.decimal_attr("liquidation-fee")?,
            },
        })
    }
}

/// An account was settled against a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointEvent {
    /// The account that was settled
    pub account: String,
    /// Timestamp of the version it was settled against
    pub timestamp: Timestamp,
    /// Amounts owed to or by the account
    pub result: CheckpointAccumulationResult,
}

impl PerpEvent for CheckpointEvent {}

impl From<CheckpointEvent> for Event {
    fn from(src: CheckpointEvent) -> Self {
        let r = src.result;
        Event::new("checkpoint").add_attributes(vec![
            ("account", src.account),
            ("timestamp", src.timestamp.to_string()),
            ("collateral", r.collateral.to_string()),
            ("price-override", r.price_override.to_string()),
            ("trade-fee", r.trade_fee.to_string()),
            ("spread", r.spread.to_string()),
            ("settlement-fee", r.settlement_fee.to_string()),
            ("liquidation-fee", r.liquidation_fee.to_string()),
            ("subtractive-fee", r.subtractive_fee.to_string()),
        ])
    }
}

impl TryFrom<Event> for CheckpointEvent {
    type Error = anyhow::Error;

    fn try_from(evt: Event) -> Result<Self> {
        Ok(CheckpointEvent {
            account: evt.string_attr("account")?,
            timestamp: evt.timestamp_attr("timestamp")?,
            result: CheckpointAccumulationResult {
                collateral: evt.signed_attr("collateral")?,
                price_override: evt.signed_attr("price-override")?,
                trade_fee: evt.signed_attr("trade-fee")?,
                spread: evt.signed_attr("spread")?,
                settlement_fee: evt.decimal_attr("settlement-fee")?,
                liquidation_fee: evt.decimal_attr("liquidation-fee")?,
                subtractive_fee: evt.decimal_attr("subtractive-fee")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_event_attributes() {
        let src = VersionAccumulatedEvent {
            timestamp: Timestamp::from_seconds(1_700_000_000),
            order_id: 2,
            valid: true,
            price: "123".parse().unwrap(),
            result: AccumulationResult {
                trade_fee: "12.3".parse().unwrap(),
                spread_pos: "14.851225".parse().unwrap(),
                funding_long: Fixed6::from_raw(-1788),
                pnl_short: "-18".parse().unwrap(),
                liquidation_fee: UFixed6::from_raw(18),
                ..AccumulationResult::default()
            },
        };
        let evt = Event::from(src.clone());
        assert_eq!(evt.ty, "version-accumulated");
        assert_eq!(evt.string_attr("funding-long").unwrap(), "-0.001788");
        assert_eq!(evt.string_attr("funding-maker").unwrap(), "0");
        assert_eq!(VersionAccumulatedEvent::try_from(evt).unwrap(), src);
    }

    #[test]
    fn checkpoint_event_missing_attribute() {
        let src = CheckpointEvent {
            account: "alice".to_owned(),
            timestamp: Timestamp::from_seconds(10),
            result: CheckpointAccumulationResult {
                collateral: "-1.5".parse().unwrap(),
                settlement_fee: "0.03".parse().unwrap(),
                ..CheckpointAccumulationResult::default()
            },
        };
        let evt = Event::from(src.clone());
        assert_eq!(CheckpointEvent::try_from(evt.clone()).unwrap(), src);

        let mut truncated = evt;
        truncated.attributes.retain(|attr| attr.key != "spread");
        let err = CheckpointEvent::try_from(truncated).unwrap_err();
        assert_eq!(
            PerpError::try_from_anyhow(&err).unwrap().get_error_id(),
            "missing_state"
        );
    }
}
