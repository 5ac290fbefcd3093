//! Aggregate totals produced by a version accumulation
use shared::prelude::*;

/// Every fee, funding, interest, pnl and spread subtotal for one period.
///
/// Totals are in collateral. Signed fields are from the point of view of
/// the tranche named, so a negative `funding_long` means longs paid.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct AccumulationResult {
    /// Linear and proportional trade fees, maker and taker combined
    pub trade_fee: UFixed6,
    /// Part of the trade fee owed to referrers
    pub subtractive_fee: UFixed6,

    /// Spread charged to orders pushing the skew positive
    pub spread_pos: UFixed6,
    /// Spread charged to orders pushing the skew negative
    pub spread_neg: UFixed6,
    /// Spread received by makers
    pub spread_maker: UFixed6,
    /// Spread received by longs
    pub spread_long: UFixed6,
    /// Spread received by shorts
    pub spread_short: UFixed6,

    /// Taker adiabatic fee, negative when the order reduced skew
    pub adiabatic_fee: Fixed6,
    /// Value change of the outstanding skew due to the price move
    pub adiabatic_exposure: Fixed6,
    /// Part of the adiabatic exposure borne by makers
    pub adiabatic_exposure_maker: Fixed6,
    /// Part of the adiabatic exposure borne by the market
    pub adiabatic_exposure_market: Fixed6,

    /// Funding received by makers
    pub funding_maker: Fixed6,
    /// Funding received by longs
    pub funding_long: Fixed6,
    /// Funding received by shorts
    pub funding_short: Fixed6,
    /// Funding kept as a fee
    pub funding_fee: UFixed6,

    /// Interest received by makers
    pub interest_maker: Fixed6,
    /// Interest received by longs
    pub interest_long: Fixed6,
    /// Interest received by shorts
    pub interest_short: Fixed6,
    /// Interest kept as a fee
    pub interest_fee: UFixed6,

    /// Price pnl of makers
    pub pnl_maker: Fixed6,
    /// Price pnl of longs
    pub pnl_long: Fixed6,
    /// Price pnl of shorts
    pub pnl_short: Fixed6,

    /// Settlement fee collected from the oracle receipt
    pub settlement_fee: UFixed6,
    /// Total liquidation fee
    pub liquidation_fee: UFixed6,
}
