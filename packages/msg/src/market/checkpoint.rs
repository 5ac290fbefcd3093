//! Per-account settlement state
use shared::prelude::*;
use shared::storage::StorageRange;

use super::position::Position;

/// Where a single account stands after its last settlement.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Checkpoint {
    /// Timestamp of the version the account is settled up to
    pub timestamp: Timestamp,
    /// The account's position as of `timestamp`
    pub position: Position,
    /// Collateral after every settlement so far
    pub collateral: Fixed6,
    /// Trade fees charged in the last settlement, including spread
    pub trade_fee: Fixed6,
    /// Settlement and liquidation fees charged in the last settlement
    pub settlement_fee: UFixed6,
}

const COLLATERAL_RANGE: StorageRange = StorageRange::signed(63);
const FEE_RANGE: StorageRange = StorageRange::unsigned(48);

impl StorageRangeCheck for Checkpoint {
    fn check_storage_range(&self) -> Result<()> {
        self.position.check_storage_range()?;
        COLLATERAL_RANGE.check_fixed6("checkpoint.collateral", self.collateral)?;
        COLLATERAL_RANGE.check_fixed6("checkpoint.trade_fee", self.trade_fee)?;
        FEE_RANGE.check_ufixed6("checkpoint.settlement_fee", self.settlement_fee)
    }
}

/// Amounts owed to or by one account for one settlement.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct CheckpointAccumulationResult {
    /// Collateral change from funding, interest, pnl and received spread
    pub collateral: Fixed6,
    /// Adjustment for settling a guaranteed fill at the oracle price
    pub price_override: Fixed6,
    /// Linear, proportional and adiabatic trade fee paid
    pub trade_fee: Fixed6,
    /// Spread paid for the account's own book fills
    pub spread: Fixed6,
    /// Settlement fee paid
    pub settlement_fee: UFixed6,
    /// Liquidation fee paid
    pub liquidation_fee: UFixed6,
    /// Part of the trade fee owed to referrers
    pub subtractive_fee: UFixed6,
}

impl CheckpointAccumulationResult {
    /// Net collateral change: everything earned minus everything paid.
    pub fn net(&self) -> Result<Fixed6> {
        self.collateral
            .checked_add(self.price_override)?
            .checked_sub(self.trade_fee)?
            .checked_sub(self.spread)?
            .checked_sub(self.settlement_fee.into_signed())?
            .checked_sub(self.liquidation_fee.into_signed())
    }
}
