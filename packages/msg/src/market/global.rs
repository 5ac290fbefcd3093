//! Market-wide accumulator state
use shared::prelude::*;
use shared::storage::StorageRange;

/// State of the funding rate controller.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct PAccumulator {
    /// Current annualized funding rate
    pub value: Fixed6,
    /// Normalised skew that drives the next period's rate change
    pub skew: Fixed6,
}

/// Mutable per-market state, updated exactly once per settlement.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Global {
    /// Id of the order currently being collected
    pub current_id: u64,
    /// Id of the last settled order
    pub latest_id: u64,
    /// Fees owed to the protocol
    pub protocol_fee: UFixed6,
    /// Fees owed to the oracle
    pub oracle_fee: UFixed6,
    /// Fees owed to the risk fund
    pub risk_fee: UFixed6,
    /// Funding rate controller
    pub p_accumulator: PAccumulator,
    /// Last valid oracle price
    pub latest_price: Fixed6,
    /// Adiabatic exposure borne by the market when there were no makers
    pub exposure: Fixed6,
}

const ID_RANGE: StorageRange = StorageRange::unsigned(64);
const FEE_RANGE: StorageRange = StorageRange::unsigned(64);
const RATE_RANGE: StorageRange = StorageRange::signed(31);
const SKEW_RANGE: StorageRange = StorageRange::signed(23);
const PRICE_RANGE: StorageRange = StorageRange::signed(63);

impl StorageRangeCheck for Global {
    fn check_storage_range(&self) -> Result<()> {
        ID_RANGE.check_u64("global.current_id", self.current_id)?;
        ID_RANGE.check_u64("global.latest_id", self.latest_id)?;
        FEE_RANGE.check_ufixed6("global.protocol_fee", self.protocol_fee)?;
        FEE_RANGE.check_ufixed6("global.oracle_fee", self.oracle_fee)?;
        FEE_RANGE.check_ufixed6("global.risk_fee", self.risk_fee)?;
        RATE_RANGE.check_fixed6("global.p_accumulator.value", self.p_accumulator.value)?;
        SKEW_RANGE.check_fixed6("global.p_accumulator.skew", self.p_accumulator.skew)?;
        PRICE_RANGE.check_fixed6("global.latest_price", self.latest_price)?;
        PRICE_RANGE.check_fixed6("global.exposure", self.exposure)
    }
}
