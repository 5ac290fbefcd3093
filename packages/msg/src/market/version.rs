//! Per-period accumulator snapshots
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shared::prelude::*;
use shared::storage::StorageRange;

/// A per-unit value that holders of a tranche apply retroactively.
///
/// Increments divide by the tranche size rounding toward negative infinity,
/// so the sum of what holders receive never exceeds what was distributed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, JsonSchema)]
#[serde(transparent)]
pub struct Accumulator(pub Fixed6);

impl Accumulator {
    /// Current per-unit value
    pub fn value(self) -> Fixed6 {
        self.0
    }

    /// Distribute `amount` across `total` units. Nothing happens when there
    /// are no units to distribute to.
    pub fn increment(&mut self, amount: Fixed6, total: UFixed6) -> Result<()> {
        if total.is_zero() {
            return Ok(());
        }
        self.0 = self
            .0
            .checked_add(amount.checked_div_floor(total.into_signed())?)?;
        Ok(())
    }

    /// Charge `amount` across `total` units.
    pub fn decrement(&mut self, amount: Fixed6, total: UFixed6) -> Result<()> {
        self.increment(-amount, total)
    }

    /// Value accrued by `size` units between two snapshots.
    pub fn accumulated(from: Accumulator, to: Accumulator, size: UFixed6) -> Result<Fixed6> {
        to.0.checked_sub(from.0)?.checked_mul(size.into_signed())
    }
}

/// Immutable accumulator snapshot for one settlement boundary.
///
/// `*_pre_value`, `*_close_value` and `*_post_value` are cumulative and
/// carry over from the previous version. Spread and fee values only cover
/// the period that produced this version.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Version {
    /// Was the oracle version valid (or the market closed)?
    pub valid: bool,
    /// Oracle price at this boundary
    pub price: Fixed6,

    /// Exposure per unit of maker size after the period's orders
    pub maker_pos_exposure: Fixed6,
    /// Exposure per unit of maker size before the period's orders
    pub maker_neg_exposure: Fixed6,
    /// Exposure per unit of long size after the period's orders
    pub long_pos_exposure: UFixed6,
    /// Exposure per unit of long size before the period's orders
    pub long_neg_exposure: UFixed6,
    /// Exposure per unit of short size after the period's orders
    pub short_pos_exposure: UFixed6,
    /// Exposure per unit of short size before the period's orders
    pub short_neg_exposure: UFixed6,

    /// Maker value accrued on the pre-order position
    pub maker_pre_value: Accumulator,
    /// Long value accrued on the pre-order position
    pub long_pre_value: Accumulator,
    /// Short value accrued on the pre-order position
    pub short_pre_value: Accumulator,
    /// Maker value accrued by size that stays open through taker fills
    pub maker_close_value: Accumulator,
    /// Long value accrued by size that stays open through taker fills
    pub long_close_value: Accumulator,
    /// Short value accrued by size that stays open through taker fills
    pub short_close_value: Accumulator,
    /// Long value accrued on the post-order position
    pub long_post_value: Accumulator,
    /// Short value accrued on the post-order position
    pub short_post_value: Accumulator,

    /// Spread per unit of positive exposure-weighted order size
    pub spread_pos: Accumulator,
    /// Spread per unit of negative exposure-weighted order size
    pub spread_neg: Accumulator,
    /// Trade fee per unit of maker order size
    pub maker_fee: Accumulator,
    /// Trade fee per unit of chargeable taker order size
    pub taker_fee: Accumulator,
    /// Settlement fee per non-guaranteed order
    pub settlement_fee: Accumulator,
    /// Fee per liquidation
    pub liquidation_fee: Accumulator,
}

const PRICE_RANGE: StorageRange = StorageRange::signed(63);
const MAKER_EXPOSURE_RANGE: StorageRange = StorageRange::signed(23);
const TAKER_EXPOSURE_RANGE: StorageRange = StorageRange::unsigned(24);
const PRE_VALUE_RANGE: StorageRange = StorageRange::signed(63);
const VALUE_RANGE: StorageRange = StorageRange::signed(47);

impl Version {
    /// Starting point for the following period: cumulative values carry
    /// over, everything else resets.
    pub fn next(&self) -> Version {
        Version {
            maker_pre_value: self.maker_pre_value,
            long_pre_value: self.long_pre_value,
            short_pre_value: self.short_pre_value,
            maker_close_value: self.maker_close_value,
            long_close_value: self.long_close_value,
            short_close_value: self.short_close_value,
            long_post_value: self.long_post_value,
            short_post_value: self.short_post_value,
            ..Version::default()
        }
    }
}

impl StorageRangeCheck for Version {
    fn check_storage_range(&self) -> Result<()> {
        PRICE_RANGE.check_fixed6("version.price", self.price)?;

        MAKER_EXPOSURE_RANGE.check_fixed6("version.maker_pos_exposure", self.maker_pos_exposure)?;
        MAKER_EXPOSURE_RANGE.check_fixed6("version.maker_neg_exposure", self.maker_neg_exposure)?;
        for (field, value) in [
            ("version.long_pos_exposure", self.long_pos_exposure),
            ("version.long_neg_exposure", self.long_neg_exposure),
            ("version.short_pos_exposure", self.short_pos_exposure),
            ("version.short_neg_exposure", self.short_neg_exposure),
        ] {
            TAKER_EXPOSURE_RANGE.check_ufixed6(field, value)?;
        }

        for (field, value) in [
            ("version.maker_pre_value", self.maker_pre_value),
            ("version.long_pre_value", self.long_pre_value),
            ("version.short_pre_value", self.short_pre_value),
        ] {
            PRE_VALUE_RANGE.check_fixed6(field, value.0)?;
        }

        for (field, value) in [
            ("version.maker_close_value", self.maker_close_value),
            ("version.long_close_value", self.long_close_value),
            ("version.short_close_value", self.short_close_value),
            ("version.long_post_value", self.long_post_value),
            ("version.short_post_value", self.short_post_value),
            ("version.spread_pos", self.spread_pos),
            ("version.spread_neg", self.spread_neg),
            ("version.maker_fee", self.maker_fee),
            ("version.taker_fee", self.taker_fee),
            ("version.settlement_fee", self.settlement_fee),
            ("version.liquidation_fee", self.liquidation_fee),
        ] {
            VALUE_RANGE.check_fixed6(field, value.0)?;
        }
        Ok(())
    }
}
