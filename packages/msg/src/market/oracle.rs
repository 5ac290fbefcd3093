//! Oracle observations supplied by the price feed
use shared::prelude::*;

/// A timestamped price observation defining a settlement boundary.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct OracleVersion {
    /// Settlement boundary, in seconds
    pub timestamp: Timestamp,
    /// Reported price. Recorded even when the version is invalid.
    pub price: Fixed6,
    /// Did the feed actually produce a price for this boundary?
    pub valid: bool,
}

/// Fees charged by the oracle for committing a version.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct OracleReceipt {
    /// Total settlement fee, shared by every non-guaranteed order
    pub settlement_fee: UFixed6,
}
