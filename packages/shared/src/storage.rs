//! Storage width checks and helpers for dealing with CosmWasm storage.
//!
//! Records are not bit-packed, but every persisted field is still held to
//! the width it was declared with. A value outside that width is rejected
//! with [PerpError::StorageRange] before anything is written.

use crate::error::PerpError;
use crate::number::{Fixed6, UFixed6};
use anyhow::Result;
use cosmwasm_std::{Order, Storage, Uint128};
use cw_storage_plus::{Bound, Map};

/// The declared width of a persisted field, in raw `10^-6` units for
/// fixed-point values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageRange {
    /// Two's complement style range `[-2^bits, 2^bits - 1]`
    Signed {
        /// Magnitude bits, excluding the sign
        bits: u32,
    },
    /// `[0, 2^bits - 1]`
    Unsigned {
        /// Number of bits
        bits: u32,
    },
}

impl StorageRange {
    /// Shorthand for [StorageRange::Signed]
    pub const fn signed(bits: u32) -> Self {
        StorageRange::Signed { bits }
    }

    /// Shorthand for [StorageRange::Unsigned]
    pub const fn unsigned(bits: u32) -> Self {
        StorageRange::Unsigned { bits }
    }

    /// Smallest raw value accepted
    pub fn min_raw(self) -> i128 {
        match self {
            StorageRange::Signed { bits } => -(1i128 << bits),
            StorageRange::Unsigned { .. } => 0,
        }
    }

    /// Largest raw value accepted
    pub fn max_raw(self) -> i128 {
        match self {
            StorageRange::Signed { bits } | StorageRange::Unsigned { bits } => (1i128 << bits) - 1,
        }
    }

    /// Does the raw value fit?
    pub fn contains_raw(self, raw: i128) -> bool {
        raw >= self.min_raw() && raw <= self.max_raw()
    }

    fn error(self, field: &str, value: impl ToString) -> anyhow::Error {
        PerpError::StorageRange {
            field: field.to_owned(),
            value: value.to_string(),
            min: self.min_raw().to_string(),
            max: self.max_raw().to_string(),
        }
        .into()
    }

    /// Check a signed fixed-point value.
    pub fn check_fixed6(self, field: &str, value: Fixed6) -> Result<()> {
        match value.raw_i128() {
            Ok(raw) if self.contains_raw(raw) => Ok(()),
            _ => Err(self.error(field, value)),
        }
    }

    /// Check an unsigned fixed-point value.
    pub fn check_ufixed6(self, field: &str, value: UFixed6) -> Result<()> {
        let raw = value.raw();
        let fits = Uint128::try_from(raw)
            .ok()
            .and_then(|raw| i128::try_from(raw.u128()).ok())
            .map_or(false, |raw| self.contains_raw(raw));
        if fits {
            Ok(())
        } else {
            Err(self.error(field, value))
        }
    }

    /// Check a plain integer, such as an id or an order count.
    pub fn check_u64(self, field: &str, value: u64) -> Result<()> {
        if self.contains_raw(i128::from(value)) {
            Ok(())
        } else {
            Err(self.error(field, value))
        }
    }
}

/// A record whose fields each have a declared [StorageRange].
pub trait StorageRangeCheck {
    /// Fail with [PerpError::StorageRange] on the first field out of range.
    fn check_storage_range(&self) -> Result<()>;
}

/// A [Map] keyed by a monotonically increasing [u64], such as oracle
/// timestamps or order ids.
pub type MonotonicMap<T> = Map<u64, T>;

/// The entry with the greatest key, if any.
pub fn latest_in_monotonic_map<T>(store: &dyn Storage, m: MonotonicMap<T>) -> Result<Option<(u64, T)>>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    m.range(store, None, None, Order::Descending)
        .next()
        .transpose()
        .map_err(|err| err.into())
}

/// The entry with the greatest key strictly below `before`, if any.
pub fn latest_before_in_monotonic_map<T>(
    store: &dyn Storage,
    m: MonotonicMap<T>,
    before: u64,
) -> Result<Option<(u64, T)>>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    m.range(store, None, Some(Bound::exclusive(before)), Order::Descending)
        .next()
        .transpose()
        .map_err(|err| err.into())
}

/// Helper to paginate over [MonotonicMap]
pub fn collect_monotonic_map<T>(
    store: &dyn Storage,
    m: MonotonicMap<T>,
    after_id: Option<u64>,
    limit: Option<u32>,
    order: Order,
) -> Result<Vec<(u64, T)>>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let iter = m
        .range(store, after_id.map(Bound::exclusive), None, order)
        .map(|res| res.map_err(|err| err.into()));

    match limit {
        Some(limit) => iter.take(limit.try_into()?).collect(),
        None => iter.collect(),
    }
}
