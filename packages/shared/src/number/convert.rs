use anyhow::{Context, Result};
use cosmwasm_std::{Decimal256, Uint128};

use super::types::{parse_decimal256, Signed, UFixed6, UnsignedDecimal};
use super::{Fixed6, Number};
use std::fmt::Write;
use std::str::FromStr;

impl Fixed6 {
    /// Construct from a signed count of `10^-6` units.
    ///
    /// This is the representation used by the storage range checks and by
    /// most reference values, e.g. `Fixed6::from_raw(-30_000)` is `-0.03`.
    pub fn from_raw(raw: i128) -> Self {
        Signed::from_parts(UFixed6::from_raw(raw.unsigned_abs()), raw < 0)
    }

    /// The signed count of `10^-6` units, failing if it does not fit in an [i128].
    pub fn raw_i128(self) -> Result<i128> {
        let magnitude = Uint128::try_from(self.value().raw())
            .ok()
            .and_then(|raw| i128::try_from(raw.u128()).ok())
            .with_context(|| format!("{self} does not fit in a raw i128"))?;
        Ok(if self.is_negative() {
            -magnitude
        } else {
            magnitude
        })
    }
}

impl<T: UnsignedDecimal> FromStr for Signed<T> {
    type Err = anyhow::Error;

    /// Possible inputs: "1.23", "1", "000012", "1.123000", "-1.23"
    /// Disallowed: "", ".23"
    ///
    /// This never performs any kind of rounding. Digits beyond what `T` can
    /// hold result in an error.
    fn from_str(input: &str) -> Result<Self> {
        let (magnitude, negative) = match input.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (input, false),
        };
        parse_decimal256(magnitude)
            .and_then(T::try_from_decimal256)
            .map(|value| Signed::from_parts(value, negative))
            .with_context(|| format!("Unable to parse signed decimal from {input:?}"))
    }
}

impl<T: UnsignedDecimal> From<u64> for Signed<T> {
    fn from(val: u64) -> Self {
        Signed::new_positive(T::from_decimal256(Decimal256::from_ratio(val, 1u32)))
    }
}

impl From<Fixed6> for Number {
    fn from(src: Fixed6) -> Self {
        src.into_number()
    }
}

impl<T: UnsignedDecimal> std::fmt::Display for Signed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_zero() {
            write!(f, "0")
        } else {
            if self.is_negative() {
                f.write_char('-')?;
            }
            write!(f, "{}", self.value())
        }
    }
}
impl<T: UnsignedDecimal> std::fmt::Debug for Signed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
