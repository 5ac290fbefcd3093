//! This module provides raw data types and just enough functionality to
//! construct them. It exports smart contructors to the rest of the crate to
//! ensure that invariants are never violated.

use anyhow::{Context, Result};
use cosmwasm_std::{Decimal256, Uint256};
use std::{fmt::Display, str::FromStr};

/// Number of fractional digits carried by [UFixed6] and [Fixed6].
const FIXED6_DECIMALS: u32 = 6;

/// Ratio between [Decimal256] atomics (18 digits) and fixed-6 raw units.
const FIXED6_ATOMICS_FACTOR: u128 = 1_000_000_000_000;

/// Generalizes any newtype wrapper around a [Decimal256].
pub trait UnsignedDecimal:
    Display
    + std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Copy
    + Ord
    + FromStr
    + Default
{
    /// Convert into the underlying [Decimal256].
    fn into_decimal256(self) -> Decimal256;

    /// Convert from a [Decimal256], dropping any precision this type cannot
    /// represent.
    fn from_decimal256(src: Decimal256) -> Self;

    /// Convert from a [Decimal256], failing if any precision would be lost.
    fn try_from_decimal256(src: Decimal256) -> Result<Self> {
        Ok(Self::from_decimal256(src))
    }

    /// Check if the underlying value is 0.
    fn is_zero(&self) -> bool {
        self.into_decimal256().is_zero()
    }

    /// Add two values together
    fn checked_add(self, rhs: Self) -> Result<Self> {
        self.into_decimal256()
            .checked_add(rhs.into_decimal256())
            .map(Self::from_decimal256)
            .with_context(|| format!("Overflow while adding {self} and {rhs}"))
    }

    /// Subtract two values
    fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.into_decimal256()
            .checked_sub(rhs.into_decimal256())
            .map(Self::from_decimal256)
            .with_context(|| format!("Underflow while subtracting {rhs} from {self}"))
    }

    /// convert into a general purpose [Number]
    fn into_number(self) -> Signed<Decimal256> {
        Signed::new_positive(self.into_decimal256())
    }

    /// Convert into a positive [Signed] value.
    fn into_signed(self) -> Signed<Self> {
        Signed::new_positive(self)
    }

    /// The value 0
    fn zero() -> Self {
        Self::from_decimal256(Decimal256::zero())
    }
}

impl UnsignedDecimal for Decimal256 {
    fn into_decimal256(self) -> Decimal256 {
        self
    }

    fn from_decimal256(src: Decimal256) -> Self {
        src
    }
}

fn truncate_fixed6(src: Decimal256) -> Decimal256 {
    let factor = Uint256::from_u128(FIXED6_ATOMICS_FACTOR);
    Decimal256::new(src.atomics() / factor * factor)
}

/// An unsigned fixed-point decimal with exactly six fractional digits.
///
/// Every constructor truncates toward zero, so arithmetic performed through
/// [Decimal256] and converted back always lands on a representable value.
// Avoid using cw_serde because Decimal256 has a bad Debug impl
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct UFixed6(Decimal256);

impl UFixed6 {
    /// Zero value
    pub const fn zero() -> Self {
        Self(Decimal256::zero())
    }

    /// One value
    pub const fn one() -> Self {
        Self(Decimal256::one())
    }

    /// The largest representable value
    pub fn max_value() -> Self {
        Self(truncate_fixed6(Decimal256::MAX))
    }

    /// Construct from a count of `10^-6` units
    pub fn from_raw(raw: u128) -> Self {
        Self(Decimal256::new(
            Uint256::from_u128(raw) * Uint256::from_u128(FIXED6_ATOMICS_FACTOR),
        ))
    }

    /// The count of `10^-6` units in this value
    pub fn raw(self) -> Uint256 {
        self.0.atomics() / Uint256::from_u128(FIXED6_ATOMICS_FACTOR)
    }
}

impl UnsignedDecimal for UFixed6 {
    fn into_decimal256(self) -> Decimal256 {
        self.0
    }

    fn from_decimal256(src: Decimal256) -> Self {
        Self(truncate_fixed6(src))
    }

    fn try_from_decimal256(src: Decimal256) -> Result<Self> {
        let truncated = truncate_fixed6(src);
        anyhow::ensure!(
            truncated == src,
            "{src} carries more than {FIXED6_DECIMALS} fractional digits"
        );
        Ok(Self(truncated))
    }
}

impl Display for UFixed6 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for UFixed6 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "UFixed6({})", self.0)
    }
}

impl FromStr for UFixed6 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_decimal256(s).and_then(Self::try_from_decimal256)
    }
}

impl From<u64> for UFixed6 {
    fn from(src: u64) -> Self {
        Self::from_decimal256(Decimal256::from_ratio(src, 1u32))
    }
}

pub(crate) fn parse_decimal256(s: &str) -> Result<Decimal256> {
    s.parse()
        .with_context(|| format!("Unable to parse unsigned decimal from {s}"))
}

/// Wrap up any [UnsignedDecimal] to provide negative values too.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Signed<T> {
    value: T,
    /// Invariant: must always be false if value is 0
    negative: bool,
}

impl<T: UnsignedDecimal> Default for Signed<T> {
    fn default() -> Self {
        Signed {
            value: T::default(),
            negative: false,
        }
    }
}

impl<T> From<T> for Signed<T> {
    fn from(value: T) -> Self {
        Signed {
            value,
            negative: false,
        }
    }
}

impl<T: UnsignedDecimal> Signed<T> {
    pub(crate) fn value(self) -> T {
        self.value
    }

    /// Strictly less than 0, returns false on 0
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// create a new positive value
    pub(crate) fn new_positive(value: T) -> Self {
        Self {
            value,
            negative: false,
        }
    }

    /// create a new negative value
    pub(crate) fn new_negative(value: T) -> Self {
        Self {
            value,
            negative: !value.is_zero(),
        }
    }

    /// Build from a magnitude and a sign flag
    pub fn from_parts(value: T, negative: bool) -> Self {
        if negative {
            Self::new_negative(value)
        } else {
            Self::new_positive(value)
        }
    }

    /// Convert into a general purpose [Number].
    pub fn into_number(self) -> Signed<Decimal256> {
        Signed {
            value: self.value.into_decimal256(),
            negative: self.negative,
        }
    }

    /// convert from a general purpose [Number], truncating toward zero.
    pub fn from_number(src: Signed<Decimal256>) -> Self {
        Signed::from_parts(T::from_decimal256(src.value), src.negative)
    }

    /// The value 0
    pub fn zero() -> Self {
        Signed::new_positive(T::zero())
    }

    /// If the value is positive or zero, return the inner `T`. Otherwise return `None`.
    pub fn try_into_non_negative_value(self) -> Option<T> {
        if self.is_negative() {
            None
        } else {
            Some(self.value())
        }
    }
}

impl Signed<Decimal256> {
    /// 1 as a Number
    pub const ONE: Number = Number {
        value: Decimal256::one(),
        negative: false,
    };

    /// 0 as a Number
    pub const ZERO: Number = Number {
        value: Decimal256::zero(),
        negative: false,
    };
}

impl Signed<UFixed6> {
    /// 0 as a Fixed6
    pub const ZERO: Fixed6 = Fixed6 {
        value: UFixed6::zero(),
        negative: false,
    };

    /// 1 as a Fixed6
    pub const ONE: Fixed6 = Fixed6 {
        value: UFixed6::one(),
        negative: false,
    };

    /// -1 as a Fixed6
    pub const NEG_ONE: Fixed6 = Fixed6 {
        value: UFixed6::one(),
        negative: true,
    };

    /// The largest representable value
    pub fn max_value() -> Self {
        Self::new_positive(UFixed6::max_value())
    }

    /// The smallest representable value
    pub fn min_value() -> Self {
        Self::new_negative(UFixed6::max_value())
    }
}

impl<T: UnsignedDecimal> std::ops::Neg for Signed<T> {
    type Output = Self;

    fn neg(mut self) -> Self {
        if !self.value.is_zero() {
            self.negative = !self.negative;
        }
        self
    }
}

/// A signed number type with high fidelity.
///
/// Used for intermediate math that must stay exact at 18 digits before the
/// result is truncated back into a [Fixed6].
pub type Number = Signed<Decimal256>;

/// A signed fixed-point decimal with exactly six fractional digits.
pub type Fixed6 = Signed<UFixed6>;

/// Ensure that the inner value is never 0.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Debug)]
pub struct NonZero<T>(T);

impl<T: UnsignedDecimal> NonZero<T> {
    /// Get the underlying raw value.
    pub fn raw(self) -> T {
        self.0
    }

    /// Turn into a signed value.
    pub fn into_signed(self) -> Signed<T> {
        self.0.into()
    }

    /// Try to convert a raw value into a [NonZero].
    pub fn new(src: T) -> Option<Self> {
        if src.is_zero() {
            None
        } else {
            Some(NonZero(src))
        }
    }

    /// Convert into a general purpose [Number].
    pub fn into_number(self) -> Signed<Decimal256> {
        self.0.into_number()
    }

    /// The value 1.
    pub fn one() -> Self {
        Self(T::from_decimal256(Decimal256::one()))
    }
}
