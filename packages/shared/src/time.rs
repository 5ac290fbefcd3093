//! Types to represent oracle timestamps and durations.
use crate::error::PerpError;
use crate::number::{Number, UFixed6};
use anyhow::Result;
use cw_storage_plus::{KeyDeserialize, Prefixer, PrimaryKey};
use schemars::JsonSchema;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of seconds used to annualize funding and interest rates.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// An oracle timestamp, in whole seconds since the epoch.
///
/// We keep a [u64] directly to make it easier to derive some impls. The
/// result is that we need to explicitly implement [Serialize] and
/// [Deserialize] to keep the stringy representation.
#[derive(Debug, Clone, Default, Copy, Eq, PartialEq, Ord, PartialOrd, JsonSchema, Hash)]
pub struct Timestamp(#[schemars(with = "String")] u64);

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse()
            .map(Timestamp)
            .map_err(|e| anyhow::anyhow!("Invalid timestamp {s:?}: {e}"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(SecondsVisitor)
    }
}

struct SecondsVisitor;

impl<'de> Visitor<'de> for SecondsVisitor {
    type Value = Timestamp;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("seconds since epoch, string-encoded")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v.parse::<u64>() {
            Ok(v) => Ok(Timestamp(v)),
            Err(e) => Err(E::custom(format!("invalid timestamp '{v}' - {e}"))),
        }
    }
}

impl Timestamp {
    /// Construct a new value from the given number of seconds since the
    /// epoch
    pub const fn from_seconds(seconds: u64) -> Self {
        Timestamp(seconds)
    }

    /// Seconds since the epoch
    pub fn as_seconds(self) -> u64 {
        self.0
    }

    /// Add the given number of seconds to the given timestamp
    pub fn plus_seconds(self, secs: u64) -> Self {
        Timestamp(self.0.saturating_add(secs))
    }

    /// Subtract two timestamps to get the duration between them.
    ///
    /// Will fail if the right hand side is greater than the left hand side.
    pub fn checked_sub(self, rhs: Self, desc: &str) -> Result<Duration> {
        match self.0.checked_sub(rhs.0) {
            Some(x) => Ok(Duration(x)),
            None => Err(PerpError::TimestampSubtractUnderflow {
                lhs: self,
                rhs,
                desc: desc.to_owned(),
            }
            .into()),
        }
    }

}

impl<'a> PrimaryKey<'a> for Timestamp {
    type Prefix = ();
    type SubPrefix = ();
    type Suffix = Timestamp;
    type SuperSuffix = Timestamp;

    fn key(&self) -> Vec<cw_storage_plus::Key> {
        self.0.key()
    }
}

impl KeyDeserialize for Timestamp {
    type Output = Timestamp;

    const KEY_ELEMS: u16 = 1;

    fn from_vec(value: Vec<u8>) -> cosmwasm_std::StdResult<Self::Output> {
        u64::from_vec(value).map(Timestamp)
    }
}

impl<'a> Prefixer<'a> for Timestamp {
    fn prefix(&self) -> Vec<cw_storage_plus::Key> {
        self.0.prefix()
    }
}

/// A duration of time measured in seconds
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, JsonSchema,
)]
pub struct Duration(u64);

impl Duration {
    /// Convert a number of seconds into a [Duration].
    pub const fn from_seconds(seconds: u64) -> Self {
        Duration(seconds)
    }

    /// Returns the underlying seconds value as a u64
    pub fn as_seconds(&self) -> u64 {
        self.0
    }

    /// Is this a zero-length duration?
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Represent as a fixed-point number of seconds.
    pub fn as_ufixed6(&self) -> UFixed6 {
        UFixed6::from(self.0)
    }

    /// Represent as a high precision [Number] of seconds.
    pub fn as_number(&self) -> Number {
        Number::from(self.0)
    }
}
