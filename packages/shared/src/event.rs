//! Helpers for parsing event data into well typed event data types.
use crate::error::PerpError;
use crate::number::{NonZero, Signed, UnsignedDecimal};
use crate::time::Timestamp;
use anyhow::{Context, Result};
use cosmwasm_std::Event;
use std::str::FromStr;

/// A settlement event which can be rendered as a [cosmwasm_std::Event].
///
/// Implementors also provide `TryFrom<Event>` so that indexers can parse the
/// attributes back into the typed record.
pub trait PerpEvent: Into<Event> {}

/// Extension trait to add methods to native cosmwasm events
pub trait CosmwasmEventExt {
    // these are the only two that require implementation
    // everything else builds on these

    /// Does the event have the given attribute?
    fn has_attr(&self, key: &str) -> bool;

    /// Parse the value associated with the key, if it exists
    fn try_map_attr<B>(&self, key: &str, f: impl Fn(&str) -> B) -> Option<B>;

    /// Parse the value associated with the key as a u64
    fn u64_attr(&self, key: &str) -> Result<u64> {
        self.map_attr_result(key, |s| s.parse().map_err(anyhow::Error::from))
    }

    /// Parse a timestamp attribute
    fn timestamp_attr(&self, key: &str) -> Result<Timestamp> {
        self.map_attr_result(key, Timestamp::from_str)
    }

    /// Parse an unsigned decimal attribute
    fn decimal_attr<T: UnsignedDecimal>(&self, key: &str) -> Result<T> {
        self.map_attr_result(key, |s| {
            s.parse()
                .ok()
                .with_context(|| format!("decimal_attr failed on key {key} and value {s}"))
        })
    }

    /// Parse a non-zero (strictly positive) decimal attribute
    fn non_zero_attr<T: UnsignedDecimal>(&self, key: &str) -> Result<NonZero<T>> {
        self.map_attr_result(key, |s| s.parse())
    }

    /// Parse a signed decimal attribute
    fn signed_attr<T: UnsignedDecimal>(&self, key: &str) -> Result<Signed<T>> {
        self.map_attr_result(key, |s| s.parse())
    }

    /// Parse a string attribute
    fn string_attr(&self, key: &str) -> Result<String> {
        self.map_attr_ok(key, |s| s.to_string())
    }

    /// Parse a bool-as-string attribute
    fn bool_attr(&self, key: &str) -> Result<bool> {
        self.string_attr(key)
            .and_then(|s| s.parse::<bool>().map_err(|err| err.into()))
    }

    /// Require an attribute and apply a function to the raw string value
    fn map_attr_ok<B>(&self, key: &str, f: impl Fn(&str) -> B) -> Result<B> {
        match self.try_map_attr(key, f) {
            Some(x) => Ok(x),
            None => Err(PerpError::MissingState {
                name: format!("event attribute {key}"),
            }
            .into()),
        }
    }

    /// Require an attribute and try to parse its value with the given function
    fn map_attr_result<B>(&self, key: &str, f: impl Fn(&str) -> Result<B>) -> Result<B> {
        // just need to remove the one level of nesting for "no such key"
        self.map_attr_ok(key, f)?
    }
}

impl CosmwasmEventExt for Event {
    fn has_attr(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key == key)
    }

    fn try_map_attr<B>(&self, key: &str, f: impl Fn(&str) -> B) -> Option<B> {
        self.attributes
            .iter()
            .find_map(|a| (a.key == key).then(|| f(a.value.as_str())))
    }
}
