use super::types::parse_decimal256;
use super::{NonZero, UnsignedDecimal};
use anyhow::{Context, Result};
use std::fmt::Display;
use std::str::FromStr;

impl<T: UnsignedDecimal> Display for NonZero<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.raw())
    }
}

impl<T: UnsignedDecimal> FromStr for NonZero<T> {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_decimal256(s)
            .and_then(T::try_from_decimal256)
            .and_then(|value| {
                NonZero::new(value).with_context(|| format!("{s:?} must not be zero"))
            })
    }
}
