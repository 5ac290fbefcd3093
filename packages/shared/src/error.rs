//! Error handling helpers for the settlement engine
use crate::time::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Unique identifier for an error within the settlement engine
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum PerpError {
    #[error("Arithmetic overflow while computing {desc}")]
    Overflow { desc: String },
    #[error("Division by zero while computing {desc}")]
    DivideByZero { desc: String },
    #[error("Value {value} for {field} is outside the storable range [{min}, {max}]")]
    StorageRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
    #[error("Invalid order: {reason}")]
    InvalidOrder { reason: String },
    #[error("Guarantee does not fit within its order: {reason}")]
    InvalidGuarantee { reason: String },
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Settlement out of order for {what}: latest is {latest}, received {received}")]
    OutOfOrder {
        what: String,
        latest: String,
        received: String,
    },
    #[error("Missing state: {name}")]
    MissingState { name: String },
    #[error("Invalid timestamp subtraction during. Action: {desc}. Values: {lhs} - {rhs}")]
    TimestampSubtractUnderflow {
        lhs: Timestamp,
        rhs: Timestamp,
        desc: String,
    },

    #[cfg(test)]
    #[error("This is a test. Number is {number}. String is {string}.")]
    SomeTest { number: u32, string: String },
}

impl PerpError {
    /// Wrap up in an [anyhow::Error]
    pub fn into_anyhow(self) -> anyhow::Error {
        self.into()
    }

    /// Try to extract a [PerpError] from an [anyhow::Error]
    pub fn try_from_anyhow(err: &anyhow::Error) -> Option<&Self> {
        err.downcast_ref()
    }

    /// The snake_case identifier of this error, as it appears in serialized output
    pub fn get_error_id(&self) -> Cow<'static, str> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(o)) => o
                .into_iter()
                .next()
                .map_or("unknown".into(), |(id, _)| id.into()),
            _ => "unknown".into(),
        }
    }
}

/// Construct an [anyhow::Error] from a [PerpError]
#[macro_export]
macro_rules! perp_anyhow {
    ($err:expr) => {{
        $crate::error::PerpError::into_anyhow($err)
    }};
}

/// Return early with a [PerpError]
#[macro_export]
macro_rules! perp_bail {
    ($err:expr) => {{
        return Err($crate::perp_anyhow!($err));
    }};
}

/// Return early with a [PerpError] if the condition does not hold
#[macro_export]
macro_rules! perp_ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            $crate::perp_bail!($err);
        }
    }};
}

/// A standardized format for errors reported to callers of the engine.
#[derive(serde::Serialize)]
pub struct WrappedPerpError {
    id: Cow<'static, str>,
    description: String,
    data: serde_json::Value,
}

impl WrappedPerpError {
    fn from_anyhow_raw(e: anyhow::Error) -> Self {
        WrappedPerpError {
            id: "unknown".into(),
            description: format!("{e:#}"),
            data: serde_json::Value::Null,
        }
    }

    fn from_perp_error(e: &anyhow::Error) -> Option<Self> {
        let e = PerpError::try_from_anyhow(e)?;
        let description = e.to_string();
        let value = serde_json::to_value(e.clone()).ok()?;
        let mut pairs = match value {
            serde_json::Value::Object(o) => o,
            _ => return None,
        }
        .into_iter();
        let (id, data) = pairs.next()?;
        if pairs.next().is_some() {
            return None;
        }
        Some(WrappedPerpError {
            id: id.into(),
            description,
            data,
        })
    }
}

impl From<anyhow::Error> for WrappedPerpError {
    fn from(e: anyhow::Error) -> Self {
        Self::from_perp_error(&e).unwrap_or_else(|| Self::from_anyhow_raw(e))
    }
}
