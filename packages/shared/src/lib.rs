//! Utilities common to all settlement crates

#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

pub mod error;
pub mod event;
/// Feature-gated logging functionality
pub mod log;
pub mod namespace;
/// Fixed-point number types and helpers
pub mod number;
/// Exports very commonly used items into the prelude glob
pub mod prelude;
pub mod storage;
pub mod time;
