//! Settlement engine for a perpetual-futures market.
//!
//! Everything up to [market] is pure: functions take records by reference
//! and hand back new ones. [market::Market] is the only place that reads or
//! writes storage.
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

pub mod checkpoint;
pub mod market;
pub mod matching;
pub mod prelude;
pub mod synbook;
pub mod version;

/// Reexport the message crate.
pub use msg;
