//! Market-level settlement records.
//!
//! Every record here is a plain value. Nothing in this module touches
//! storage; the engine crate decides when records are read and written.
//! Sizes are [UFixed6](shared::number::UFixed6) magnitudes, while anything
//! carrying a direction (prices, exposures, accumulated values) is a
//! [Fixed6](shared::number::Fixed6).

pub mod checkpoint;
pub mod config;
pub mod events;
pub mod exposure;
pub mod global;
pub mod guarantee;
pub mod oracle;
pub mod order;
pub mod position;
pub mod result;
pub mod version;
