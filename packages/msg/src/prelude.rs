//! Convenience prelude module.
//!
//! This reexports commonly used identifiers for use by the engine and tools.
pub use shared::prelude::*;

pub use crate::market::checkpoint::{Checkpoint, CheckpointAccumulationResult};
pub use crate::market::config::{
    FeeCurve, MarketParameter, PController, RiskParameter, SettlementConfig, SynBook,
    UtilizationCurve,
};
pub use crate::market::exposure::{Exposure, OrderbookState, Tranche};
pub use crate::market::global::{Global, PAccumulator};
pub use crate::market::guarantee::{Guarantee, StorageScope};
pub use crate::market::oracle::{OracleReceipt, OracleVersion};
pub use crate::market::order::Order;
pub use crate::market::position::Position;
pub use crate::market::result::AccumulationResult;
pub use crate::market::version::{Accumulator, Version};
