//! Convenience prelude module.
pub use msg::prelude::*;

pub use crate::checkpoint::CheckpointExt;
pub use crate::market::{Market, SettlementInput};
pub use crate::matching::{match_order, MatchingFill, MatchingResult};
pub use crate::synbook::SynBookExt;
pub use crate::version::{
    AccumulateVersion, VersionAccumulationContext, VersionAccumulationResponse,
};
