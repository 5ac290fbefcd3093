pub use super::{debug_log, log::*, number::*};
pub use crate::event::{CosmwasmEventExt, PerpEvent};
pub use crate::number::Signed;
pub use crate::storage::{StorageRange, StorageRangeCheck};
pub use crate::time::{Duration, Timestamp};
pub use crate::{error::*, perp_anyhow, perp_bail, perp_ensure};
pub use anyhow::{anyhow, bail, Context, Result};
pub use cosmwasm_schema::cw_serde;
pub use cosmwasm_std::{Decimal256, Event, Storage};
pub use cw_storage_plus::{Item, Map};
pub use std::fmt::Display;
pub use std::str::FromStr;
