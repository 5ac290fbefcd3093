//! Storage keys for every record the settlement driver persists.
//!
//! Keys are kept short since they prefix every stored entry. They must never
//! be reused for a different record type.

/// Market-wide accumulator state
pub const GLOBAL: &str = "g";
/// Aggregate market position
pub const POSITION: &str = "p";
/// Market and risk parameters
pub const CONFIG: &str = "c";
/// Accumulated versions, keyed by oracle timestamp
pub const VERSIONS: &str = "v";
/// Oracle versions settled against, keyed by oracle timestamp
pub const ORACLE_VERSIONS: &str = "o";
/// Aggregate guarantees, keyed by order id
pub const GUARANTEES: &str = "gu";
/// Per-account checkpoints
pub const LOCAL_CHECKPOINTS: &str = "lc";
