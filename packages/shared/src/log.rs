// (un)comment these as needed for a given debugging session
#[cfg(feature = "debug_log")]
static DEBUG_LOG_FLAGS: &[DebugLog] = &[
    DebugLog::VersionAccumulate,
    // DebugLog::Matching,
    // DebugLog::Funding,
    // DebugLog::Interest,
    // DebugLog::Checkpoint,
    // DebugLog::Storage,
];

/// Stages of settlement that can be traced with [crate::debug_log]
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DebugLog {
    VersionAccumulate,
    Matching,
    Funding,
    Interest,
    Checkpoint,
    Storage,
}

/// internal-only, used by the macro
#[cfg(feature = "debug_log")]
pub fn debug_log_inner(flag: DebugLog, s: &str) {
    if DEBUG_LOG_FLAGS.contains(&flag) {
        println!("[{flag:?}] {s}");
    }
}

/// Print when the stage is listed in DEBUG_LOG_FLAGS, no-op without the
/// debug_log feature
#[cfg(feature = "debug_log")]
#[macro_export]
macro_rules! debug_log {
    ($flag:expr, $($t:tt)*) => {{
        $crate::log::debug_log_inner($flag, &format!($($t)*));
    }};
}

/// Print when the stage is listed in DEBUG_LOG_FLAGS, no-op without the
/// debug_log feature
#[cfg(not(feature = "debug_log"))]
#[macro_export]
macro_rules! debug_log {
    ($flag:expr, $($t:tt)*) => {{}};
}
