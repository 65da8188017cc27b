use crate::core::ProcTable;

// -----------------------------------------------------------------------------
// System - Process Threads
// -----------------------------------------------------------------------------

/// Stack size (in bytes) for process threads.
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Prefix used when naming process threads.
///
/// Threads are named `{prefix}-{pid}`.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "csp-proc";

// -----------------------------------------------------------------------------
// System - Process Identifiers
// -----------------------------------------------------------------------------

/// Maximum value of a process identifier.
///
/// Exceeding this value is a fatal runtime error.
pub const MAX_PID: u64 = (1 << 48) - 1;

// -----------------------------------------------------------------------------
// System - Memory Allocation
// -----------------------------------------------------------------------------

/// Number of pre-allocated entries in the process table.
pub const CAP_REGISTERED_PROCS: usize = ProcTable::<()>::DEF_ENTRIES;

/// Number of pre-allocated channel links per process.
pub const CAP_PROC_LINKS: usize = 4;

/// Number of pre-allocated alternation registrations per channel.
pub const CAP_CHANNEL_ALTS: usize = 1;
