//! Fundamental runtime types: process identifiers and the process table.
//!
//! - [`Pid`]: Stable, process-unique identifier
//! - [`ProcTable`]: Registry of live processes owned by a [`Runtime`]
//!
//! [`Runtime`]: crate::csp::Runtime

mod pid;
mod proc_table;

pub use self::pid::Pid;
pub use self::proc_table::ProcAccessError;
pub use self::proc_table::ProcInsertError;
pub use self::proc_table::ProcTable;
