//! Internal process state shared between process handles and their thread.
//!
//! # Architecture
//!
//! Process data is split by access pattern:
//!
//! - [`ProcReadOnly`]: Immutable data accessible without locks
//! - `ProcInternal`: Lifecycle state protected by a [`Mutex`] and paired
//!   with a [`Condvar`] that announces termination
//!
//! # Lifetime Management
//!
//! [`ProcTask`] owns a running process and finalizes it on drop: the exit
//! reason is recorded, the process is marked terminated, removed from its
//! process table, and joiners are woken. Drop runs even when the body
//! panics, so a process always reaches its terminal state.
//!
//! [`Mutex`]: ::parking_lot::Mutex
//! [`Condvar`]: ::parking_lot::Condvar

mod proc_data;
mod proc_task;

pub(crate) use self::proc_data::ProcBody;
pub(crate) use self::proc_data::ProcData;
pub(crate) use self::proc_data::ProcReadOnly;
pub(crate) use self::proc_data::ProcTableRef;
pub(crate) use self::proc_task::ProcTask;
