//! Channels, guards, alternation, processes, and composition.
//!
//! # Communication
//!
//! - [`Channel`]: One-slot synchronous rendezvous with poison
//! - [`Store`]/[`Slot`]: Payload storage used by channels
//!
//! # Choice
//!
//! - [`Guard`]: The enable/disable/select capability shared by every guard
//! - [`TimerGuard`]: Ready once an armed alarm elapses
//! - [`SkipGuard`]: Always ready
//! - [`Alt`]: Priority, fair, and random selection over guards
//! - [`AltIter`]: Repeated selection until the alternation is exhausted
//!
//! # Processes
//!
//! - [`Process`]: A body running on its own thread or the caller's
//! - [`Par`]/[`Seq`]: Concurrent and sequential composition
//! - [`Barrier`]: Reusable multi-party synchronization
//! - [`Runtime`]: Explicit registry of running processes

mod alt;
mod barrier;
mod channel;
mod exit;
mod guard;
mod par;
mod process;
mod runtime;
mod seq;
mod skip;
mod store;
mod timer;

pub use self::alt::Alt;
pub use self::alt::AltGuard;
pub use self::alt::AltIter;
pub use self::alt::AltPhase;
pub use self::alt::Selected;
pub use self::barrier::Barrier;
pub use self::channel::Channel;
pub use self::exit::Exit;
pub use self::guard::AltSignal;
pub use self::guard::Guard;
pub use self::guard::Poison;
pub use self::par::Par;
pub use self::process::Process;
pub use self::process::ProcessConfig;
pub use self::process::ProcessInfo;
pub use self::process::ProcessState;
pub use self::runtime::Runtime;
pub use self::runtime::RuntimeConfig;
pub use self::seq::Seq;
pub use self::skip::SkipGuard;
pub use self::store::Slot;
pub use self::store::Store;
pub use self::timer::TimerGuard;
