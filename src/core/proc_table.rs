use hashbrown::HashMap;
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::Pid;

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Error returned when the process table has reached its capacity.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProcInsertError;

impl Display for ProcInsertError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("too many processes")
  }
}

impl Error for ProcInsertError {}

/// Error returned when attempting to access a process that is not registered.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProcAccessError;

impl Display for ProcAccessError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("invalid process access")
  }
}

impl Error for ProcAccessError {}

// -----------------------------------------------------------------------------
// Process Table
// -----------------------------------------------------------------------------

/// A bounded table mapping process identifiers to process data.
///
/// The table only tracks live processes: entries are inserted when a process
/// starts running and removed once it terminates.
pub struct ProcTable<T> {
  entries: RwLock<HashMap<Pid, T>>,
  capacity: usize,
}

impl<T> ProcTable<T> {
  /// Minimum number of entries a table can hold.
  pub const MIN_ENTRIES: usize = 1 << 4;

  /// Default number of pre-allocated entries.
  pub const DEF_ENTRIES: usize = 1 << 10;

  /// Maximum number of entries a table can hold.
  pub const MAX_ENTRIES: usize = 1 << 20;

  /// Creates a new, empty `ProcTable` with the default capacity.
  #[inline]
  pub fn new() -> Self {
    Self::with_capacity(Self::DEF_ENTRIES)
  }

  /// Creates a new, empty `ProcTable` holding at most `capacity` entries.
  ///
  /// The capacity is clamped to `MIN_ENTRIES..=MAX_ENTRIES`.
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity: usize = capacity.clamp(Self::MIN_ENTRIES, Self::MAX_ENTRIES);

    Self {
      entries: RwLock::new(HashMap::with_capacity(capacity.min(Self::DEF_ENTRIES))),
      capacity,
    }
  }

  /// Returns the maximum number of entries the table can hold.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns the number of registered processes.
  #[inline]
  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  /// Returns `true` if no processes are registered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }

  /// Registers `item` under `pid`, replacing any previous entry.
  ///
  /// # Errors
  ///
  /// Returns [`ProcInsertError`] if the table is full.
  pub fn insert(&self, pid: Pid, item: T) -> Result<(), ProcInsertError> {
    let mut entries = self.entries.write();

    if entries.len() >= self.capacity && !entries.contains_key(&pid) {
      return Err(ProcInsertError);
    }

    entries.insert(pid, item);

    Ok(())
  }

  /// Removes the entry for `pid`, returning it if present.
  #[inline]
  pub fn remove(&self, pid: Pid) -> Option<T> {
    self.entries.write().remove(&pid)
  }

  /// Returns `true` if `pid` is registered.
  #[inline]
  pub fn exists(&self, pid: Pid) -> bool {
    self.entries.read().contains_key(&pid)
  }

  /// Runs `f` with shared access to the entry for `pid`.
  ///
  /// # Errors
  ///
  /// Returns [`ProcAccessError`] if `pid` is not registered.
  pub fn with<F, R>(&self, pid: Pid, f: F) -> Result<R, ProcAccessError>
  where
    F: FnOnce(&T) -> R,
  {
    self.entries.read().get(&pid).map(f).ok_or(ProcAccessError)
  }

  /// Returns the identifiers of every registered process, in ascending order.
  pub fn keys(&self) -> Vec<Pid> {
    let mut keys: Vec<Pid> = self.entries.read().keys().copied().collect();
    keys.sort_unstable();
    keys
  }
}

impl<T> Default for ProcTable<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Debug for ProcTable<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("ProcTable")
      .field("len", &self.len())
      .field("capacity", &self.capacity)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
