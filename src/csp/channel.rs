use crossbeam_utils::CachePadded;
use parking_lot::Condvar;
use parking_lot::Mutex;
use parking_lot::MutexGuard;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::marker::PhantomData;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use triomphe::Arc;

use crate::consts::CAP_CHANNEL_ALTS;
use crate::csp::AltSignal;
use crate::csp::Guard;
use crate::csp::Poison;
use crate::csp::Slot;
use crate::csp::Store;
use crate::error::CspError;
use crate::error::fatal;
use crate::raise;

// -----------------------------------------------------------------------------
// Channel
// -----------------------------------------------------------------------------

/// A synchronous, one-slot rendezvous channel.
///
/// A [`write`] blocks until a reader takes the value and a [`read`] blocks
/// until a writer offers one; both sides unblock together once the value has
/// moved across. Writers serialize on the channel, so any number of writers
/// may share it, each handshake pairing exactly one write with exactly one
/// read.
///
/// `Channel` is a cheap handle: clones refer to the same channel.
///
/// # Store
///
/// The value in flight lives in a [`Store`]. [`Channel::new`] uses the
/// in-memory [`Slot`]; [`Channel::with_store`] accepts any other store, for
/// example one that maps values to bytes.
///
/// # Poison
///
/// [`poison`] closes the channel permanently. Every blocked and every future
/// `write`/`read`/`select` fails with [`CspError::Poisoned`].
///
/// [`write`]: Channel::write
/// [`read`]: Channel::read
/// [`poison`]: Channel::poison
pub struct Channel<T, S = Slot<T>> {
  inner: Arc<ChannelData<S>>,
  marker: PhantomData<fn(T) -> T>,
}

struct ChannelData<S> {
  id: u64,
  /// Held by a writer for the whole handshake.
  wlock: CachePadded<Mutex<()>>,
  state: CachePadded<Mutex<ChannelState<S>>>,
  cond: Condvar,
}

struct ChannelState<S> {
  store: S,
  taken: bool,
  poisoned: bool,
  alts: Vec<AltSignal>,
}

impl<T> Channel<T>
where
  T: Send,
{
  /// Creates a new channel backed by an in-memory [`Slot`].
  #[inline]
  pub fn new() -> Self {
    Self::with_store(Slot::new())
  }
}

impl<T, S> Channel<T, S>
where
  T: Send,
  S: Store<T>,
{
  /// Creates a new channel that moves values through `store`.
  ///
  /// # Panics
  ///
  /// Panics if `store` already holds a value.
  pub fn with_store(store: S) -> Self {
    static ID: AtomicU64 = AtomicU64::new(1);

    if store.is_full() {
      raise!(Error, BadArg, "channel store is not empty");
    }

    Self {
      inner: Arc::new(ChannelData {
        id: ID.fetch_add(1, Ordering::Relaxed),
        wlock: CachePadded::new(Mutex::new(())),
        state: CachePadded::new(Mutex::new(ChannelState {
          store,
          taken: false,
          poisoned: false,
          alts: Vec::with_capacity(CAP_CHANNEL_ALTS),
        })),
        cond: Condvar::new(),
      }),
      marker: PhantomData,
    }
  }

  /// Returns the unique identifier of this channel.
  #[inline]
  pub fn id(&self) -> u64 {
    self.inner.id
  }

  /// Writes `item` to the channel, blocking until a reader takes it.
  ///
  /// # Errors
  ///
  /// Returns [`CspError::Poisoned`] if the channel is poisoned before the
  /// value is taken. The value is dropped in that case.
  pub fn write(&self, item: T) -> Result<(), CspError> {
    let _writer: MutexGuard<'_, ()> = self.inner.wlock.lock();
    let mut state: MutexGuard<'_, ChannelState<S>> = self.inner.state.lock();

    if state.poisoned {
      return Err(CspError::Poisoned);
    }

    if state.store.put(item).is_err() {
      fatal!("channel store occupied outside of a handshake");
    }

    state.taken = false;

    for signal in state.alts.iter() {
      signal.notify();
    }

    self.inner.cond.notify_all();

    while !state.taken && !state.poisoned {
      self.inner.cond.wait(&mut state);
    }

    if state.taken {
      state.taken = false;
      tracing::trace!(target: "csprt", channel = %self, "write committed");
      return Ok(());
    }

    let item: Option<T> = state.store.get();

    drop(state);
    drop(item);

    Err(CspError::Poisoned)
  }

  /// Reads a value from the channel, blocking until a writer offers one.
  ///
  /// # Errors
  ///
  /// Returns [`CspError::Poisoned`] if the channel is, or becomes, poisoned.
  pub fn read(&self) -> Result<T, CspError> {
    let mut state: MutexGuard<'_, ChannelState<S>> = self.inner.state.lock();

    loop {
      if state.poisoned {
        return Err(CspError::Poisoned);
      }

      if let Some(item) = self.inner.take(&mut state) {
        tracing::trace!(target: "csprt", channel = %self, "read committed");
        return Ok(item);
      }

      self.inner.cond.wait(&mut state);
    }
  }

  /// Poisons the channel, waking every blocked reader, writer, and
  /// alternation. Idempotent.
  pub fn poison(&self) {
    let mut state: MutexGuard<'_, ChannelState<S>> = self.inner.state.lock();

    if state.poisoned {
      return;
    }

    state.poisoned = true;

    for signal in state.alts.iter() {
      signal.notify();
    }

    self.inner.cond.notify_all();

    drop(state);

    tracing::debug!(target: "csprt", channel = %self, "channel poisoned");
  }

  /// Returns `true` if the channel has been poisoned.
  #[inline]
  pub fn is_poisoned(&self) -> bool {
    self.inner.state.lock().poisoned
  }

  /// Takes the value offered by a waiting writer without blocking.
  ///
  /// Returns `None` if no value is on offer (another alternation won the
  /// race) or the channel is poisoned.
  pub(crate) fn try_take(&self) -> Option<T> {
    let mut state: MutexGuard<'_, ChannelState<S>> = self.inner.state.lock();

    if state.poisoned {
      return None;
    }

    self.inner.take(&mut state)
  }

  /// Returns `true` if both handles refer to the same channel.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl<S> ChannelData<S> {
  /// Completes the reader side of a handshake.
  fn take<T>(&self, state: &mut ChannelState<S>) -> Option<T>
  where
    S: Store<T>,
  {
    let item: T = state.store.get()?;

    state.taken = true;
    self.cond.notify_all();

    Some(item)
  }
}

impl<T, S> Guard for Channel<T, S>
where
  T: Send,
  S: Store<T>,
{
  type Output = T;

  fn enable(&self, signal: &AltSignal) {
    let mut state: MutexGuard<'_, ChannelState<S>> = self.inner.state.lock();

    if !state.alts.iter().any(|other| other.ptr_eq(signal)) {
      state.alts.push(signal.clone());
    }
  }

  fn disable(&self, signal: &AltSignal) {
    self
      .inner
      .state
      .lock()
      .alts
      .retain(|other| !other.ptr_eq(signal));
  }

  fn is_selectable(&self) -> bool {
    let state: MutexGuard<'_, ChannelState<S>> = self.inner.state.lock();
    !state.poisoned && state.store.is_full()
  }

  #[inline]
  fn select(&self) -> Result<T, CspError> {
    self.read()
  }

  #[inline]
  fn is_usable(&self) -> bool {
    !self.is_poisoned()
  }
}

impl<T, S> Poison for Channel<T, S>
where
  T: Send,
  S: Store<T>,
{
  #[inline]
  fn poison(&self) {
    Channel::poison(self)
  }

  #[inline]
  fn is_poisoned(&self) -> bool {
    Channel::is_poisoned(self)
  }
}

impl<T, S> Clone for Channel<T, S> {
  #[inline]
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
      marker: PhantomData,
    }
  }
}

impl<T, S> Default for Channel<T, S>
where
  T: Send,
  S: Store<T> + Default,
{
  #[inline]
  fn default() -> Self {
    Self::with_store(S::default())
  }
}

impl<T, S> Debug for Channel<T, S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Channel")
      .field("id", &self.inner.id)
      .finish_non_exhaustive()
  }
}

impl<T, S> Display for Channel<T, S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "#Chan<{}>", self.inner.id)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
