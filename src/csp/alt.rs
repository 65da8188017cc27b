use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Instant;

use crate::csp::AltSignal;
use crate::csp::Channel;
use crate::csp::Guard;
use crate::csp::SkipGuard;
use crate::csp::Slot;
use crate::csp::Store;
use crate::csp::TimerGuard;
use crate::error::CspError;
use crate::raise;
use crate::utils::Rng;

// -----------------------------------------------------------------------------
// Alt Guard
// -----------------------------------------------------------------------------

/// A guard held by an [`Alt`].
///
/// The set of guard kinds is closed; convert any of them with `From`/`Into`.
#[derive(Debug)]
pub enum AltGuard<T, S = Slot<T>> {
  Channel(Channel<T, S>),
  Timer(TimerGuard),
  Skip(SkipGuard),
}

impl<T, S> AltGuard<T, S>
where
  T: Send,
  S: Store<T>,
{
  /// Claims the guard without blocking.
  ///
  /// Returns `None` if the readiness observed earlier has been consumed by
  /// someone else in the meantime.
  fn claim(&self) -> Option<Selected<T>> {
    match self {
      Self::Channel(chan) => chan.try_take().map(Selected::Message),
      Self::Timer(timer) => timer.select().ok().map(|()| Selected::Timeout),
      Self::Skip(_) => Some(Selected::Skip),
    }
  }

  /// Returns the guarded channel, if this is a channel guard.
  #[inline]
  pub fn as_channel(&self) -> Option<&Channel<T, S>> {
    match self {
      Self::Channel(chan) => Some(chan),
      Self::Timer(_) | Self::Skip(_) => None,
    }
  }
}

impl<T, S> Guard for AltGuard<T, S>
where
  T: Send,
  S: Store<T>,
{
  type Output = Selected<T>;

  fn enable(&self, signal: &AltSignal) {
    match self {
      Self::Channel(chan) => chan.enable(signal),
      Self::Timer(timer) => timer.enable(signal),
      Self::Skip(skip) => skip.enable(signal),
    }
  }

  fn disable(&self, signal: &AltSignal) {
    match self {
      Self::Channel(chan) => chan.disable(signal),
      Self::Timer(timer) => timer.disable(signal),
      Self::Skip(skip) => skip.disable(signal),
    }
  }

  fn is_selectable(&self) -> bool {
    match self {
      Self::Channel(chan) => chan.is_selectable(),
      Self::Timer(timer) => timer.is_selectable(),
      Self::Skip(skip) => skip.is_selectable(),
    }
  }

  fn select(&self) -> Result<Selected<T>, CspError> {
    match self {
      Self::Channel(chan) => chan.select().map(Selected::Message),
      Self::Timer(timer) => timer.select().map(|()| Selected::Timeout),
      Self::Skip(skip) => skip.select().map(|()| Selected::Skip),
    }
  }

  fn is_usable(&self) -> bool {
    match self {
      Self::Channel(chan) => chan.is_usable(),
      Self::Timer(timer) => timer.is_usable(),
      Self::Skip(skip) => skip.is_usable(),
    }
  }

  fn deadline(&self) -> Option<Instant> {
    match self {
      Self::Channel(chan) => chan.deadline(),
      Self::Timer(timer) => timer.deadline(),
      Self::Skip(skip) => skip.deadline(),
    }
  }
}

impl<T, S> Clone for AltGuard<T, S> {
  fn clone(&self) -> Self {
    match self {
      Self::Channel(chan) => Self::Channel(chan.clone()),
      Self::Timer(timer) => Self::Timer(timer.clone()),
      Self::Skip(skip) => Self::Skip(*skip),
    }
  }
}

impl<T, S> From<Channel<T, S>> for AltGuard<T, S> {
  #[inline]
  fn from(other: Channel<T, S>) -> Self {
    Self::Channel(other)
  }
}

impl<T, S> From<&Channel<T, S>> for AltGuard<T, S> {
  #[inline]
  fn from(other: &Channel<T, S>) -> Self {
    Self::Channel(other.clone())
  }
}

impl<T, S> From<TimerGuard> for AltGuard<T, S> {
  #[inline]
  fn from(other: TimerGuard) -> Self {
    Self::Timer(other)
  }
}

impl<T, S> From<&TimerGuard> for AltGuard<T, S> {
  #[inline]
  fn from(other: &TimerGuard) -> Self {
    Self::Timer(other.clone())
  }
}

impl<T, S> From<SkipGuard> for AltGuard<T, S> {
  #[inline]
  fn from(other: SkipGuard) -> Self {
    Self::Skip(other)
  }
}

// -----------------------------------------------------------------------------
// Selected
// -----------------------------------------------------------------------------

/// The outcome of a successful alternation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selected<T> {
  /// A channel guard won; carries the value read.
  Message(T),
  /// A timer guard's alarm went off.
  Timeout,
  /// A skip guard won.
  Skip,
}

impl<T> Selected<T> {
  /// Returns the message carried by a channel selection.
  #[inline]
  pub fn into_message(self) -> Option<T> {
    match self {
      Self::Message(item) => Some(item),
      Self::Timeout | Self::Skip => None,
    }
  }

  #[inline]
  pub const fn is_message(&self) -> bool {
    matches!(self, Self::Message(_))
  }

  #[inline]
  pub const fn is_timeout(&self) -> bool {
    matches!(self, Self::Timeout)
  }

  #[inline]
  pub const fn is_skip(&self) -> bool {
    matches!(self, Self::Skip)
  }
}

// -----------------------------------------------------------------------------
// Alt Phase
// -----------------------------------------------------------------------------

/// The stage of an alternation round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AltPhase {
  Idle,
  Enabling,
  Waiting,
  Committing,
}

impl Display for AltPhase {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Idle => f.write_str("idle"),
      Self::Enabling => f.write_str("enabling"),
      Self::Waiting => f.write_str("waiting"),
      Self::Committing => f.write_str("committing"),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Policy {
  Priority,
  Fair,
  Random,
}

// -----------------------------------------------------------------------------
// Alt
// -----------------------------------------------------------------------------

/// Guarded choice over an ordered list of guards.
///
/// Each select runs one round of the enable/wait/commit protocol and returns
/// the payload of exactly one winning guard. The guard's index in the list is
/// its priority; lower indices win ties under [`pri_select`].
///
/// # Policies
///
/// - [`pri_select`]: the ready guard with the lowest index.
/// - [`fair_select`]: the first ready guard after the previous winner,
///   wrapping around. A persistently ready guard cannot starve the others.
/// - [`select`]: a uniformly random ready guard.
///
/// # Errors
///
/// All selects return [`CspError::Exhausted`] when the alternation has no
/// guards, or when none of its guards can ever become ready again (every
/// channel poisoned and every timer unarmed).
///
/// # Iteration
///
/// [`iter_pri`], [`iter_fair`], and [`iter_random`] repeat a select until the
/// alternation is exhausted.
///
/// [`pri_select`]: Alt::pri_select
/// [`fair_select`]: Alt::fair_select
/// [`select`]: Alt::select
/// [`iter_pri`]: Alt::iter_pri
/// [`iter_fair`]: Alt::iter_fair
/// [`iter_random`]: Alt::iter_random
pub struct Alt<T, S = Slot<T>> {
  guards: Vec<AltGuard<T, S>>,
  last_selected: Option<usize>,
  phase: AltPhase,
  signal: AltSignal,
  rng: Rng,
}

impl<T, S> Alt<T, S>
where
  T: Send,
  S: Store<T>,
{
  /// Creates a new alternation over `guards`.
  pub fn new<I, G>(guards: I) -> Self
  where
    I: IntoIterator<Item = G>,
    G: Into<AltGuard<T, S>>,
  {
    Self {
      guards: guards.into_iter().map(Into::into).collect(),
      last_selected: None,
      phase: AltPhase::Idle,
      signal: AltSignal::new(),
      rng: Rng::from_entropy(),
    }
  }

  /// Selects the ready guard with the lowest index.
  #[inline]
  pub fn pri_select(&mut self) -> Result<Selected<T>, CspError> {
    self.choose(Policy::Priority)
  }

  /// Selects the first ready guard after the previous winner.
  #[inline]
  pub fn fair_select(&mut self) -> Result<Selected<T>, CspError> {
    self.choose(Policy::Fair)
  }

  /// Selects a uniformly random ready guard.
  #[inline]
  pub fn select(&mut self) -> Result<Selected<T>, CspError> {
    self.choose(Policy::Random)
  }

  /// Returns an iterator that repeats [`pri_select`] until exhaustion.
  ///
  /// [`pri_select`]: Alt::pri_select
  #[inline]
  pub fn iter_pri(&mut self) -> AltIter<'_, T, S> {
    AltIter::new(self, Policy::Priority)
  }

  /// Returns an iterator that repeats [`fair_select`] until exhaustion.
  ///
  /// [`fair_select`]: Alt::fair_select
  #[inline]
  pub fn iter_fair(&mut self) -> AltIter<'_, T, S> {
    AltIter::new(self, Policy::Fair)
  }

  /// Returns an iterator that repeats [`select`] until exhaustion.
  ///
  /// [`select`]: Alt::select
  #[inline]
  pub fn iter_random(&mut self) -> AltIter<'_, T, S> {
    AltIter::new(self, Policy::Random)
  }

  /// Poisons every channel guard.
  pub fn poison(&self) {
    for guard in self.guards.iter() {
      if let AltGuard::Channel(chan) = guard {
        chan.poison();
      }
    }
  }

  /// Returns `true` while at least one guard can still become ready.
  pub fn has_next(&self) -> bool {
    self.guards.iter().any(Guard::is_usable)
  }

  /// Returns the number of guards.
  #[inline]
  pub fn guard_len(&self) -> usize {
    self.guards.len()
  }

  /// Returns the index of the most recent winner.
  #[inline]
  pub fn last_selected(&self) -> Option<usize> {
    self.last_selected
  }

  /// Returns the current phase of the alternation.
  #[inline]
  pub fn phase(&self) -> AltPhase {
    self.phase
  }

  /// Returns the guards, in priority order.
  #[inline]
  pub fn guards(&self) -> &[AltGuard<T, S>] {
    &self.guards
  }

  // ---------------------------------------------------------------------------
  // Round Protocol
  // ---------------------------------------------------------------------------

  fn choose(&mut self, policy: Policy) -> Result<Selected<T>, CspError> {
    if self.phase != AltPhase::Idle {
      raise!(Error, IllegalState, format!("alternation is {}", self.phase));
    }

    if self.guards.is_empty() {
      return Err(CspError::Exhausted);
    }

    loop {
      let order: Vec<usize> = self.order(policy);

      self.phase = AltPhase::Enabling;
      self.signal.reset();

      let mut enabled: usize = 0;
      let mut winner: Option<usize> = None;

      for index in order.iter().copied() {
        self.guards[index].enable(&self.signal);
        enabled += 1;

        if policy != Policy::Random && self.guards[index].is_selectable() {
          winner = Some(index);
          break;
        }
      }

      let winner: usize = match winner {
        Some(index) => index,
        None => {
          self.phase = AltPhase::Waiting;

          match self.wait(&order, policy) {
            Some(index) => index,
            None => {
              self.disable(&order, None);
              self.phase = AltPhase::Idle;

              tracing::trace!(target: "csprt", policy = ?policy, "alternation exhausted");

              return Err(CspError::Exhausted);
            }
          }
        }
      };

      self.phase = AltPhase::Committing;
      self.disable(&order[..enabled], Some(winner));

      let claim: Option<Selected<T>> = self.guards[winner].claim();

      self.guards[winner].disable(&self.signal);
      self.phase = AltPhase::Idle;

      if let Some(selected) = claim {
        self.last_selected = Some(winner);
        tracing::trace!(target: "csprt", index = winner, policy = ?policy, "alternation selected");
        return Ok(selected);
      }

      tracing::trace!(target: "csprt", index = winner, "alternation lost claim, retrying");
    }
  }

  /// Returns guard indices in the order they are enabled and polled.
  fn order(&self, policy: Policy) -> Vec<usize> {
    let count: usize = self.guards.len();

    let start: usize = match (policy, self.last_selected) {
      (Policy::Fair, Some(last)) => (last + 1) % count,
      _ => 0,
    };

    (0..count).map(|offset| (start + offset) % count).collect()
  }

  /// Blocks until a guard in `order` is ready.
  ///
  /// Returns `None` if no guard can ever become ready.
  fn wait(&mut self, order: &[usize], policy: Policy) -> Option<usize> {
    loop {
      if let Some(index) = self.ready(order, policy) {
        return Some(index);
      }

      if !order.iter().any(|index| self.guards[*index].is_usable()) {
        return None;
      }

      let deadline: Option<Instant> = order
        .iter()
        .filter_map(|index| self.guards[*index].deadline())
        .min();

      self.signal.wait(deadline);
    }
  }

  fn ready(&mut self, order: &[usize], policy: Policy) -> Option<usize> {
    if policy != Policy::Random {
      return order
        .iter()
        .copied()
        .find(|index| self.guards[*index].is_selectable());
    }

    let ready: Vec<usize> = order
      .iter()
      .copied()
      .filter(|index| self.guards[*index].is_selectable())
      .collect();

    if ready.is_empty() {
      None
    } else {
      Some(ready[self.rng.next_usize(ready.len())])
    }
  }

  fn disable(&self, order: &[usize], except: Option<usize>) {
    for index in order.iter().copied() {
      if Some(index) != except {
        self.guards[index].disable(&self.signal);
      }
    }
  }
}

impl<T, S> Debug for Alt<T, S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Alt")
      .field("guards", &self.guards.len())
      .field("last_selected", &self.last_selected)
      .field("phase", &self.phase)
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Alt Iterator
// -----------------------------------------------------------------------------

/// Repeated selection over an [`Alt`].
///
/// Yields one [`Selected`] per round and ends once the alternation is
/// exhausted. Use [`Iterator::take`] to bound the number of rounds.
pub struct AltIter<'a, T, S = Slot<T>> {
  alt: &'a mut Alt<T, S>,
  policy: Policy,
}

impl<'a, T, S> AltIter<'a, T, S> {
  #[inline]
  fn new(alt: &'a mut Alt<T, S>, policy: Policy) -> Self {
    Self { alt, policy }
  }
}

impl<T, S> Iterator for AltIter<'_, T, S>
where
  T: Send,
  S: Store<T>,
{
  type Item = Selected<T>;

  fn next(&mut self) -> Option<Self::Item> {
    self.alt.choose(self.policy).ok()
  }
}

impl<T, S> Debug for AltIter<'_, T, S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("AltIter")
      .field("alt", &self.alt)
      .field("policy", &self.policy)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
