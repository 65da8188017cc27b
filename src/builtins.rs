//! Plug-and-play process bodies.
//!
//! Every builtin returns a ready [`Process`] linked to all of its channels.
//! Each one loops until one of its channels is poisoned, then exits
//! abnormally, which poisons the rest of its channels and so shuts down the
//! surrounding network.
//!
//! ```no_run
//! use csprt::builtins;
//! use csprt::csp::Channel;
//! use csprt::csp::Par;
//!
//! let a: Channel<u64> = Channel::new();
//! let b: Channel<u64> = Channel::new();
//!
//! Par::new([
//!   builtins::generate(a.clone()),
//!   builtins::succ(a, b.clone()),
//!   builtins::sink(b, |item| println!("{item}")),
//! ])
//! .start();
//! ```

use std::ops::Add;
use std::ops::Mul;
use std::ops::Sub;
use std::time::Duration;

use crate::csp::Alt;
use crate::csp::Channel;
use crate::csp::Process;
use crate::csp::TimerGuard;

// -----------------------------------------------------------------------------
// Sources
// -----------------------------------------------------------------------------

/// Writes a stream of zeroes (`T::default()`) to `cout`.
pub fn zeroes<T>(cout: Channel<T>) -> Process
where
  T: Default + Send + 'static,
{
  let proc: Process = Process::new({
    let cout: Channel<T> = cout.clone();
    move || loop {
      cout.write(T::default())?;
    }
  });

  proc.link(&cout);
  proc
}

/// Writes `0, 1, 2, ...` to `cout`.
///
/// Poisons `cout` and exits once the counter would overflow.
pub fn generate(cout: Channel<u64>) -> Process {
  let proc: Process = Process::new({
    let cout: Channel<u64> = cout.clone();
    move || {
      let mut counter: u64 = 0;

      loop {
        cout.write(counter)?;

        let Some(next) = counter.checked_add(1) else {
          cout.poison();
          return Ok(());
        };

        counter = next;
      }
    }
  });

  proc.link(&cout);
  proc
}

/// Writes successive Fibonacci numbers, starting `1, 1, 2, ...`, to `cout`.
///
/// Poisons `cout` and exits once the sequence would overflow.
pub fn fibonacci(cout: Channel<u64>) -> Process {
  let proc: Process = Process::new({
    let cout: Channel<u64> = cout.clone();
    move || {
      let mut a: u64 = 1;
      let mut b: u64 = 1;

      loop {
        cout.write(a)?;

        let Some(next) = a.checked_add(b) else {
          cout.write(b)?;
          cout.poison();
          return Ok(());
        };

        a = b;
        b = next;
      }
    }
  });

  proc.link(&cout);
  proc
}

/// Writes `()` to `cout` every `resolution`.
pub fn clock(cout: Channel<()>, resolution: Duration) -> Process {
  let proc: Process = Process::new({
    let cout: Channel<()> = cout.clone();
    move || {
      let timer: TimerGuard = TimerGuard::new();

      loop {
        timer.sleep(resolution);
        cout.write(())?;
      }
    }
  });

  proc.link(&cout);
  proc
}

// -----------------------------------------------------------------------------
// Filters
// -----------------------------------------------------------------------------

/// Copies every value from `cin` to `cout`.
pub fn id<T>(cin: Channel<T>, cout: Channel<T>) -> Process
where
  T: Send + 'static,
{
  map(cin, cout, |item| item)
}

/// Writes `item + 1` for every `item` read.
pub fn succ<T>(cin: Channel<T>, cout: Channel<T>) -> Process
where
  T: Add<Output = T> + From<u8> + Send + 'static,
{
  map(cin, cout, |item| item + T::from(1))
}

/// Writes `item - 1` for every `item` read.
pub fn pred<T>(cin: Channel<T>, cout: Channel<T>) -> Process
where
  T: Sub<Output = T> + From<u8> + Send + 'static,
{
  map(cin, cout, |item| item - T::from(1))
}

/// Writes `item * scale` for every `item` read.
pub fn mult<T>(cin: Channel<T>, cout: Channel<T>, scale: T) -> Process
where
  T: Mul<Output = T> + Clone + Send + 'static,
{
  map(cin, cout, move |item| item * scale.clone())
}

/// Writes `f(item)` for every `item` read.
pub fn map<T, U, F>(cin: Channel<T>, cout: Channel<U>, mut f: F) -> Process
where
  T: Send + 'static,
  U: Send + 'static,
  F: FnMut(T) -> U + Send + 'static,
{
  let proc: Process = Process::new({
    let cin: Channel<T> = cin.clone();
    let cout: Channel<U> = cout.clone();
    move || loop {
      cout.write(f(cin.read()?))?;
    }
  });

  proc.link(&cin);
  proc.link(&cout);
  proc
}

/// Writes `item` first, then copies every value from `cin` to `cout`.
pub fn prefix<T>(cin: Channel<T>, cout: Channel<T>, item: T) -> Process
where
  T: Send + 'static,
{
  let proc: Process = Process::new({
    let cin: Channel<T> = cin.clone();
    let cout: Channel<T> = cout.clone();
    move || {
      cout.write(item)?;

      loop {
        cout.write(cin.read()?)?;
      }
    }
  });

  proc.link(&cin);
  proc.link(&cout);
  proc
}

/// Writes `item` to `cout` after `delay`, for every `item` read.
pub fn fixed_delay<T>(cin: Channel<T>, cout: Channel<T>, delay: Duration) -> Process
where
  T: Send + 'static,
{
  map(cin, cout, move |item| {
    Process::sleep(delay);
    item
  })
}

/// Copies every value read to both `cout1` and `cout2`, in that order.
pub fn delta2<T>(cin: Channel<T>, cout1: Channel<T>, cout2: Channel<T>) -> Process
where
  T: Clone + Send + 'static,
{
  let proc: Process = Process::new({
    let cin: Channel<T> = cin.clone();
    let cout1: Channel<T> = cout1.clone();
    let cout2: Channel<T> = cout2.clone();
    move || loop {
      let item: T = cin.read()?;
      cout1.write(item.clone())?;
      cout2.write(item)?;
    }
  });

  proc.link(&cin);
  proc.link(&cout1);
  proc.link(&cout2);
  proc
}

// -----------------------------------------------------------------------------
// Combinators
// -----------------------------------------------------------------------------

/// Merges `cin1` and `cin2` into `cout`, alternating fairly between inputs
/// that are ready.
pub fn mux2<T>(cin1: Channel<T>, cin2: Channel<T>, cout: Channel<T>) -> Process
where
  T: Send + 'static,
{
  let proc: Process = Process::new({
    let mut alt: Alt<T> = Alt::new([&cin1, &cin2]);
    let cout: Channel<T> = cout.clone();
    move || loop {
      if let Some(item) = alt.fair_select()?.into_message() {
        cout.write(item)?;
      }
    }
  });

  proc.link(&cin1);
  proc.link(&cin2);
  proc.link(&cout);
  proc
}

/// Writes `f(a, b)` for every pair read from `cin1` then `cin2`.
pub fn zip_with<A, B, U, F>(
  cin1: Channel<A>,
  cin2: Channel<B>,
  cout: Channel<U>,
  mut f: F,
) -> Process
where
  A: Send + 'static,
  B: Send + 'static,
  U: Send + 'static,
  F: FnMut(A, B) -> U + Send + 'static,
{
  let proc: Process = Process::new({
    let cin1: Channel<A> = cin1.clone();
    let cin2: Channel<B> = cin2.clone();
    let cout: Channel<U> = cout.clone();
    move || loop {
      let a: A = cin1.read()?;
      let b: B = cin2.read()?;
      cout.write(f(a, b))?;
    }
  });

  proc.link(&cin1);
  proc.link(&cin2);
  proc.link(&cout);
  proc
}

/// Writes the sum of every pair read from `cin1` then `cin2`.
pub fn pairs<T>(cin1: Channel<T>, cin2: Channel<T>, cout: Channel<T>) -> Process
where
  T: Add<Output = T> + Send + 'static,
{
  zip_with(cin1, cin2, cout, |a, b| a + b)
}

// -----------------------------------------------------------------------------
// Sinks
// -----------------------------------------------------------------------------

/// Reads and discards every value from `cin`.
pub fn blackhole<T>(cin: Channel<T>) -> Process
where
  T: Send + 'static,
{
  sink(cin, drop)
}

/// Calls `f` with every value read from `cin`.
pub fn sink<T, F>(cin: Channel<T>, mut f: F) -> Process
where
  T: Send + 'static,
  F: FnMut(T) + Send + 'static,
{
  let proc: Process = Process::new({
    let cin: Channel<T> = cin.clone();
    move || loop {
      f(cin.read()?);
    }
  });

  proc.link(&cin);
  proc
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::builtins;
  use crate::csp::Channel;
  use crate::csp::Exit;
  use crate::csp::Par;
  use crate::csp::Process;
  use crate::error::CspError;

  fn take<T>(cin: Channel<T>, count: usize) -> (Process, Channel<Vec<T>>)
  where
    T: Send + 'static,
  {
    let out: Channel<Vec<T>> = Channel::new();
    let res: Channel<Vec<T>> = out.clone();

    let proc: Process = Process::new(move || {
      let mut items: Vec<T> = Vec::with_capacity(count);

      for _ in 0..count {
        items.push(cin.read()?);
      }

      cin.poison();
      res.write(items)
    });

    (proc, out)
  }

  #[test]
  fn test_generate_succ() {
    let a: Channel<u64> = Channel::new();
    let b: Channel<u64> = Channel::new();
    let (taker, out) = take(b.clone(), 4);

    let par: Process = Par::new([
      builtins::generate(a.clone()),
      builtins::succ(a, b),
      taker,
    ])
    .into_process();

    par.start();

    assert_eq!(out.read(), Ok(vec![1, 2, 3, 4]));
    assert_eq!(par.join(), Some(Exit::Poisoned));
  }

  #[test]
  fn test_fibonacci() {
    let a: Channel<u64> = Channel::new();
    let (taker, out) = take(a.clone(), 6);
    let fib: Process = builtins::fibonacci(a);

    fib.start();
    taker.start();

    assert_eq!(out.read(), Ok(vec![1, 1, 2, 3, 5, 8]));
    assert_eq!(fib.join(), Some(Exit::Poisoned));
  }

  #[test]
  fn test_fibonacci_overflow() {
    let a: Channel<u64> = Channel::new();
    let fib: Process = builtins::fibonacci(a.clone());
    let mut count: usize = 0;
    let mut last: u64 = 0;

    fib.start();

    while let Ok(item) = a.read() {
      count += 1;
      last = item;
    }

    assert_eq!(fib.join(), Some(Exit::Normal));
    assert_eq!(count, 93);
    assert_eq!(last, 12_200_160_415_121_876_738);
  }

  #[test]
  fn test_prefix_delta2_pred() {
    let a: Channel<i32> = Channel::new();
    let b: Channel<i32> = Channel::new();
    let c: Channel<i32> = Channel::new();
    let d: Channel<i32> = Channel::new();
    let (taker, out) = take(d.clone(), 3);

    let par: Process = Par::new([
      builtins::prefix(a.clone(), b.clone(), 5),
      builtins::delta2(b, c.clone(), a),
      builtins::pred(c, d),
      taker,
    ])
    .into_process();

    par.start();

    assert_eq!(out.read(), Ok(vec![4, 4, 4]));
    assert!(par.join_timeout(Duration::from_secs(5)));
  }

  #[test]
  fn test_pairs() {
    let a: Channel<u64> = Channel::new();
    let b: Channel<u64> = Channel::new();
    let c: Channel<u64> = Channel::new();
    let (taker, out) = take(c.clone(), 3);

    let par: Process = Par::new([
      builtins::generate(a.clone()),
      builtins::generate(b.clone()),
      builtins::pairs(a, b, c),
      taker,
    ])
    .into_process();

    par.start();

    assert_eq!(out.read(), Ok(vec![0, 2, 4]));
    assert!(par.join_timeout(Duration::from_secs(5)));
  }

  #[test]
  fn test_mux2() {
    let a: Channel<u32> = Channel::new();
    let b: Channel<u32> = Channel::new();
    let c: Channel<u32> = Channel::new();
    let (taker, out) = take(c.clone(), 4);

    let par: Process = Par::new([
      builtins::mult(a.clone(), b.clone(), 0),
      builtins::zeroes(a),
      builtins::mux2(b, Channel::new(), c),
      taker,
    ])
    .into_process();

    par.start();

    assert_eq!(out.read(), Ok(vec![0, 0, 0, 0]));
    assert!(par.join_timeout(Duration::from_secs(5)));
  }

  #[test]
  fn test_sink_blackhole() {
    let a: Channel<u32> = Channel::new();
    let hole: Process = builtins::blackhole(a.clone());

    hole.start();

    assert_eq!(a.write(1), Ok(()));
    assert_eq!(a.write(2), Ok(()));

    a.poison();

    assert_eq!(hole.join(), Some(Exit::Poisoned));
    assert_eq!(a.write(3), Err(CspError::Poisoned));
  }

  #[test]
  fn test_clock_fixed_delay() {
    let a: Channel<()> = Channel::new();
    let b: Channel<()> = Channel::new();
    let (taker, out) = take(b.clone(), 2);

    let par: Process = Par::new([
      builtins::clock(a.clone(), Duration::from_millis(1)),
      builtins::fixed_delay(a, b, Duration::from_millis(1)),
      taker,
    ])
    .into_process();

    par.start();

    assert_eq!(out.read(), Ok(vec![(), ()]));
    assert!(par.join_timeout(Duration::from_secs(5)));
  }
}
