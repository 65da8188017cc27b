use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use csprt::csp::Alt;
use csprt::csp::AltGuard;
use csprt::csp::Channel;
use csprt::csp::Guard;
use csprt::csp::Selected;
use csprt::csp::SkipGuard;
use csprt::csp::TimerGuard;
use csprt::error::CspError;

/// Spawns a writer that offers `index` on `chan` until the channel is
/// poisoned.
fn persistent_writer(chan: &Channel<usize>, index: usize) -> JoinHandle<()> {
  let chan: Channel<usize> = chan.clone();
  thread::spawn(move || while chan.write(index).is_ok() {})
}

/// Blocks until every guard of `alt` is ready.
fn wait_all_ready(alt: &Alt<usize>) {
  while !alt.guards().iter().all(Guard::is_selectable) {
    thread::sleep(Duration::from_millis(1));
  }
}

#[test]
fn test_priority_determinism() {
  let chans: Vec<Channel<usize>> = (0..3).map(|_| Channel::new()).collect();
  let writers: Vec<JoinHandle<()>> = chans
    .iter()
    .enumerate()
    .map(|(index, chan)| persistent_writer(chan, index))
    .collect();

  let mut alt: Alt<usize> = Alt::new(chans.iter());

  for _ in 0..30 {
    wait_all_ready(&alt);
    assert_eq!(alt.pri_select(), Ok(Selected::Message(0)));
    assert_eq!(alt.last_selected(), Some(0));
  }

  alt.poison();

  for writer in writers {
    writer.join().unwrap();
  }
}

#[test]
fn test_fair_round_robin() {
  const ROUNDS: usize = 30;

  let chans: Vec<Channel<usize>> = (0..3).map(|_| Channel::new()).collect();
  let writers: Vec<JoinHandle<()>> = chans
    .iter()
    .enumerate()
    .map(|(index, chan)| persistent_writer(chan, index))
    .collect();

  let mut alt: Alt<usize> = Alt::new(chans.iter());
  let mut counts: [usize; 3] = [0; 3];
  let mut order: Vec<usize> = Vec::with_capacity(ROUNDS);

  for _ in 0..ROUNDS {
    wait_all_ready(&alt);

    let index: usize = alt.fair_select().unwrap().into_message().unwrap();

    counts[index] += 1;
    order.push(index);
  }

  assert_eq!(counts, [ROUNDS / 3; 3]);

  for window in order.windows(3) {
    let mut seen: [bool; 3] = [false; 3];

    for index in window {
      assert!(!seen[*index], "guard revisited before the others: {order:?}");
      seen[*index] = true;
    }
  }

  alt.poison();

  for writer in writers {
    writer.join().unwrap();
  }
}

#[test]
fn test_single_ready_always_chosen() {
  let chans: Vec<Channel<usize>> = (0..3).map(|_| Channel::new()).collect();
  let writer: JoinHandle<()> = persistent_writer(&chans[1], 1);
  let mut alt: Alt<usize> = Alt::new(chans.iter());

  for _ in 0..10 {
    assert_eq!(alt.fair_select(), Ok(Selected::Message(1)));
    assert_eq!(alt.pri_select(), Ok(Selected::Message(1)));
    assert_eq!(alt.select(), Ok(Selected::Message(1)));
  }

  alt.poison();
  writer.join().unwrap();
}

#[test]
fn test_exhaustion_instead_of_hang() {
  let chans: Vec<Channel<usize>> = (0..2).map(|_| Channel::new()).collect();
  let mut alt: Alt<usize> = Alt::new(chans.iter());

  let poisoner = thread::spawn({
    let chans: Vec<Channel<usize>> = chans.clone();
    move || {
      for chan in chans {
        thread::sleep(Duration::from_millis(10));
        chan.poison();
      }
    }
  });

  assert_eq!(alt.pri_select(), Err(CspError::Exhausted));
  assert!(!alt.has_next());

  poisoner.join().unwrap();
}

#[test]
fn test_poisoned_guard_is_skipped() {
  let dead: Channel<usize> = Channel::new();
  let live: Channel<usize> = Channel::new();
  let writer: JoinHandle<()> = persistent_writer(&live, 7);
  let mut alt: Alt<usize> = Alt::new([&dead, &live]);

  dead.poison();

  assert!(alt.has_next());
  assert_eq!(alt.pri_select(), Ok(Selected::Message(7)));
  assert_eq!(alt.last_selected(), Some(1));

  live.poison();
  writer.join().unwrap();
}

#[test]
fn test_timer_alarm() {
  let chan: Channel<usize> = Channel::new();
  let timer: TimerGuard = TimerGuard::new();
  let mut alt: Alt<usize> = Alt::new([AltGuard::from(&chan), AltGuard::from(&timer)]);
  let start: Instant = Instant::now();

  timer.set_alarm(Duration::from_millis(30));

  assert_eq!(alt.select(), Ok(Selected::Timeout));
  assert!(start.elapsed() >= Duration::from_millis(30));
  assert_eq!(alt.last_selected(), Some(1));
}

#[test]
fn test_timer_armed_after_alt_blocks() {
  let chan: Channel<usize> = Channel::new();
  let timer: TimerGuard = TimerGuard::new();

  let reader: JoinHandle<Result<Selected<usize>, CspError>> = thread::spawn({
    let mut alt: Alt<usize> = Alt::new([AltGuard::from(&chan), AltGuard::from(&timer)]);
    move || alt.pri_select()
  });

  thread::sleep(Duration::from_millis(20));
  timer.set_alarm(Duration::from_millis(10));

  let limit: Instant = Instant::now() + Duration::from_secs(2);

  while !reader.is_finished() && Instant::now() < limit {
    thread::sleep(Duration::from_millis(1));
  }

  assert!(reader.is_finished(), "alternation missed the alarm");
  assert_eq!(reader.join().unwrap(), Ok(Selected::Timeout));
}

#[test]
fn test_fair_iter_drains_all() {
  let chans: Vec<Channel<usize>> = (0..3).map(|_| Channel::new()).collect();

  let writers: Vec<JoinHandle<Result<(), CspError>>> = chans
    .iter()
    .enumerate()
    .map(|(index, chan)| {
      let chan: Channel<usize> = chan.clone();
      thread::spawn(move || {
        for _ in 0..4 {
          chan.write(index)?;
        }

        chan.poison();
        Ok(())
      })
    })
    .collect();

  let mut alt: Alt<usize> = Alt::new(chans.iter());
  let mut counts: [usize; 3] = [0; 3];

  for selected in alt.iter_fair() {
    counts[selected.into_message().unwrap()] += 1;
  }

  assert_eq!(counts, [4; 3]);
  assert!(!alt.has_next());

  for writer in writers {
    writer.join().unwrap().unwrap();
  }
}

#[test]
fn test_skip_polls() {
  let chan: Channel<usize> = Channel::new();
  let mut alt: Alt<usize> = Alt::new([AltGuard::from(&chan), AltGuard::from(SkipGuard::new())]);

  assert_eq!(alt.pri_select(), Ok(Selected::Skip));

  let writer: JoinHandle<()> = persistent_writer(&chan, 3);

  while !chan.is_selectable() {
    thread::sleep(Duration::from_millis(1));
  }

  assert_eq!(alt.pri_select(), Ok(Selected::Message(3)));

  chan.poison();
  writer.join().unwrap();
}

#[test]
fn test_competing_alts_deliver_once() {
  const COUNT: usize = 500;

  let chan: Channel<usize> = Channel::new();

  let readers: Vec<JoinHandle<Vec<usize>>> = (0..3)
    .map(|_| {
      let mut alt: Alt<usize> = Alt::new([&chan]);
      thread::spawn(move || {
        let mut items: Vec<usize> = Vec::new();

        while let Ok(selected) = alt.select() {
          items.extend(selected.into_message());
        }

        items
      })
    })
    .collect();

  for item in 0..COUNT {
    chan.write(item).unwrap();
  }

  chan.poison();

  let mut items: Vec<usize> = readers
    .into_iter()
    .flat_map(|reader| reader.join().unwrap())
    .collect();

  items.sort_unstable();
  assert_eq!(items, (0..COUNT).collect::<Vec<_>>());
}
