use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use csprt::csp::Channel;
use csprt::error::CspError;

#[test]
fn test_rendezvous_exactness() {
  const COUNT: u32 = 1_000;

  let chan: Channel<u32> = Channel::new();
  let send: Channel<u32> = chan.clone();

  let writer = thread::spawn(move || {
    for item in 0..COUNT {
      send.write(item).unwrap();
    }
  });

  for item in 0..COUNT {
    assert_eq!(chan.read(), Ok(item));
  }

  writer.join().unwrap();
  assert!(!chan.is_poisoned());
}

#[test]
fn test_many_writers_serialize() {
  const WRITERS: usize = 4;
  const COUNT: usize = 250;

  let chan: Channel<usize> = Channel::new();
  let handles: Vec<_> = (0..WRITERS)
    .map(|writer| {
      let send: Channel<usize> = chan.clone();
      thread::spawn(move || {
        for item in 0..COUNT {
          send.write(writer * COUNT + item).unwrap();
        }
      })
    })
    .collect();

  let mut items: Vec<usize> = (0..WRITERS * COUNT).map(|_| chan.read().unwrap()).collect();

  for handle in handles {
    handle.join().unwrap();
  }

  items.sort_unstable();
  assert_eq!(items, (0..WRITERS * COUNT).collect::<Vec<_>>());
}

#[test]
fn test_write_completes_only_after_read() {
  let chan: Channel<u32> = Channel::new();
  let send: Channel<u32> = chan.clone();
  let writes: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
  let count: Arc<AtomicUsize> = Arc::clone(&writes);

  let writer = thread::spawn(move || {
    send.write(1).unwrap();
    count.fetch_add(1, Ordering::SeqCst);
    send.write(2).unwrap();
    count.fetch_add(1, Ordering::SeqCst);
  });

  thread::sleep(Duration::from_millis(30));
  assert_eq!(writes.load(Ordering::SeqCst), 0);

  assert_eq!(chan.read(), Ok(1));

  thread::sleep(Duration::from_millis(30));
  assert_eq!(writes.load(Ordering::SeqCst), 1);

  assert_eq!(chan.read(), Ok(2));
  writer.join().unwrap();
  assert_eq!(writes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_poison_reaches_blocked_calls() {
  let chan: Channel<u32> = Channel::new();

  let readers: Vec<_> = (0..3)
    .map(|_| {
      let recv: Channel<u32> = chan.clone();
      thread::spawn(move || recv.read())
    })
    .collect();

  thread::sleep(Duration::from_millis(30));
  chan.poison();

  for reader in readers {
    assert_eq!(reader.join().unwrap(), Err(CspError::Poisoned));
  }

  assert_eq!(chan.write(0), Err(CspError::Poisoned));
  assert_eq!(chan.read(), Err(CspError::Poisoned));
}

#[test]
fn test_poison_reaches_queued_writers() {
  let chan: Channel<u32> = Channel::new();

  let writers: Vec<_> = (0..3)
    .map(|item| {
      let send: Channel<u32> = chan.clone();
      thread::spawn(move || send.write(item))
    })
    .collect();

  thread::sleep(Duration::from_millis(30));
  chan.poison();

  for writer in writers {
    assert_eq!(writer.join().unwrap(), Err(CspError::Poisoned));
  }
}
