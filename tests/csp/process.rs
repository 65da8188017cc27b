use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use csprt::csp::Channel;
use csprt::csp::Exit;
use csprt::csp::Par;
use csprt::csp::Process;
use csprt::csp::ProcessState;
use csprt::csp::Runtime;
use csprt::csp::Seq;
use csprt::error::CspError;

fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str, delay: Duration) -> Process {
  let log: Arc<Mutex<Vec<&'static str>>> = Arc::clone(log);

  Process::new(move || {
    Process::sleep(delay);
    log.lock().push(name);
    Ok(())
  })
}

#[test]
fn test_seq_ordering() {
  let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();

  let seq: Seq = Seq::new([
    recorder(&log, "p1", Duration::from_millis(50)),
    recorder(&log, "p2", Duration::ZERO),
    recorder(&log, "p3", Duration::ZERO),
  ]);

  assert_eq!(seq.start(), Exit::Normal);
  assert_eq!(*log.lock(), ["p1", "p2", "p3"]);
}

#[test]
fn test_par_runs_concurrently() {
  let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();

  let par: Par = Par::new([
    recorder(&log, "slow", Duration::from_millis(50)),
    recorder(&log, "fast", Duration::ZERO),
  ]);

  assert_eq!(par.start(), [Exit::Normal, Exit::Normal]);
  assert_eq!(*log.lock(), ["fast", "slow"]);
}

#[test]
fn test_par_waits_for_every_member() {
  let chan: Channel<()> = Channel::new();
  let recv: Channel<()> = chan.clone();

  let par: Process = Par::new([
    Process::new(|| Ok(())),
    Process::new(move || loop {
      recv.read()?;
    }),
  ])
  .into_process();

  par.start();

  assert!(!par.join_timeout(Duration::from_millis(50)));
  assert_eq!(par.state(), ProcessState::Running);

  chan.poison();

  assert!(par.join_timeout(Duration::from_secs(5)));
  assert_eq!(par.exit(), Some(Exit::Poisoned));
}

#[test]
fn test_par_stop() {
  let chan: Channel<()> = Channel::new();
  let recv: Channel<()> = chan.clone();

  let member: Process = Process::new(move || loop {
    recv.read()?;
  });

  member.link(&chan);

  let par: Process = Par::new([member.clone()]).into_process();

  par.start();
  par.stop();

  assert!(par.join_timeout(Duration::from_secs(5)));
  assert!(member.is_stopping());
  assert_eq!(member.exit(), Some(Exit::Poisoned));
}

#[test]
fn test_failure_is_isolated() {
  let par: Par = Par::new([
    Process::new(|| panic!("member failed")),
    Process::new(|| Err(CspError::Exhausted)),
    Process::new(|| Ok(())),
  ]);

  let exits: Vec<Exit> = par.start();

  assert!(exits[0].is_panic());
  assert_eq!(exits[1], Exit::Exhausted);
  assert_eq!(exits[2], Exit::Normal);
}

#[test]
fn test_poison_propagates_through_pipeline() {
  let a: Channel<u32> = Channel::new();
  let b: Channel<u32> = Channel::new();

  let source: Process = Process::new({
    let a: Channel<u32> = a.clone();
    move || loop {
      a.write(1)?;
    }
  });

  let stage: Process = Process::new({
    let a: Channel<u32> = a.clone();
    let b: Channel<u32> = b.clone();
    move || loop {
      b.write(a.read()? + 1)?;
    }
  });

  source.link(&a);
  stage.link(&a);
  stage.link(&b);

  let par: Process = Par::new([source, stage]).into_process();
  let start: Instant = Instant::now();

  par.start();

  assert_eq!(b.read(), Ok(2));

  b.poison();

  assert!(par.join_timeout(Duration::from_secs(5)));
  assert!(a.is_poisoned());
  assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_nested_compositions() {
  let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();

  let inner: Process = Seq::new([
    recorder(&log, "a", Duration::ZERO),
    recorder(&log, "b", Duration::ZERO),
  ])
  .into_process();

  let outer: Seq = Seq::new([inner, recorder(&log, "c", Duration::ZERO)]);

  assert_eq!(outer.start(), Exit::Normal);
  assert_eq!(*log.lock(), ["a", "b", "c"]);
}

#[test]
fn test_runtime_registry() {
  let runtime: Runtime = Runtime::new();
  let chan: Channel<()> = Channel::new();

  let procs: Vec<Process> = (0..3)
    .map(|_| {
      let recv: Channel<()> = chan.clone();
      runtime.process(move || recv.read())
    })
    .collect();

  for proc in procs.iter() {
    proc.start();
  }

  assert_eq!(runtime.len(), 3);
  assert_eq!(
    runtime.list(),
    procs.iter().map(Process::pid).collect::<Vec<_>>()
  );

  chan.poison();

  for proc in procs.iter() {
    assert_eq!(proc.join(), Some(Exit::Poisoned));
  }

  assert!(runtime.is_empty());
}
