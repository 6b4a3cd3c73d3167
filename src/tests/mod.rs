use crate::error::{Result, SampleError};
use crate::model::MonitorKind;
use crate::monitor::{Clock, CounterSource, ProcFs};
use crate::scheduler::DEFAULT_INTERVAL;
use crate::{SampleEngine, Scheduler};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory counter files. Missing entries read as ENOENT.
#[derive(Clone, Default)]
pub(crate) struct FakeProc {
    files: Arc<Mutex<HashMap<MonitorKind, String>>>,
}

impl FakeProc {
    pub(crate) fn set(&self, kind: MonitorKind, content: impl Into<String>) {
        self.files.lock().unwrap().insert(kind, content.into());
    }

    pub(crate) fn remove(&self, kind: MonitorKind) {
        self.files.lock().unwrap().remove(&kind);
    }

    pub(crate) fn healthy() -> Self {
        let proc = FakeProc::default();
        proc.set(MonitorKind::Cpu, stat(100, 900));
        proc.set(MonitorKind::Mem, meminfo(8000, 2000));
        proc.set(MonitorKind::Net, netdev(1000, 2000));
        proc
    }
}

impl CounterSource for FakeProc {
    fn read(&self, kind: MonitorKind) -> Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .ok_or_else(|| SampleError::SourceUnreadable {
                kind,
                path: kind.source_file().into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

/// Manually advanced clock.
#[derive(Clone, Default)]
pub(crate) struct StepClock(Arc<Mutex<f64>>);

impl StepClock {
    pub(crate) fn advance(&self, secs: f64) {
        *self.0.lock().unwrap() += secs;
    }
}

impl Clock for StepClock {
    fn now_secs(&self) -> f64 {
        *self.0.lock().unwrap()
    }
}

/// Follows tokio's (pausable) clock.
struct TokioClock(tokio::time::Instant);

impl Clock for TokioClock {
    fn now_secs(&self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}

pub(crate) fn stat(busy: u64, idle: u64) -> String {
    format!("cpu  {busy} 0 0 {idle} 0 0 0 0 0 0\ncpu0 {busy} 0 0 {idle} 0 0 0 0 0 0\nintr 0\n")
}

pub(crate) fn meminfo(total_kb: u64, available_kb: u64) -> String {
    format!(
        "MemTotal:       {total_kb} kB\nMemFree:        1 kB\nMemAvailable:   {available_kb} kB\n"
    )
}

pub(crate) fn netdev(rx: u64, tx: u64) -> String {
    format!(
        "Inter-|   Receive                                                |  Transmit\n \
         face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n    \
         lo: 555555 10 0 0 0 0 0 0 555555 10 0 0 0 0 0 0\n  \
         eth0:{rx} 10 0 0 0 0 0 0 {tx} 20 0 0 0 0 0 0\n"
    )
}

#[test]
fn first_sample_only_has_memory() {
    let mut engine = SampleEngine::with_source(FakeProc::healthy(), StepClock::default());
    let result = engine.sample();
    assert_eq!(result.cpu_percent, None);
    assert_eq!(result.down_rate, None);
    assert_eq!(result.up_rate, None);
    assert_eq!(result.ram_percent, Some(75.0));
}

#[test]
fn second_sample_derives_rates() {
    let proc = FakeProc::healthy();
    let clock = StepClock::default();
    let mut engine = SampleEngine::with_source(proc.clone(), clock.clone());
    engine.sample();

    proc.set(MonitorKind::Cpu, stat(600, 1400));
    proc.set(MonitorKind::Net, netdev(5000, 2000));
    clock.advance(2.0);
    let result = engine.sample();

    assert_eq!(result.cpu_percent, Some(50.0));
    assert_eq!(result.down_rate, Some(2000.0));
    assert_eq!(result.up_rate, Some(0.0));
}

#[test]
fn one_failing_source_does_not_block_the_others() {
    let proc = FakeProc::healthy();
    let clock = StepClock::default();
    let mut engine = SampleEngine::with_source(proc.clone(), clock.clone());
    engine.sample();

    proc.remove(MonitorKind::Cpu);
    proc.set(MonitorKind::Net, netdev(3000, 4000));
    clock.advance(2.0);
    let result = engine.sample();
    assert_eq!(result.cpu_percent, None);
    assert_eq!(result.ram_percent, Some(75.0));
    assert_eq!(result.down_rate, Some(1000.0));
    assert_eq!(result.up_rate, Some(1000.0));
}

#[test]
fn cpu_recovers_against_last_good_snapshot() {
    let proc = FakeProc::healthy();
    let mut engine = SampleEngine::with_source(proc.clone(), StepClock::default());
    engine.sample();

    proc.set(MonitorKind::Cpu, "cpu  garbage\n");
    assert_eq!(engine.sample().cpu_percent, None);

    // +1000 total, +0 idle relative to the seed
    proc.set(MonitorKind::Cpu, stat(1100, 900));
    assert_eq!(engine.sample().cpu_percent, Some(100.0));
}

#[test]
fn memory_failure_is_isolated_to_its_cycle() {
    let proc = FakeProc::healthy();
    let mut engine = SampleEngine::with_source(proc.clone(), StepClock::default());

    proc.set(MonitorKind::Mem, "MemTotal: 8000 kB\n");
    assert_eq!(engine.sample().ram_percent, None);

    proc.set(MonitorKind::Mem, meminfo(1000, 250));
    assert_eq!(engine.sample().ram_percent, Some(75.0));
}

#[test]
fn net_counter_reset_reports_zero() {
    let proc = FakeProc::healthy();
    let clock = StepClock::default();
    let mut engine = SampleEngine::with_source(proc.clone(), clock.clone());
    engine.sample();

    proc.set(MonitorKind::Net, netdev(10, 10));
    clock.advance(2.0);
    let result = engine.sample();
    assert_eq!(result.down_rate, Some(0.0));
    assert_eq!(result.up_rate, Some(0.0));
}

#[test]
fn stalled_clock_leaves_rates_absent() {
    let proc = FakeProc::healthy();
    let mut engine = SampleEngine::with_source(proc.clone(), StepClock::default());
    engine.sample();
    proc.set(MonitorKind::Net, netdev(9000, 9000));
    let result = engine.sample();
    assert_eq!(result.down_rate, None);
    assert_eq!(result.up_rate, None);
    assert_eq!(engine.net().snapshot().map(|s| s.recv_bytes), Some(9000));
}

#[test]
fn everything_missing_is_all_absent() {
    let mut engine = SampleEngine::with_source(FakeProc::default(), StepClock::default());
    for _ in 0..3 {
        assert!(engine.sample().is_empty());
    }
    assert_eq!(engine.cpu().snapshot(), None);
}

#[test]
fn percentages_stay_in_range() {
    let proc = FakeProc::healthy();
    let mut engine = SampleEngine::with_source(proc.clone(), StepClock::default());
    engine.sample();
    let samples = [(100, 900), (150, 2000), (5000, 2000), (5000, 2000), (5001, 99999)];
    for (busy, idle) in samples {
        proc.set(MonitorKind::Cpu, stat(busy, idle));
        proc.set(MonitorKind::Mem, meminfo(1000, idle % 1500));
        let result = engine.sample();
        for pct in [result.cpu_percent, result.ram_percent].into_iter().flatten() {
            assert!((0.0..=100.0).contains(&pct), "{pct} out of range");
        }
    }
}

#[test]
fn engine_reads_procfs_directory() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("net")).unwrap();
    std::fs::write(tmp.path().join("stat"), stat(100, 900)).unwrap();
    std::fs::write(tmp.path().join("meminfo"), meminfo(4000, 1000)).unwrap();
    std::fs::write(tmp.path().join("net/dev"), netdev(1000, 1000)).unwrap();

    let clock = StepClock::default();
    let mut engine = SampleEngine::with_source(ProcFs::with_root(tmp.path()), clock.clone());
    assert_eq!(engine.sample().ram_percent, Some(75.0));

    std::fs::write(tmp.path().join("stat"), stat(350, 1650)).unwrap();
    std::fs::write(tmp.path().join("net/dev"), netdev(1000 + 2048, 1000)).unwrap();
    clock.advance(1.0);
    let result = engine.sample();
    assert_eq!(result.cpu_percent, Some(25.0));
    assert_eq!(result.down_rate, Some(2048.0));
}

#[tokio::test(start_paused = true)]
async fn scheduler_publishes_immediately_then_periodically() {
    let start = tokio::time::Instant::now();
    let engine = SampleEngine::with_source(FakeProc::healthy(), TokioClock(start));
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let mut scheduler = Scheduler::new(DEFAULT_INTERVAL);
    scheduler.start(engine, tx).unwrap();
    assert!(scheduler.is_running());

    let first = rx.recv().await.unwrap();
    assert_eq!(first.seq, 0);
    assert!(start.elapsed() < DEFAULT_INTERVAL);
    assert_eq!(first.result.ram_percent, Some(75.0));
    assert_eq!(first.result.cpu_percent, None);

    let second = rx.recv().await.unwrap();
    assert_eq!(second.seq, 1);
    assert!(start.elapsed() >= DEFAULT_INTERVAL);
    // Counters did not move: idle CPU, no traffic.
    assert_eq!(second.result.cpu_percent, Some(0.0));
    assert_eq!(second.result.down_rate, Some(0.0));

    let third = rx.recv().await.unwrap();
    assert_eq!(third.seq, 2);
    assert!(start.elapsed() >= DEFAULT_INTERVAL * 2);

    scheduler.stop().await;
    assert!(!scheduler.is_running());
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn scheduler_rejects_double_start() {
    let (tx, _rx) = tokio::sync::mpsc::channel(16);
    let mut scheduler = Scheduler::new(DEFAULT_INTERVAL);
    let engine = || SampleEngine::with_source(FakeProc::healthy(), StepClock::default());
    scheduler.start(engine(), tx.clone()).unwrap();
    assert!(scheduler.start(engine(), tx).is_err());
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn scheduler_can_restart_after_stop() {
    let mut scheduler = Scheduler::new(Duration::from_millis(500));
    let engine = || SampleEngine::with_source(FakeProc::healthy(), StepClock::default());

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    scheduler.start(engine(), tx).unwrap();
    assert_eq!(rx.recv().await.unwrap().seq, 0);
    scheduler.stop().await;

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    scheduler.start(engine(), tx).unwrap();
    // A fresh engine seeds again.
    let event = rx.recv().await.unwrap();
    assert_eq!(event.seq, 0);
    assert_eq!(event.result.cpu_percent, None);
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn sampler_exits_when_presenter_hangs_up() {
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let mut scheduler = Scheduler::new(DEFAULT_INTERVAL);
    scheduler
        .start(SampleEngine::with_source(FakeProc::healthy(), StepClock::default()), tx)
        .unwrap();
    assert_eq!(rx.recv().await.unwrap().seq, 0);
    drop(rx);

    // No stop(): the next tick finds the channel closed and the task ends.
    tokio::time::sleep(DEFAULT_INTERVAL * 3).await;
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn scheduler_restarts_after_presenter_hangup_without_stop() {
    let engine = || SampleEngine::with_source(FakeProc::healthy(), StepClock::default());
    let mut scheduler = Scheduler::new(DEFAULT_INTERVAL);

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    drop(rx);
    scheduler.start(engine(), tx).unwrap();
    tokio::time::sleep(DEFAULT_INTERVAL * 3).await;
    assert!(!scheduler.is_running());

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    scheduler.start(engine(), tx).unwrap();
    assert!(scheduler.is_running());
    assert_eq!(rx.recv().await.unwrap().seq, 0);
    scheduler.stop().await;
    assert!(!scheduler.is_running());
}
