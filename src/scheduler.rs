use crate::engine::SampleEngine;
use crate::model::SampleEvent;
use crate::monitor::{Clock, CounterSource};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

enum State {
    Idle,
    Running {
        handle: JoinHandle<()>,
        shutdown_tx: broadcast::Sender<()>,
    },
}

/// Drives a [`SampleEngine`] on a fixed period and pushes every result to
/// the presenter channel.
pub struct Scheduler {
    interval: Duration,
    alive: Arc<AtomicBool>,
    state: State,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            alive: Arc::new(AtomicBool::new(false)),
            state: State::Idle,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// False once the sampling task has exited, whether through `stop()`
    /// or because the presenter hung up.
    pub fn is_running(&self) -> bool {
        match &self.state {
            State::Idle => false,
            State::Running { handle, .. } => !handle.is_finished(),
        }
    }

    /// Idle -> Running. Samples once immediately, then once per interval.
    /// The engine moves into the sampling task and is dropped on stop.
    pub fn start<S, C>(&mut self, engine: SampleEngine<S, C>, tx: Sender<SampleEvent>) -> Result<()>
    where
        S: CounterSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        if self.is_running() {
            anyhow::bail!("scheduler is already running");
        }
        // A task that exited on its own leaves a finished handle behind.
        self.state = State::Idle;
        if self.interval.is_zero() {
            anyhow::bail!("sampling interval must be non-zero");
        }

        // One flag per run; an old task only ever sees its own.
        self.alive = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_sampler(engine, self.interval, tx, self.alive.clone(), shutdown_rx);
        self.state = State::Running { handle, shutdown_tx };
        Ok(())
    }

    /// Running -> Idle. Once this returns nothing more is published.
    pub async fn stop(&mut self) {
        let State::Running { handle, shutdown_tx } = std::mem::replace(&mut self.state, State::Idle)
        else {
            return;
        };
        self.alive.store(false, Ordering::SeqCst);
        let _ = shutdown_tx.send(());
        if let Err(e) = handle.await {
            warn!(error = %e, "sampler task ended abnormally");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let State::Running { shutdown_tx, .. } = &self.state {
            self.alive.store(false, Ordering::SeqCst);
            let _ = shutdown_tx.send(());
        }
    }
}

fn spawn_sampler<S, C>(
    mut engine: SampleEngine<S, C>,
    period: Duration,
    tx: Sender<SampleEvent>,
    alive: Arc<AtomicBool>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()>
where
    S: CounterSource + Send + 'static,
    C: Clock + Send + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = period.as_millis() as u64, "sampler started");
        let mut seq = 0u64;

        if cycle(&mut engine, &tx, &alive, &mut seq) {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        if !cycle(&mut engine, &tx, &alive, &mut seq) {
                            break;
                        }
                    }
                }
            }
        }

        info!(samples = seq, "sampler stopped");
    })
}

/// One sample/publish step. Returns false once the task should exit.
fn cycle<S: CounterSource, C: Clock>(
    engine: &mut SampleEngine<S, C>,
    tx: &Sender<SampleEvent>,
    alive: &AtomicBool,
    seq: &mut u64,
) -> bool {
    // A tick that raced teardown must not touch state or publish.
    if !alive.load(Ordering::SeqCst) {
        return false;
    }
    let result = engine.sample();
    if !alive.load(Ordering::SeqCst) {
        return false;
    }

    let event = SampleEvent {
        seq: *seq,
        result,
        timestamp: chrono::Utc::now(),
    };
    match tx.try_send(event) {
        Ok(()) => {
            *seq += 1;
            true
        }
        Err(TrySendError::Full(_)) => {
            debug!(seq = *seq, "presenter is behind, dropping sample");
            *seq += 1;
            true
        }
        Err(TrySendError::Closed(_)) => {
            info!("presenter hung up");
            false
        }
    }
}
