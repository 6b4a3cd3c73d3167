//! Sampling engine: one read of every counter source per cycle.

use crate::model::SampleResult;
use crate::monitor::{
    Clock, CounterSource, CpuSampler, MemSampler, MonotonicClock, Monitorable, NetSampler, ProcFs,
};
use tracing::{debug, warn};

/// Owns the previous-snapshot state of every sampler. Dropping the engine
/// discards it.
#[derive(Debug)]
pub struct SampleEngine<S = ProcFs, C = MonotonicClock> {
    source: S,
    clock: C,
    cpu: CpuSampler,
    mem: MemSampler,
    net: NetSampler,
}

impl SampleEngine {
    /// Engine reading `/proc` on the monotonic clock.
    pub fn new() -> Self {
        Self::with_source(ProcFs::default(), MonotonicClock::new())
    }
}

impl Default for SampleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CounterSource, C: Clock> SampleEngine<S, C> {
    pub fn with_source(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            cpu: CpuSampler::new(),
            mem: MemSampler::new(),
            net: NetSampler::new(),
        }
    }

    pub fn cpu(&self) -> &CpuSampler {
        &self.cpu
    }

    pub fn net(&self) -> &NetSampler {
        &self.net
    }

    /// Run one cycle. Never fails: a metric whose source could not be read
    /// or parsed is `None` and the others are unaffected.
    pub fn sample(&mut self) -> SampleResult {
        let cpu_percent = poll(&mut self.cpu, &self.source, &self.clock).flatten();
        let ram_percent = poll(&mut self.mem, &self.source, &self.clock);
        let rates = poll(&mut self.net, &self.source, &self.clock).flatten();

        let result = SampleResult {
            cpu_percent,
            ram_percent,
            down_rate: rates.map(|r| r.down),
            up_rate: rates.map(|r| r.up),
        };
        if result.is_empty() {
            debug!("no metric available this cycle");
        } else {
            debug!(?result, "sample cycle complete");
        }
        result
    }
}

fn poll<M, S, C>(monitor: &mut M, source: &S, clock: &C) -> Option<M::Reading>
where
    M: Monitorable,
    S: CounterSource,
    C: Clock,
{
    let kind = monitor.kind();
    let content = match source.read(kind) {
        Ok(content) => content,
        Err(err) => {
            warn!(%kind, error = %err, "counter source unavailable");
            return None;
        }
    };
    match monitor.parse_from_str(&content, clock.now_secs()) {
        Ok(reading) => Some(reading),
        Err(err) => {
            warn!(%kind, error = %err, "discarding sample");
            None
        }
    }
}
