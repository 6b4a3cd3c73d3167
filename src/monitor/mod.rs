pub mod cpu;
pub use cpu::CpuSampler;
pub mod mem;
pub use mem::MemSampler;
pub mod net;
pub use net::NetSampler;

use crate::error::{Result, SampleError};
use crate::model::MonitorKind;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// A sampler that derives one metric from a single read of its counter source.
pub trait Monitorable {
    type Reading;

    fn kind(&self) -> MonitorKind;

    /// Parse one read of the counter source taken at `now` (monotonic
    /// seconds). Internal state is only committed when parsing succeeds.
    fn parse_from_str(&mut self, s: &str, now: f64) -> Result<Self::Reading>;
}

/// Where counter text comes from.
pub trait CounterSource {
    fn read(&self, kind: MonitorKind) -> Result<String>;
}

/// Reads counters from a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl CounterSource for ProcFs {
    fn read(&self, kind: MonitorKind) -> Result<String> {
        let path = self.root.join(kind.source_file());
        fs::read_to_string(&path).map_err(|source| SampleError::SourceUnreadable {
            kind,
            path,
            source,
        })
    }
}

pub trait Clock {
    fn now_secs(&self) -> f64;
}

/// Seconds elapsed since the clock was created, from `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
