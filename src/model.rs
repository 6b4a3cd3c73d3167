use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MonitorKind {
    Cpu,
    Mem,
    Net,
}

impl MonitorKind {
    /// Counter file backing this metric, relative to the procfs root.
    pub fn source_file(&self) -> &'static str {
        match self {
            MonitorKind::Cpu => "stat",
            MonitorKind::Mem => "meminfo",
            MonitorKind::Net => "net/dev",
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MonitorKind::Cpu => "cpu",
            MonitorKind::Mem => "mem",
            MonitorKind::Net => "net",
        })
    }
}

/// Cumulative jiffies from the aggregate `cpu` line of /proc/stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuSnapshot {
    pub total: u64,
    /// idle + iowait
    pub idle: u64,
}

/// Byte counters summed over all non-loopback interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetSnapshot {
    pub recv_bytes: u64,
    pub sent_bytes: u64,
    /// Seconds on the monotonic clock.
    pub timestamp: f64,
}

/// Throughput in bytes/sec. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetRates {
    pub down: f64,
    pub up: f64,
}

/// One sampling cycle. Each field is `None` when its own source failed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleResult {
    pub cpu_percent: Option<f64>,
    pub ram_percent: Option<f64>,
    pub down_rate: Option<f64>,
    pub up_rate: Option<f64>,
}

impl SampleResult {
    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none()
            && self.ram_percent.is_none()
            && self.down_rate.is_none()
            && self.up_rate.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SampleEvent {
    pub seq: u64,
    pub result: SampleResult,
    pub timestamp: DateTime<Utc>,
}
