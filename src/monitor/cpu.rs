use crate::error::{Result, SampleError};
use crate::model::{CpuSnapshot, MonitorKind};
use crate::monitor::Monitorable;

/// Derives CPU utilisation from successive reads of /proc/stat.
#[derive(Debug, Clone, Default)]
pub struct CpuSampler {
    prev: Option<CpuSnapshot>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last successfully parsed snapshot.
    pub fn snapshot(&self) -> Option<CpuSnapshot> {
        self.prev
    }

    /// Parse the aggregate `cpu` line, which must be the first line.
    ///
    /// Fields are user, nice, system, idle, iowait, irq, softirq and whatever
    /// the kernel appends after them (steal, guest, ...). All of them count
    /// towards the total; iowait counts as idle.
    pub fn parse_stat(s: &str) -> Result<CpuSnapshot> {
        let line = s
            .lines()
            .next()
            .ok_or_else(|| SampleError::malformed(MonitorKind::Cpu, "empty stat source"))?;
        let mut parts = line.split_whitespace();
        if parts.next() != Some("cpu") {
            return Err(SampleError::malformed(
                MonitorKind::Cpu,
                "first line is not the aggregate cpu line",
            ));
        }

        let fields = parts
            .map(|p| {
                p.parse::<u64>().map_err(|_| {
                    SampleError::malformed(MonitorKind::Cpu, format!("non-numeric field {p:?}"))
                })
            })
            .collect::<Result<Vec<u64>>>()?;
        if fields.len() < 7 {
            return Err(SampleError::malformed(
                MonitorKind::Cpu,
                format!("expected at least 7 fields, got {}", fields.len()),
            ));
        }

        let total = fields.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
        let idle = fields[3].saturating_add(fields[4]); // idle + iowait
        Ok(CpuSnapshot { total, idle })
    }

    /// Busy share of the jiffies elapsed between two snapshots, in [0, 100].
    pub fn usage_percent(prev: &CpuSnapshot, next: &CpuSnapshot) -> f64 {
        let total_diff = next.total.saturating_sub(prev.total);
        let idle_diff = next.idle.saturating_sub(prev.idle);
        if total_diff == 0 {
            return 0.0;
        }
        (100.0 * (1.0 - idle_diff as f64 / total_diff as f64)).clamp(0.0, 100.0)
    }
}

impl Monitorable for CpuSampler {
    /// `None` on the seeding sample.
    type Reading = Option<f64>;

    fn kind(&self) -> MonitorKind {
        MonitorKind::Cpu
    }

    fn parse_from_str(&mut self, s: &str, _now: f64) -> Result<Option<f64>> {
        let next = Self::parse_stat(s)?;
        let usage = self.prev.map(|prev| Self::usage_percent(&prev, &next));
        self.prev = Some(next);
        Ok(usage)
    }
}
