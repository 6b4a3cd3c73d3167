use crate::error::{Result, SampleError};
use crate::model::MonitorKind;
use crate::monitor::Monitorable;

/// Memory usage from /proc/meminfo. Stateless: the kernel already reports
/// instantaneous availability.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemSampler;

impl MemSampler {
    pub fn new() -> Self {
        MemSampler
    }

    /// Value in kB of a `Key:   1234 kB` line.
    fn field(s: &str, key: &str) -> Option<u64> {
        s.lines().find_map(|line| {
            let (name, rest) = line.split_once(':')?;
            if name.trim() != key {
                return None;
            }
            rest.split_whitespace().next()?.parse::<u64>().ok()
        })
    }

    /// Used share of physical memory, (total - available) / total, in [0, 100].
    pub fn used_percent(total_kb: u64, available_kb: u64) -> f64 {
        if total_kb == 0 {
            return 0.0;
        }
        let used = total_kb.saturating_sub(available_kb) as f64;
        (100.0 * used / total_kb as f64).clamp(0.0, 100.0)
    }
}

impl Monitorable for MemSampler {
    type Reading = f64;

    fn kind(&self) -> MonitorKind {
        MonitorKind::Mem
    }

    fn parse_from_str(&mut self, s: &str, _now: f64) -> Result<f64> {
        let total = Self::field(s, "MemTotal")
            .ok_or_else(|| SampleError::malformed(MonitorKind::Mem, "MemTotal missing"))?;
        let available = Self::field(s, "MemAvailable")
            .ok_or_else(|| SampleError::malformed(MonitorKind::Mem, "MemAvailable missing"))?;
        if total == 0 {
            return Err(SampleError::malformed(MonitorKind::Mem, "MemTotal is zero"));
        }
        Ok(Self::used_percent(total, available))
    }
}
