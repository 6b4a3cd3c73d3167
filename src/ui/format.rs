use crate::model::SampleResult;
use crate::ui::AbsentPolicy;
use std::fmt;

/// Shown in place of a value that could not be sampled.
pub const PLACEHOLDER: &str = "...";

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

pub fn format_rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec < MIB {
        format!("{:.1} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.1} MB/s", bytes_per_sec / MIB)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// The four cells of the status area, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub cpu: String,
    pub ram: String,
    pub down: String,
    pub up: String,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU {}  RAM {}  ↓ {}  ↑ {}",
            self.cpu, self.ram, self.down, self.up
        )
    }
}

/// Turns sample results into display strings.
#[derive(Debug, Clone)]
pub struct Presenter {
    policy: AbsentPolicy,
    last: Option<StatusLine>,
}

impl Presenter {
    pub fn new(policy: AbsentPolicy) -> Self {
        Self { policy, last: None }
    }

    pub fn render(&mut self, result: &SampleResult) -> StatusLine {
        let previous = self.last.as_ref();
        let cell = |value: Option<f64>, fmt: fn(f64) -> String, held: Option<&String>| match value {
            Some(v) => fmt(v),
            None => match (self.policy, held) {
                (AbsentPolicy::HoldLast, Some(held)) => held.clone(),
                _ => PLACEHOLDER.to_string(),
            },
        };

        let line = StatusLine {
            cpu: cell(result.cpu_percent, format_percent, previous.map(|l| &l.cpu)),
            ram: cell(result.ram_percent, format_percent, previous.map(|l| &l.ram)),
            down: cell(result.down_rate, format_rate, previous.map(|l| &l.down)),
            up: cell(result.up_rate, format_rate, previous.map(|l| &l.up)),
        };
        self.last = Some(line.clone());
        line
    }
}
