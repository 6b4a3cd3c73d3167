use crate::error::{Result, SampleError};
use crate::model::{MonitorKind, NetRates, NetSnapshot};
use crate::monitor::Monitorable;
use tracing::debug;

/// Number of counters following the interface name in /proc/net/dev.
const NETDEV_FIELDS: usize = 16;
const RX_BYTES: usize = 0;
const TX_BYTES: usize = 8;
const LOOPBACK: &str = "lo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters<'a> {
    pub name: &'a str,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Aggregate throughput over every interface except loopback.
#[derive(Debug, Clone, Default)]
pub struct NetSampler {
    prev: Option<NetSnapshot>,
}

impl NetSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<NetSnapshot> {
        self.prev
    }

    /// Parse one data line. Accepts both `eth0: 123 ...` and `eth0:123 ...`.
    pub fn parse_line(line: &str) -> std::result::Result<InterfaceCounters<'_>, String> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or("empty line")?;
        let (name, first) = match head.split_once(':') {
            Some((name, "")) => (name, None),
            Some((name, rest)) => (name, Some(rest)),
            None => return Err(format!("no ':' after interface name in {head:?}")),
        };

        let fields = first
            .into_iter()
            .chain(tokens)
            .take(NETDEV_FIELDS)
            .map(|f| f.parse::<u64>().map_err(|_| format!("non-numeric field {f:?}")))
            .collect::<std::result::Result<Vec<u64>, String>>()?;
        if fields.len() < NETDEV_FIELDS {
            return Err(format!("expected {NETDEV_FIELDS} fields, got {}", fields.len()));
        }

        Ok(InterfaceCounters {
            name,
            rx_bytes: fields[RX_BYTES],
            tx_bytes: fields[TX_BYTES],
        })
    }

    /// Sum receive and transmit bytes across non-loopback interfaces.
    /// Unparseable lines are skipped.
    pub fn parse_netdev(content: &str, timestamp: f64) -> Result<NetSnapshot> {
        let mut lines = content.lines();
        if lines.next().is_none() || lines.next().is_none() {
            return Err(SampleError::malformed(MonitorKind::Net, "missing header lines"));
        }

        let mut snapshot = NetSnapshot { recv_bytes: 0, sent_bytes: 0, timestamp };
        let mut data_lines = 0usize;
        let mut parsed = 0usize;
        for line in lines.filter(|l| !l.trim().is_empty()) {
            data_lines += 1;
            let iface = match Self::parse_line(line) {
                Ok(iface) => iface,
                Err(reason) => {
                    debug!(line = line.trim(), %reason, "skipping net/dev line");
                    continue;
                }
            };
            parsed += 1;
            if iface.name == LOOPBACK {
                continue;
            }
            snapshot.recv_bytes = snapshot.recv_bytes.saturating_add(iface.rx_bytes);
            snapshot.sent_bytes = snapshot.sent_bytes.saturating_add(iface.tx_bytes);
        }

        // Committing an all-zero snapshot here would turn the next good read
        // into a huge spike.
        if data_lines > 0 && parsed == 0 {
            return Err(SampleError::malformed(
                MonitorKind::Net,
                format!("none of {data_lines} interface lines parsed"),
            ));
        }
        Ok(snapshot)
    }

    /// Byte rates between two snapshots. A counter that went backwards
    /// (interface reset, suspend) contributes a rate of zero.
    pub fn rates(prev: &NetSnapshot, next: &NetSnapshot) -> Result<NetRates> {
        let elapsed = next.timestamp - prev.timestamp;
        if elapsed.is_nan() || elapsed <= 0.0 {
            return Err(SampleError::DegenerateInterval { elapsed });
        }
        let rate = |now: u64, before: u64| {
            if now >= before {
                (now - before) as f64 / elapsed
            } else {
                0.0
            }
        };
        Ok(NetRates {
            down: rate(next.recv_bytes, prev.recv_bytes),
            up: rate(next.sent_bytes, prev.sent_bytes),
        })
    }
}

impl Monitorable for NetSampler {
    /// `None` on the seeding sample.
    type Reading = Option<NetRates>;

    fn kind(&self) -> MonitorKind {
        MonitorKind::Net
    }

    fn parse_from_str(&mut self, s: &str, now: f64) -> Result<Option<NetRates>> {
        let next = Self::parse_netdev(s, now)?;
        // The new snapshot is committed even when the interval is degenerate.
        let prev = self.prev.replace(next);
        prev.map(|prev| Self::rates(&prev, &next)).transpose()
    }
}
