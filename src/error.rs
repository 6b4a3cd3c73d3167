use crate::model::MonitorKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SampleError>;

/// Per-metric sampling failure. Never fatal: the engine turns it into an
/// absent value for that metric only.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("{kind} source {path:?} unreadable: {source}")]
    SourceUnreadable {
        kind: MonitorKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {kind} data: {reason}")]
    MalformedData { kind: MonitorKind, reason: String },

    #[error("no time elapsed between samples ({elapsed:.3}s)")]
    DegenerateInterval { elapsed: f64 },
}

impl SampleError {
    pub fn malformed(kind: MonitorKind, reason: impl Into<String>) -> Self {
        SampleError::MalformedData { kind, reason: reason.into() }
    }
}
