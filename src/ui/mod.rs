use serde::Deserialize;

pub mod format;
pub mod inline;
pub mod plain;

pub use format::{format_percent, format_rate, Presenter, StatusLine, PLACEHOLDER};
pub use inline::spawn_inline;
pub use plain::spawn_plain;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayKind {
    /// One line per sample.
    #[default]
    Plain,
    /// A single status line redrawn in place.
    Inline,
}

/// What a cell shows when its metric is absent.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbsentPolicy {
    #[default]
    Placeholder,
    /// Keep the last good value; placeholder until there is one.
    HoldLast,
}
