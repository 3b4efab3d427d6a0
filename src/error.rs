/// Errors returned by views, buffers and the recompute engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Index outside `[0, len)` on a time series view or output buffer.
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Output slot outside the slots the indicator was created with, or a
    /// slot that was never declared.
    #[error("no output buffer at slot {index} ({slots} slots)")]
    NoSuchOutput { index: usize, slots: usize },

    /// `bind` called on an indicator that is already bound.
    #[error("indicator is already bound to a bar list")]
    AlreadyBound,

    /// Output declared or configured on an indicator with no bar list.
    #[error("indicator is not bound to a bar list")]
    NotBound,

    /// The shared bar list was dropped while a view still referenced it.
    #[error("bar list is no longer alive")]
    Detached,

    /// The bar list is mutably borrowed by its source.
    #[error("bar list is being mutated by its source")]
    Busy,

    /// `update` reached an indicator that is already mid-update.
    #[error("indicator update re-entered (dependency cycle?)")]
    Reentrant,

    /// A calculation step reported more finalized bars than exist.
    #[error("calculation returned watermark {returned} above rates_total {rates_total}")]
    WatermarkOverrun { returned: usize, rates_total: usize },
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
