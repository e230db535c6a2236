//! Reader configuration.

use crate::jazelle::format::banks::LayoutTable;

/// How bank-level decode failures are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Any bank or directory failure aborts the stream.
    Strict,
    /// Failing banks are dropped from the record; a malformed directory drops the record.
    #[default]
    Permissive,
}

/// What to do with VAX float bit patterns that have no IEEE equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatPolicy {
    /// Raise [`NumericDecode`](crate::JazelleError::NumericDecode).
    #[default]
    Fail,
    /// Substitute NaN and carry on.
    Nan,
}

/// Options for [`JazelleReader`](crate::JazelleReader).
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Stop after this many records have been yielded.
    pub max_records: Option<u64>,
    pub strictness: Strictness,
    pub float_policy: FloatPolicy,
    /// Log a progress line every N logical records. `None` disables it.
    pub progress_interval: Option<u64>,
    /// Bank layouts used for decoding.
    pub layouts: LayoutTable,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_records: None,
            strictness: Strictness::default(),
            float_policy: FloatPolicy::default(),
            progress_interval: Some(1000),
            layouts: LayoutTable::builtin(),
        }
    }
}

impl ReaderOptions {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            ..Self::default()
        }
    }

    pub fn with_max_records(mut self, limit: u64) -> Self {
        self.max_records = Some(limit);
        self
    }

    pub fn with_float_policy(mut self, policy: FloatPolicy) -> Self {
        self.float_policy = policy;
        self
    }

    pub fn with_progress_interval(mut self, interval: Option<u64>) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_layouts(mut self, layouts: LayoutTable) -> Self {
        self.layouts = layouts;
        self
    }
}
