//! Custom error types for the jazelle-reader crate.

use thiserror::Error;

use super::bank::BankId;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum JazelleError {
    /// An error originating from I/O operations on the byte source.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// A physical record header failed validation (implausible length or bad sync bits).
    #[error("Framing error at byte {offset}: {reason}")]
    Framing { offset: u64, reason: String },

    /// The stream ended inside a physical record header or payload.
    #[error("Truncated stream at byte {offset}: expected {expected} bytes, found {found}")]
    TruncatedStream {
        offset: u64,
        expected: usize,
        found: usize,
    },

    /// The continuation flags of consecutive physical records do not line up.
    #[error("Assembly error in logical record {record}: {reason}")]
    Assembly { record: u64, reason: String },

    /// The MiniDST table of contents or the bank layout of a record is malformed.
    #[error("Directory error in logical record {record}: {reason}")]
    Directory { record: u64, reason: String },

    /// No layout is registered for this bank identity and version.
    #[error("Unknown bank {bank} (version {version})")]
    UnknownBank { bank: BankId, version: u32 },

    /// Decoding a bank did not consume exactly its declared extent.
    #[error(
        "Length mismatch for bank {bank}: extent is {expected} bytes, decoding consumed {found}"
    )]
    BankLengthMismatch {
        bank: BankId,
        expected: usize,
        found: usize,
    },

    /// A legacy float carried a bit pattern reserved by the VAX format.
    #[error("Reserved VAX {width}-bit float pattern {bits:#x}")]
    NumericDecode { width: u8, bits: u64 },

    /// The file header or a record header is not what the format requires.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A fatal error raised while streaming, with the position it happened at.
    #[error(
        "Fatal error in logical record {record} at byte {offset} (last event: {}): {source}",
        describe_last_event(.last_event)
    )]
    Fatal {
        record: u64,
        last_event: Option<(i32, i32)>,
        offset: u64,
        #[source]
        source: Box<JazelleError>,
    },
}

impl JazelleError {
    /// Returns the underlying error, looking through any [`JazelleError::Fatal`] wrapper.
    pub fn root(&self) -> &JazelleError {
        match self {
            JazelleError::Fatal { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error concerns a single bank and may be skipped in permissive mode.
    pub fn is_bank_level(&self) -> bool {
        matches!(
            self.root(),
            JazelleError::UnknownBank { .. }
                | JazelleError::BankLengthMismatch { .. }
                | JazelleError::NumericDecode { .. }
        )
    }
}

fn describe_last_event(last_event: &Option<(i32, i32)>) -> String {
    match *last_event {
        Some((run, event)) => format!("run {} event {}", run, event),
        None => "none".to_string(),
    }
}

/// A convenience `Result` type alias using the crate's `JazelleError` type.
pub type Result<T> = std::result::Result<T, JazelleError>;
