use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The record length is implied by its tag, so nothing after an unknown
    /// tag can be interpreted.
    #[error("unknown record type {tag} at offset {offset} (0-13 are valid)")]
    UnknownRecordType { offset: usize, tag: u8 },

    #[error("truncated record at offset {offset}: needed {needed} bytes, {available} left")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("negative callsign count {count} at offset {offset}")]
    InvalidCallsignCount { offset: usize, count: i32 },

    #[error("storage io error: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("inconsistent assembly: {0}")]
    InconsistentAssembly(String),

    #[error("vhs format error: {0}")]
    VhsFormat(String),
}

impl ConversionError {
    /// True for the one error kind the engine recovers from by keeping the
    /// records parsed so far.
    pub fn is_truncation(&self) -> bool {
        matches!(self, ConversionError::TruncatedRecord { .. })
    }
}
