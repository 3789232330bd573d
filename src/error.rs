use thiserror::Error;
use crate::range::Range;

pub type Result<T, E = FileDataError> = std::result::Result<T, E>;

/// Errors produced by blob store implementations. The core passes these through untouched and
/// never retries.
#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob store error: {0}")]
    Storage(String),

    #[error("blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FileDataError {
    /// Two ranges which should be disjoint overlap. This means whoever generated the operations
    /// (or the raw data) is broken. Its never safe to paper over this.
    #[error("ranges overlap: {first:?} and {second:?}")]
    OverlappingRanges { first: Range, second: Range },

    /// An empty range made it into a list which only holds non-empty ranges.
    #[error("empty range at position {pos}")]
    EmptyRange { pos: usize },

    #[error("cannot merge {first:?} and {second:?}")]
    CannotMerge { first: Range, second: Range },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("blob not found: {0}")]
    BlobNotFound(String),

    #[error("unexpected file data: {0}")]
    UnexpectedFileData(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{message} (operation: {operation})")]
    Apply { message: &'static str, operation: String },

    #[error("inserted text contains non BMP characters")]
    InvalidInsertion,

    #[error("resulting string would be too long: {0}")]
    TooLong(usize),

    #[error("{operation} not implemented for {kind}")]
    NotImplemented { operation: &'static str, kind: &'static str },

    #[error("unknown tracking type: {0}")]
    UnknownTrackingType(String),

    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error(transparent)]
    BlobStore(BlobStoreError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<BlobStoreError> for FileDataError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::NotFound(hash) => FileDataError::BlobNotFound(hash),
            err => FileDataError::BlobStore(err),
        }
    }
}

impl FileDataError {
    pub(crate) fn invalid_range(msg: impl Into<String>) -> Self {
        FileDataError::InvalidRange(msg.into())
    }

    pub(crate) fn apply_error(message: &'static str, operation: &impl std::fmt::Display) -> Self {
        FileDataError::Apply { message, operation: operation.to_string() }
    }
}
