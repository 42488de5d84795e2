//! Error types that cross the library boundary.

use thiserror::Error;

/// The one fatal outcome of a fetch batch.
///
/// The underlying cause is logged (target `ingest`) before this is returned;
/// it is intentionally not carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unable to fetch required data")]
pub struct DataFetchingError;

/// Failure reported by a [`SourceClient`](crate::ingest::types::SourceClient)
/// for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Worth retrying: timeouts, refused connections, upstream 5xx and the like.
    #[error("{0}")]
    Transient(String),

    /// The request can never succeed as configured; aborts the whole batch.
    #[error("structural fault: {0}")]
    Structural(String),
}

impl ClientError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }
}
