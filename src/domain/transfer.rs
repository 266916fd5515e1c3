use std::collections::HashMap;

use thiserror::Error;

use super::worklist::Worklist;

/// Literal written into the status column of every transferred row.
pub const STATUS_MARKER: &str = "Copied";

/// Closed set of failure kinds for the transfer pipeline. Detail (HTTP
/// status, response body, row number) travels as error-stack attachments.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    #[error("authentication with an external service failed")]
    Authentication,
    #[error("transport failure talking to an external service")]
    Transport,
    #[error("malformed response from an external service")]
    MalformedResponse,
    #[error("status write targeted an unexpected column")]
    OutOfRangeWrite,
}

/// Proof of one successful sink write, consumed by the Status Writer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub row_number: u32,
    pub record: HashMap<String, String>,
    pub response: serde_json::Value,
    pub status_column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl TransferSummary {
    pub fn new(processed: usize, succeeded: usize) -> Self {
        TransferSummary {
            processed,
            succeeded,
            failed: processed - succeeded,
        }
    }

    /// A run counts as successful when there was nothing eligible to do, or
    /// when at least one row went through.
    pub fn outcome(&self) -> bool {
        self.processed == 0 || self.succeeded > 0
    }
}

impl std::fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed: {}, transferred: {}, failed: {}",
            self.processed, self.succeeded, self.failed
        )
    }
}

#[async_trait::async_trait]
pub trait WorklistSource: Send + Sync {
    /// Reads the worklist and returns the header plus the eligible rows,
    /// padded to header width.
    async fn fetch_eligible(&self) -> error_stack::Result<Worklist, TransferError>;
}

#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Acquires the credential used by `push_record`. Failure is fatal to
    /// the run.
    async fn authenticate(&self) -> error_stack::Result<(), TransferError>;

    /// Creates one record in the sink and returns the raw response payload.
    async fn push_record(
        &self,
        record: &HashMap<String, String>,
    ) -> error_stack::Result<serde_json::Value, TransferError>;
}

#[async_trait::async_trait]
pub trait StatusWriter: Send + Sync {
    /// Marks every receipted row in the source. Per-row failures are logged
    /// and skipped; the returned count is the number of rows actually
    /// marked. An empty receipt list is a logged no-op.
    async fn mark_transferred(
        &self,
        receipts: &[TransferReceipt],
    ) -> error_stack::Result<usize, TransferError>;
}
