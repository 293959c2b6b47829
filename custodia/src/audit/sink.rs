//! Persistence seam for audit records.

use std::sync::Mutex;

use crate::audit::record::{AuditDetail, AuditRecord};

/// Error surfaced by an [`AuditSink`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("audit sink error: {0}")]
pub struct SinkError(pub String);

/// Appends audit records to durable storage.
///
/// Implementations must write in a transaction independent of the
/// business mutation that triggered the record: the audit row must be
/// able to commit even when the surrounding operation later aborts, and
/// its failure must not roll anything back. In practice that means a
/// dedicated connection or autonomous transaction, never the caller's
/// transaction scope.
pub trait AuditSink: Send + Sync {
    /// Appends one record and its field-level details.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the write fails. The recorder logs and
    /// swallows this; implementations should not retry internally.
    fn append(&self, record: &AuditRecord, details: &[AuditDetail]) -> Result<(), SinkError>;
}

/// In-memory sink recording appended entries, for tests and embedding.
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<(AuditRecord, Vec<AuditDetail>)>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    #[must_use]
    pub fn entries(&self) -> Vec<(AuditRecord, Vec<AuditDetail>)> {
        self.entries.lock().map(|entries| entries.clone()).unwrap_or_default()
    }

    /// Number of records appended.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or_default()
    }

    /// True when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, record: &AuditRecord, details: &[AuditDetail]) -> Result<(), SinkError> {
        let mut entries =
            self.entries.lock().map_err(|_| SinkError("lock poisoned".to_string()))?;
        entries.push((record.clone(), details.to_vec()));
        Ok(())
    }
}
