//! Audit record construction and best-effort persistence.

use std::sync::Arc;

use chrono::Utc;

use crate::audit::auditable::Auditable;
use crate::audit::record::{AuditAction, AuditContext, AuditDetail, AuditRecord};
use crate::audit::sink::AuditSink;

/// Address recorded when no request origin is present.
const SYSTEM_ORIGIN: &str = "SYSTEM";

/// Builds audit records from mutation context and appends them through a
/// sink.
///
/// Every method is best-effort: a sink failure is logged at error level
/// and swallowed, never returned. Audit capture must not become a point
/// of failure for the operation it observes.
pub struct AuditRecorder<K: AuditSink> {
    sink: Arc<K>,
}

impl<K: AuditSink> AuditRecorder<K> {
    /// Creates a recorder over the given sink.
    pub fn new(sink: K) -> Self {
        Self { sink: Arc::new(sink) }
    }

    /// Returns a handle to the underlying sink.
    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Captures one record for a mutated entity.
    pub fn capture<E: Auditable + ?Sized>(
        &self,
        entity: &E,
        action: AuditAction,
        ctx: &AuditContext,
    ) {
        self.capture_with_details(entity, action, ctx, &[]);
    }

    /// Captures one record for a mutated entity, with field-level
    /// old/new value pairs.
    pub fn capture_with_details<E: Auditable + ?Sized>(
        &self,
        entity: &E,
        action: AuditAction,
        ctx: &AuditContext,
        details: &[AuditDetail],
    ) {
        self.append(Self::build(entity.table_name(), entity.record_id(), action, ctx), details);
    }

    /// Records a business event (e.g. `LOGIN`) not tied to an entity
    /// store mutation.
    pub fn record_event(
        &self,
        table_name: &str,
        record_id: Option<i64>,
        action: AuditAction,
        ctx: &AuditContext,
    ) {
        self.append(Self::build(table_name, record_id, action, ctx), &[]);
    }

    fn build(
        table_name: &str,
        record_id: Option<i64>,
        action: AuditAction,
        ctx: &AuditContext,
    ) -> AuditRecord {
        AuditRecord {
            table_name: table_name.to_string(),
            record_id,
            action,
            changed_by: ctx.actor.to_string(),
            changed_date: Utc::now(),
            ip_address: ctx
                .origin
                .as_ref()
                .map_or_else(|| SYSTEM_ORIGIN.to_string(), |origin| origin.ip_address.clone()),
            user_agent: ctx.origin.as_ref().and_then(|origin| origin.user_agent.clone()),
        }
    }

    fn append(&self, record: AuditRecord, details: &[AuditDetail]) {
        match self.sink.append(&record, details) {
            Ok(()) => {
                tracing::info!(
                    action = %record.action,
                    table = %record.table_name,
                    record = ?record.record_id,
                    by = %record.changed_by,
                    "audit record created"
                );
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    action = %record.action,
                    table = %record.table_name,
                    "audit write failed, continuing"
                );
            }
        }
    }
}

impl<K: AuditSink> Clone for AuditRecorder<K> {
    fn clone(&self) -> Self {
        Self { sink: Arc::clone(&self.sink) }
    }
}
