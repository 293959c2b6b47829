//! Audit capture for mutations of designated entities.
//!
//! Every insert, update and delete on an auditable entity produces one
//! append-only [`AuditRecord`], written through a sink whose persistence
//! is independent of the business transaction that caused the change.
//! Capture failures are logged and swallowed: losing an audit event is
//! preferred over blocking the operation that triggered it.

pub mod auditable;
pub mod record;
pub mod recorder;
pub mod sink;
pub mod store;

pub use auditable::Auditable;
pub use record::{Actor, AuditAction, AuditContext, AuditDetail, AuditRecord, RequestOrigin};
pub use recorder::AuditRecorder;
pub use sink::{AuditSink, MemoryAuditSink, SinkError};
pub use store::{Audited, EntityStore};
