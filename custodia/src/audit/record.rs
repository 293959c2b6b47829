//! Audit record data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of mutation or business event being recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// Row created
    Insert,
    /// Row changed
    Update,
    /// Row removed
    Delete,
    /// Successful authentication
    Login,
    /// Other business action, recorded under its own name
    Custom(String),
}

impl AuditAction {
    /// The stable string form stored in the audit table.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Login => "LOGIN",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting principal behind a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    /// No authentication context; system-initiated work
    #[default]
    System,
    /// Authenticated principal, recorded by the identifier the caller
    /// resolved from its authentication context
    Principal(String),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("SYSTEM"),
            Self::Principal(name) => f.write_str(name),
        }
    }
}

/// Where the triggering request came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
    /// Client address, after proxy-header resolution by the transport
    pub ip_address: String,
    /// Client user agent, if sent
    pub user_agent: Option<String>,
}

/// Everything the recorder needs about the circumstances of a mutation.
///
/// Built once per request by the transport layer and passed down
/// explicitly; the default (`Actor::System`, no origin) covers
/// system-initiated work such as seeding.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    /// The acting principal
    pub actor: Actor,
    /// Request origin; `None` outside a request
    pub origin: Option<RequestOrigin>,
}

impl AuditContext {
    /// Context for an authenticated request.
    #[must_use]
    pub fn principal(name: impl Into<String>, origin: Option<RequestOrigin>) -> Self {
        Self { actor: Actor::Principal(name.into()), origin }
    }

    /// Context for system-initiated work.
    #[must_use]
    pub fn system() -> Self {
        Self::default()
    }
}

/// One append-only audit row. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Table identity of the mutated entity
    pub table_name: String,
    /// Primary key of the mutated row, when known
    pub record_id: Option<i64>,
    /// What happened
    pub action: AuditAction,
    /// Acting principal, `"SYSTEM"` when unauthenticated
    pub changed_by: String,
    /// When the record was captured
    pub changed_date: DateTime<Utc>,
    /// Client address, `"SYSTEM"` outside a request
    pub ip_address: String,
    /// Client user agent, if any
    pub user_agent: Option<String>,
}

/// Field-level change attached to an audit record; persisted with and
/// owned by its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDetail {
    /// Name of the changed field
    pub field_name: String,
    /// Value before the change
    pub old_value: Option<String>,
    /// Value after the change
    pub new_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_strings() {
        assert_eq!(AuditAction::Insert.as_str(), "INSERT");
        assert_eq!(AuditAction::Update.as_str(), "UPDATE");
        assert_eq!(AuditAction::Delete.as_str(), "DELETE");
        assert_eq!(AuditAction::Login.as_str(), "LOGIN");
        assert_eq!(AuditAction::Custom("EXPORT".to_string()).as_str(), "EXPORT");
    }

    #[test]
    fn test_actor_display() {
        assert_eq!(Actor::System.to_string(), "SYSTEM");
        assert_eq!(Actor::Principal("jane".to_string()).to_string(), "jane");
    }

    #[test]
    fn test_default_context_is_system() {
        let ctx = AuditContext::default();
        assert_eq!(ctx.actor, Actor::System);
        assert!(ctx.origin.is_none());
    }
}
