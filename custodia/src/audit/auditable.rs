//! The capability contract for auditable entities.

/// Implemented by every entity kind whose mutations are audited.
///
/// The entity exposes its own table identity and record id, so capture
/// works uniformly across entity kinds through static dispatch, with no
/// per-type special-casing and no runtime introspection. Most
/// implementations come from `#[derive(Auditable)]` in `custodia-derive`:
///
/// ```rust,ignore
/// use custodia_derive::Auditable;
///
/// #[derive(Auditable)]
/// #[audit(table = "roles")]
/// struct Role {
///     #[audit(id)]
///     id: Option<i64>,
///     code: String,
/// }
/// ```
pub trait Auditable {
    /// Table identity recorded in the audit trail.
    fn table_name(&self) -> &'static str;

    /// Primary key of the row, `None` before it is persisted.
    fn record_id(&self) -> Option<i64>;
}

impl Auditable for crate::identity::IdentityRecord {
    fn table_name(&self) -> &'static str {
        "identities"
    }

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

impl Auditable for crate::permission::Role {
    fn table_name(&self) -> &'static str {
        "roles"
    }

    fn record_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl Auditable for crate::permission::ActionRecord {
    fn table_name(&self) -> &'static str {
        "actions"
    }

    fn record_id(&self) -> Option<i64> {
        Some(self.id)
    }
}
