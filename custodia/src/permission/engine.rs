//! Permission evaluation against the role/action registry.

use std::fmt;
use std::sync::Arc;

use crate::permission::registry::{ActionCode, ActionRecord};

/// Error surfaced by an [`AccessStore`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("access store error: {0}")]
pub struct StoreError(pub String);

/// A principal as the permission engine needs it: identified by the
/// lookup digest of its identifier, never by plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Primary key
    pub id: i64,
    /// Lookup digest of the principal's identifier
    pub search_key: String,
    /// Role reference
    pub role_id: i64,
    /// Inactive principals are denied everything
    pub is_active: bool,
}

/// Read-only view of principals and the role/action registry.
///
/// Implementations must be thread-safe (`Send + Sync`). Writes happen
/// elsewhere (the admin collaborator); the engine only ever reads, and
/// reads fresh state on every call so revocation takes effect on the
/// next request.
pub trait AccessStore: Send + Sync {
    /// Looks up a principal by the lookup digest of its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn find_principal(&self, search_key: &str) -> Result<Option<Principal>, StoreError>;

    /// Looks up an action row by its stable code.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn find_action(&self, code: &str) -> Result<Option<ActionRecord>, StoreError>;

    /// True when an *active* action with `code` is granted to `role_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn role_grants_action(&self, role_id: i64, code: &str) -> Result<bool, StoreError>;

    /// Codes of all active actions granted to `role_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn actions_for_role(&self, role_id: i64) -> Result<Vec<String>, StoreError>;
}

/// Evaluates whether a principal's role grants a named action.
///
/// Every check is a fresh read; nothing is cached across calls. A denied
/// check is a normal `false` return, never an error.
///
/// # Example
///
/// ```rust,ignore
/// use custodia::permission::{ActionCode, PermissionEngine};
///
/// let engine = PermissionEngine::new(store);
/// if !engine.has_permission(&principal_key, ActionCode::ViewPatient) {
///     return deny();
/// }
/// ```
pub struct PermissionEngine<S: AccessStore> {
    store: Arc<S>,
}

impl<S: AccessStore> PermissionEngine<S> {
    /// Creates an engine over the given store.
    pub fn new(store: S) -> Self {
        Self { store: Arc::new(store) }
    }

    /// Returns a handle to the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks whether the principal identified by `principal_key` (the
    /// lookup digest of its identifier) may perform `action`.
    ///
    /// Fail-closed: a missing principal, inactive principal, missing
    /// grant, inactive action, or a store failure all evaluate to
    /// `false`. A store failure is logged; it must never fail open.
    #[must_use]
    pub fn has_permission(&self, principal_key: &str, action: ActionCode) -> bool {
        let principal = match self.store.find_principal(principal_key) {
            Ok(Some(principal)) => principal,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, action = %action, "principal lookup failed, denying");
                return false;
            }
        };

        if !principal.is_active {
            return false;
        }

        let granted = match self.store.role_grants_action(principal.role_id, action.as_str()) {
            Ok(granted) => granted,
            Err(err) => {
                tracing::warn!(error = %err, action = %action, "grant lookup failed, denying");
                false
            }
        };

        tracing::debug!(
            principal = principal.id,
            role = principal.role_id,
            action = %action,
            granted,
            "permission check"
        );

        granted
    }
}

impl<S: AccessStore> Clone for PermissionEngine<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: AccessStore> fmt::Debug for PermissionEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::memory::InMemoryAccessStore;
    use crate::permission::registry::{ActionRecord, Role};

    fn dietician_store() -> (InMemoryAccessStore, String) {
        let store = InMemoryAccessStore::new();
        store.insert_role(Role {
            id: 1,
            code: "DIETICIAN".to_string(),
            name: "Dietician".to_string(),
            is_active: true,
        });
        store.insert_action(ActionRecord {
            id: 10,
            code: "VIEW_PATIENT".to_string(),
            name: "View patient".to_string(),
            module: "PATIENT".to_string(),
            is_active: true,
        });
        store.insert_action(ActionRecord {
            id: 11,
            code: "EDIT_PATIENT".to_string(),
            name: "Edit patient".to_string(),
            module: "PATIENT".to_string(),
            is_active: true,
        });
        store.grant(1, 10);
        store.grant(1, 11);

        let key = "digest-of-dietician".to_string();
        store.insert_principal(Principal {
            id: 100,
            search_key: key.clone(),
            role_id: 1,
            is_active: true,
        });

        (store, key)
    }

    #[test]
    fn test_granted_action_allowed() {
        let (store, key) = dietician_store();
        let engine = PermissionEngine::new(store);

        assert!(engine.has_permission(&key, ActionCode::ViewPatient));
        assert!(engine.has_permission(&key, ActionCode::EditPatient));
    }

    #[test]
    fn test_unmapped_action_denied() {
        let (store, key) = dietician_store();
        let engine = PermissionEngine::new(store);

        assert!(!engine.has_permission(&key, ActionCode::DeletePatient));
    }

    #[test]
    fn test_unknown_principal_denied() {
        let (store, _) = dietician_store();
        let engine = PermissionEngine::new(store);

        assert!(!engine.has_permission("no-such-digest", ActionCode::ViewPatient));
    }

    #[test]
    fn test_inactive_principal_denied_despite_grant() {
        let (store, key) = dietician_store();
        store.set_principal_active(&key, false);
        let engine = PermissionEngine::new(store);

        assert!(!engine.has_permission(&key, ActionCode::ViewPatient));
    }

    #[test]
    fn test_deactivated_action_denied_on_next_check() {
        let (store, key) = dietician_store();
        let engine = PermissionEngine::new(store);

        assert!(engine.has_permission(&key, ActionCode::ViewPatient));
        engine.store().set_action_active(10, false);
        assert!(!engine.has_permission(&key, ActionCode::ViewPatient));
    }

    #[test]
    fn test_revoked_grant_denied_on_next_check() {
        let (store, key) = dietician_store();
        let engine = PermissionEngine::new(store);

        assert!(engine.has_permission(&key, ActionCode::EditPatient));
        engine.store().revoke(1, 11);
        assert!(!engine.has_permission(&key, ActionCode::EditPatient));
    }

    struct FailingStore;

    impl AccessStore for FailingStore {
        fn find_principal(&self, _: &str) -> Result<Option<Principal>, StoreError> {
            Err(StoreError("registry offline".to_string()))
        }

        fn find_action(&self, _: &str) -> Result<Option<ActionRecord>, StoreError> {
            Err(StoreError("registry offline".to_string()))
        }

        fn role_grants_action(&self, _: i64, _: &str) -> Result<bool, StoreError> {
            Err(StoreError("registry offline".to_string()))
        }

        fn actions_for_role(&self, _: i64) -> Result<Vec<String>, StoreError> {
            Err(StoreError("registry offline".to_string()))
        }
    }

    #[test]
    fn test_store_failure_fails_closed() {
        let engine = PermissionEngine::new(FailingStore);
        assert!(!engine.has_permission("any", ActionCode::ManageRoles));
    }
}
