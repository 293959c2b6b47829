//! In-memory access store for tests and single-process deployments.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::permission::engine::{AccessStore, Principal, StoreError};
use crate::permission::registry::{ActionRecord, Role, RoleAction};

/// `AccessStore` backed by process memory.
///
/// Mutators model the administrative surface (role, action and grant
/// maintenance); the engine only uses the read side. The `(role, action)`
/// pair is unique by construction.
#[derive(Default)]
pub struct InMemoryAccessStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    principals: HashMap<String, Principal>,
    roles: HashMap<i64, Role>,
    actions: HashMap<i64, ActionRecord>,
    grants: HashSet<RoleAction>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a role.
    pub fn insert_role(&self, role: Role) {
        if let Ok(mut tables) = self.inner.write() {
            tables.roles.insert(role.id, role);
        }
    }

    /// Inserts or replaces an action.
    pub fn insert_action(&self, action: ActionRecord) {
        if let Ok(mut tables) = self.inner.write() {
            tables.actions.insert(action.id, action);
        }
    }

    /// Grants an action to a role; granting twice keeps a single row.
    pub fn grant(&self, role_id: i64, action_id: i64) {
        if let Ok(mut tables) = self.inner.write() {
            tables.grants.insert(RoleAction { role_id, action_id });
        }
    }

    /// Removes a grant.
    pub fn revoke(&self, role_id: i64, action_id: i64) {
        if let Ok(mut tables) = self.inner.write() {
            tables.grants.remove(&RoleAction { role_id, action_id });
        }
    }

    /// Inserts or replaces a principal, keyed by its search digest.
    pub fn insert_principal(&self, principal: Principal) {
        if let Ok(mut tables) = self.inner.write() {
            tables.principals.insert(principal.search_key.clone(), principal);
        }
    }

    /// Flips an action's active flag.
    pub fn set_action_active(&self, action_id: i64, active: bool) {
        if let Ok(mut tables) = self.inner.write() {
            if let Some(action) = tables.actions.get_mut(&action_id) {
                action.is_active = active;
            }
        }
    }

    /// Flips a principal's active flag.
    pub fn set_principal_active(&self, search_key: &str, active: bool) {
        if let Ok(mut tables) = self.inner.write() {
            if let Some(principal) = tables.principals.get_mut(search_key) {
                principal.is_active = active;
            }
        }
    }
}

impl AccessStore for InMemoryAccessStore {
    fn find_principal(&self, search_key: &str) -> Result<Option<Principal>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError("lock poisoned".to_string()))?;
        Ok(tables.principals.get(search_key).cloned())
    }

    fn find_action(&self, code: &str) -> Result<Option<ActionRecord>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError("lock poisoned".to_string()))?;
        Ok(tables.actions.values().find(|action| action.code == code).cloned())
    }

    fn role_grants_action(&self, role_id: i64, code: &str) -> Result<bool, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError("lock poisoned".to_string()))?;
        Ok(tables.actions.values().any(|action| {
            action.code == code
                && action.is_active
                && tables.grants.contains(&RoleAction { role_id, action_id: action.id })
        }))
    }

    fn actions_for_role(&self, role_id: i64) -> Result<Vec<String>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError("lock poisoned".to_string()))?;
        let mut codes: Vec<String> = tables
            .grants
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .filter_map(|grant| tables.actions.get(&grant.action_id))
            .filter(|action| action.is_active)
            .map(|action| action.code.clone())
            .collect();
        codes.sort();
        Ok(codes)
    }
}
