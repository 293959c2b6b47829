//! Role/action registry data and the closed action-code set.
//!
//! The registry rows are administered by an external collaborator (the
//! admin API); this core only reads them. Action codes used in
//! authorization rules are a closed enum so that a typo is a compile
//! error, and [`validate_action_registry`] checks the enum against the
//! seeded rows at startup so drift is caught at boot, not at request
//! time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::permission::engine::AccessStore;

/// Role master record: a named permission bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Primary key
    pub id: i64,
    /// Stable code, e.g. `DIETICIAN`
    pub code: String,
    /// Display name
    pub name: String,
    /// Inactive roles are retained for history but grant nothing new
    pub is_active: bool,
}

/// A named capability unit, grouped by module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Primary key
    pub id: i64,
    /// Stable code, e.g. `VIEW_PATIENT`
    pub code: String,
    /// Display name
    pub name: String,
    /// Functional area the action belongs to
    pub module: String,
    /// Inactive actions grant nothing, effective on the next check
    pub is_active: bool,
}

/// Association granting an action to a role.
///
/// The `(role_id, action_id)` pair is unique; this table is the sole
/// source of truth for "does role X grant action Y".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAction {
    /// Role side of the grant
    pub role_id: i64,
    /// Action side of the grant
    pub action_id: i64,
}

/// The closed set of action codes authorization rules may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCode {
    ViewPatient,
    CreatePatient,
    EditPatient,
    DeletePatient,
    ActivatePatient,
    DeactivatePatient,
    ViewDietician,
    CreateDietician,
    EditDietician,
    ActivateDietician,
    DeactivateDietician,
    ResetPatientPassword,
    ResetDieticianPassword,
    ManageRoles,
}

impl ActionCode {
    /// Every registered action code, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::ViewPatient,
        Self::CreatePatient,
        Self::EditPatient,
        Self::DeletePatient,
        Self::ActivatePatient,
        Self::DeactivatePatient,
        Self::ViewDietician,
        Self::CreateDietician,
        Self::EditDietician,
        Self::ActivateDietician,
        Self::DeactivateDietician,
        Self::ResetPatientPassword,
        Self::ResetDieticianPassword,
        Self::ManageRoles,
    ];

    /// The stable string form stored in the action table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewPatient => "VIEW_PATIENT",
            Self::CreatePatient => "CREATE_PATIENT",
            Self::EditPatient => "EDIT_PATIENT",
            Self::DeletePatient => "DELETE_PATIENT",
            Self::ActivatePatient => "ACTIVATE_PATIENT",
            Self::DeactivatePatient => "DEACTIVATE_PATIENT",
            Self::ViewDietician => "VIEW_DIETICIAN",
            Self::CreateDietician => "CREATE_DIETICIAN",
            Self::EditDietician => "EDIT_DIETICIAN",
            Self::ActivateDietician => "ACTIVATE_DIETICIAN",
            Self::DeactivateDietician => "DEACTIVATE_DIETICIAN",
            Self::ResetPatientPassword => "RESET_PATIENT_PASSWORD",
            Self::ResetDieticianPassword => "RESET_DIETICIAN_PASSWORD",
            Self::ManageRoles => "MANAGE_ROLES",
        }
    }

    /// Functional area the action belongs to.
    #[must_use]
    pub const fn module(self) -> &'static str {
        match self {
            Self::ViewPatient
            | Self::CreatePatient
            | Self::EditPatient
            | Self::DeletePatient
            | Self::ActivatePatient
            | Self::DeactivatePatient
            | Self::ResetPatientPassword => "PATIENT",
            Self::ViewDietician
            | Self::CreateDietician
            | Self::EditDietician
            | Self::ActivateDietician
            | Self::DeactivateDietician
            | Self::ResetDieticianPassword => "DIETICIAN",
            Self::ManageRoles => "ADMIN",
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that names no registered action code.
#[derive(Debug, thiserror::Error)]
#[error("unknown action code: {0}")]
pub struct UnknownActionCode(pub String);

impl FromStr for ActionCode {
    type Err = UnknownActionCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownActionCode(s.to_string()))
    }
}

/// Verifies at startup that every [`ActionCode`] exists in the action
/// table.
///
/// # Errors
///
/// Returns `ConfigurationError::MissingActions` listing every absent
/// code, or `ConfigurationError::RegistryUnavailable` if the store
/// cannot be read. Both are fatal: a permission literal with no backing
/// row would silently deny forever.
pub fn validate_action_registry<S: AccessStore>(store: &S) -> Result<(), ConfigurationError> {
    let mut missing = Vec::new();

    for code in ActionCode::ALL {
        match store.find_action(code.as_str()) {
            Ok(Some(_)) => {}
            Ok(None) => missing.push(code.as_str()),
            Err(err) => return Err(ConfigurationError::RegistryUnavailable(err.to_string())),
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::MissingActions(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_code_round_trip() {
        for code in ActionCode::ALL {
            assert_eq!(code.as_str().parse::<ActionCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_action_code_unknown() {
        let err = "DROP_TABLES".parse::<ActionCode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown action code: DROP_TABLES");
    }

    #[test]
    fn test_action_codes_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for code in ActionCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate code {code}");
        }
    }

    #[test]
    fn test_modules() {
        assert_eq!(ActionCode::ViewPatient.module(), "PATIENT");
        assert_eq!(ActionCode::EditDietician.module(), "DIETICIAN");
        assert_eq!(ActionCode::ManageRoles.module(), "ADMIN");
    }
}
