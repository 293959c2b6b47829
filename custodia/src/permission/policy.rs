//! OR-combination of action codes as an explicit policy value.
//!
//! Authorization rules that accept any of several actions ("view patients
//! or view dieticians") carry the alternatives as data rather than as a
//! concatenated expression, so evaluation is a pure function over a list.

use crate::permission::engine::{AccessStore, PermissionEngine};
use crate::permission::registry::ActionCode;

/// A set of acceptable action codes; satisfying any one grants access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    alternatives: Vec<ActionCode>,
}

impl Policy {
    /// A policy satisfied by exactly one action.
    #[must_use]
    pub fn require(action: ActionCode) -> Self {
        Self { alternatives: vec![action] }
    }

    /// A policy satisfied by any of the given actions.
    ///
    /// An empty list grants nothing (fail-closed), consistent with the
    /// engine's treatment of missing data.
    #[must_use]
    pub fn any_of(actions: impl IntoIterator<Item = ActionCode>) -> Self {
        Self { alternatives: actions.into_iter().collect() }
    }

    /// The acceptable action codes, in the order given.
    #[must_use]
    pub fn alternatives(&self) -> &[ActionCode] {
        &self.alternatives
    }

    /// True when the principal holds at least one of the alternatives.
    #[must_use]
    pub fn is_satisfied<S: AccessStore>(
        &self,
        engine: &PermissionEngine<S>,
        principal_key: &str,
    ) -> bool {
        self.alternatives.iter().any(|&action| engine.has_permission(principal_key, action))
    }
}
