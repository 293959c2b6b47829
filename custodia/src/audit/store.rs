//! Automatic capture on entity store mutations.

use crate::audit::auditable::Auditable;
use crate::audit::record::{AuditAction, AuditContext};
use crate::audit::recorder::AuditRecorder;
use crate::audit::sink::AuditSink;

/// Persistence operations for one auditable entity kind.
///
/// Implemented by the storage collaborator; `insert` takes the entity
/// mutably so the store can assign its primary key.
pub trait EntityStore: Send + Sync {
    /// The entity kind this store persists.
    type Entity: Auditable;
    /// The store's own failure type.
    type Error: std::error::Error;

    /// Persists a new entity, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    fn insert(&self, entity: &mut Self::Entity) -> Result<(), Self::Error>;

    /// Persists changes to an existing entity.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    fn update(&self, entity: &Self::Entity) -> Result<(), Self::Error>;

    /// Removes an entity.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    fn delete(&self, entity: &Self::Entity) -> Result<(), Self::Error>;
}

/// Decorates an entity store so every successful mutation captures
/// exactly one audit record, with no action required from calling code.
///
/// The record is captured after the mutation commits (a failed mutation
/// produces no record), and capture failure never surfaces to the
/// caller.
pub struct Audited<S: EntityStore, K: AuditSink> {
    inner: S,
    recorder: AuditRecorder<K>,
}

impl<S: EntityStore, K: AuditSink> Audited<S, K> {
    /// Wraps `inner` with audit capture through `recorder`.
    pub fn new(inner: S, recorder: AuditRecorder<K>) -> Self {
        Self { inner, recorder }
    }

    /// Returns the wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the recorder used for capture.
    #[must_use]
    pub fn recorder(&self) -> &AuditRecorder<K> {
        &self.recorder
    }

    /// Inserts through the inner store, then captures an `INSERT` record.
    ///
    /// # Errors
    ///
    /// Returns the inner store's error; no record is captured on failure.
    pub fn insert(&self, entity: &mut S::Entity, ctx: &AuditContext) -> Result<(), S::Error> {
        self.inner.insert(entity)?;
        self.recorder.capture(entity, AuditAction::Insert, ctx);
        Ok(())
    }

    /// Updates through the inner store, then captures an `UPDATE` record.
    ///
    /// # Errors
    ///
    /// Returns the inner store's error; no record is captured on failure.
    pub fn update(&self, entity: &S::Entity, ctx: &AuditContext) -> Result<(), S::Error> {
        self.inner.update(entity)?;
        self.recorder.capture(entity, AuditAction::Update, ctx);
        Ok(())
    }

    /// Deletes through the inner store, then captures a `DELETE` record.
    ///
    /// # Errors
    ///
    /// Returns the inner store's error; no record is captured on failure.
    pub fn delete(&self, entity: &S::Entity, ctx: &AuditContext) -> Result<(), S::Error> {
        self.inner.delete(entity)?;
        self.recorder.capture(entity, AuditAction::Delete, ctx);
        Ok(())
    }
}
