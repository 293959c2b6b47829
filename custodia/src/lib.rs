//! # Custodia
//!
//! Identity-and-access core for account-management platforms: searchable
//! encryption for a sensitive identifier, role/action permission checks,
//! and an append-only audit trail.
//!
//! ## Features
//!
//! - AES-256-GCM encryption at rest for the account identifier
//! - Deterministic lookup digest for exact-match queries without decryption
//! - Role → action permission engine with fail-closed evaluation
//! - Automatic audit capture for designated entity mutations
//! - One-time exchange-code store with TTL expiry
//!
//! ## Example
//!
//! ```rust,ignore
//! use custodia::prelude::*;
//!
//! let provider = StaticKeyProvider::from_base64(&std::env::var("ENCRYPTION_KEY")?)?;
//! let cipher = FieldCipher::new(&provider)?;
//!
//! let sealed = seal(&cipher, "Jane.Doe@Example.com ")?;
//! // store sealed.search_key (unique index) and sealed.ciphertext
//!
//! // exact lookup never decrypts:
//! let key = search_digest("jane.doe@example.com");
//! assert_eq!(key, sealed.search_key);
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod audit;
pub mod cipher;
pub mod code_store;
pub mod error;
pub mod identity;
pub mod key_provider;
pub mod normalize;
pub mod permission;
pub mod search_hash;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::audit::{
        Actor, AuditAction, AuditContext, AuditRecorder, AuditSink, Auditable,
    };
    pub use crate::cipher::FieldCipher;
    pub use crate::error::{ConfigurationError, Error, KeyProviderError};
    pub use crate::identity::{seal, IdentityRecord, SealedIdentifier};
    pub use crate::key_provider::{KeyProvider, StaticKeyProvider};
    pub use crate::normalize::normalize;
    pub use crate::permission::{AccessStore, ActionCode, PermissionEngine, Policy};
    pub use crate::search_hash::search_digest;
}
