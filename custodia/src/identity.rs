//! Identity records and the sealed identifier pair.
//!
//! The lookup digest and the ciphertext are two projections of the same
//! canonical value and must never diverge: a record whose digest was
//! computed from one value and whose ciphertext holds another is
//! unfindable or undecryptable forever. [`seal`] is the only constructor
//! of the pair, so both fields always come from one normalization pass.

use serde::{Deserialize, Serialize};

use crate::cipher::FieldCipher;
use crate::error::Error;
use crate::normalize::normalize;
use crate::search_hash::search_digest;

/// Number of search-key characters exposed by the masked placeholder.
const MASK_PREFIX_LEN: usize = 8;

/// Lookup digest and ciphertext derived from one canonical identifier.
///
/// `search_key` is the unique indexed surrogate for exact-match queries;
/// `ciphertext` is an opaque blob consumed only by the field cipher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedIdentifier {
    /// Deterministic lookup digest of the canonical value
    pub search_key: String,
    /// AES-256-GCM blob of the canonical value
    pub ciphertext: String,
}

/// An account identity as the core stores it.
///
/// The plaintext identifier never appears here; only the sealed pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Primary key; `None` until persisted
    pub id: Option<i64>,
    /// Sealed identifier pair
    pub identifier: SealedIdentifier,
    /// Role reference for permission checks
    pub role_id: i64,
    /// Inactive identities fail every permission check
    pub is_active: bool,
    /// Whether the identifier has been verified by its owner
    pub is_verified: bool,
}

/// Seals a raw identifier into its digest/ciphertext pair.
///
/// The value is normalized once and both fields are derived from that
/// canonical form, which is what keeps lookup and display consistent.
///
/// # Errors
///
/// Returns error if encryption fails. Write paths must abort on error
/// rather than persist a partial record.
pub fn seal(cipher: &FieldCipher, raw: &str) -> Result<SealedIdentifier, Error> {
    let canonical = normalize(raw);
    let search_key = search_digest(&canonical);
    let ciphertext = cipher.encrypt(&canonical)?;
    Ok(SealedIdentifier { search_key, ciphertext })
}

impl IdentityRecord {
    /// Replaces the identifier, updating digest and ciphertext together.
    ///
    /// # Errors
    ///
    /// Returns error if sealing fails; the record is left unchanged.
    pub fn set_identifier(&mut self, cipher: &FieldCipher, raw: &str) -> Result<(), Error> {
        self.identifier = seal(cipher, raw)?;
        Ok(())
    }
}

/// Decrypts a sealed identifier for display.
///
/// Display must not crash when the blob is unreadable under the current
/// key (tampering, or data encrypted before a key change): failures are
/// logged and replaced with [`masked_placeholder`]. Lookup and existence
/// paths never call this; they query by `search_key`.
#[must_use]
pub fn display_identifier(cipher: &FieldCipher, sealed: &SealedIdentifier) -> String {
    match cipher.decrypt(&sealed.ciphertext) {
        Ok(plaintext) => plaintext,
        Err(err) => {
            tracing::warn!(error = %err, "identifier unreadable under current key, masking");
            masked_placeholder(&sealed.search_key)
        }
    }
}

/// The display-unavailable placeholder: `***@` plus a search-key prefix.
///
/// The prefix identifies the record to an operator without revealing
/// anything beyond what the indexed digest column already stores.
#[must_use]
pub fn masked_placeholder(search_key: &str) -> String {
    let prefix: String = search_key.chars().take(MASK_PREFIX_LEN).collect();
    format!("***@{prefix}...")
}
