//! Lookup digest generation for searchable encryption.
//!
//! The digest is a deterministic one-way surrogate for the encrypted
//! identifier: equal identifiers always produce equal digests, so exact
//! lookups run against the digest column and never touch the ciphertext.
//! The identifier is never recovered from the digest.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use crate::normalize::normalize;

/// Length in characters of the encoded digest (base64 of 32 bytes).
pub const SEARCH_DIGEST_LEN: usize = 44;

/// Computes the lookup digest for an identifier.
///
/// The value is normalized before hashing, so raw and canonical input
/// produce the same digest:
/// `base64(SHA-256(utf8(normalize(value))))`.
///
/// The digest is stored as a unique indexed column and queried only with
/// exact equality.
///
/// # Example
///
/// ```
/// use custodia::search_hash::search_digest;
///
/// let a = search_digest("Jane.Doe@Example.com ");
/// let b = search_digest("jane.doe@example.com");
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn search_digest(value: &str) -> String {
    let canonical = normalize(value);
    let digest = Sha256::digest(canonical.as_bytes());
    STANDARD.encode(digest)
}
