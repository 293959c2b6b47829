//! Field cipher for the encrypted identifier.
//!
//! Encrypts the canonical identifier with AES-256-GCM for storage and
//! display. Equality queries never decrypt; they run against the lookup
//! digest (see [`crate::search_hash`]). Decryption is only reached by
//! display paths, which must tolerate failure (see
//! [`crate::identity::display_identifier`]).

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use secrecy::ExposeSecret;

use crate::error::{ConfigurationError, Error};
use crate::key_provider::{KeyProvider, CIPHER_KEY_SIZE};

/// Nonce size for AES-256-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
const TAG_SIZE: usize = 16;

/// Authenticated encryption for a single sensitive field.
///
/// Blob format: `base64(nonce[12] || ciphertext || tag[16])`, stored as an
/// opaque string column. A fresh OS-random nonce is drawn for every
/// `encrypt` call; nonce reuse under the same key destroys GCM's
/// guarantees, so nonces are never derived from the input or from
/// process-local counters.
///
/// The cipher is stateless over its inputs and safe to share across
/// request-handling threads.
///
/// # Example
///
/// ```
/// use custodia::cipher::FieldCipher;
/// use custodia::key_provider::StaticKeyProvider;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = StaticKeyProvider::from_bytes(vec![7u8; 32])?;
/// let cipher = FieldCipher::new(&provider)?;
///
/// let blob = cipher.encrypt("jane.doe@example.com")?;
/// assert_eq!(cipher.decrypt(&blob)?, "jane.doe@example.com");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Creates a cipher from the provider's key material.
    ///
    /// # Errors
    ///
    /// Returns error if the provider fails or the key is not 256 bits;
    /// both are fatal at startup.
    pub fn new<P: KeyProvider>(provider: &P) -> Result<Self, Error> {
        let key = provider.cipher_key()?;
        let cipher = Aes256Gcm::new_from_slice(key.expose_secret()).map_err(|_| {
            Error::Configuration(ConfigurationError::InvalidKeyLength {
                expected: CIPHER_KEY_SIZE,
                actual: key.expose_secret().len(),
            })
        })?;

        tracing::debug!("field cipher initialized (AES-256-GCM)");
        Ok(Self { cipher })
    }

    /// Encrypts a canonical value for storage.
    ///
    /// Empty input passes through unchanged; an absent identifier is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::EncryptionFailed` if encryption fails. Callers on
    /// write paths must abort the surrounding operation on error: a
    /// record stored without its ciphertext is undecryptable forever.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| Error::EncryptionFailed(format!("AES-256-GCM encryption failed: {e}")))?;

        // nonce || ciphertext || tag (the aead crate appends the tag)
        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(blob))
    }

    /// Decrypts a stored blob back to the canonical value.
    ///
    /// Empty input passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Error::DecryptionFailed` for a malformed or truncated
    /// blob, and `Error::AuthenticationFailed` when the tag does not
    /// verify (tampering, corruption, or a key other than the one used at
    /// encryption time).
    pub fn decrypt(&self, blob: &str) -> Result<String, Error> {
        if blob.is_empty() {
            return Ok(String::new());
        }

        let decoded = STANDARD
            .decode(blob)
            .map_err(|e| Error::DecryptionFailed(format!("invalid base64: {e}")))?;

        if decoded.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::DecryptionFailed(format!(
                "blob too short: {} bytes",
                decoded.len()
            )));
        }

        let (nonce_bytes, ciphertext) = decoded.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| Error::AuthenticationFailed)?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::DecryptionFailed(format!("invalid UTF-8 plaintext: {e}")))
    }
}
