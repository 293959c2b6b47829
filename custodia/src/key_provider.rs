//! Key provider abstraction for cipher key material.

use base64::{engine::general_purpose::STANDARD, Engine};
use secrecy::{ExposeSecret, SecretVec};
use zeroize::Zeroize;

use crate::error::{ConfigurationError, KeyProviderError};

/// Size in bytes of the field-cipher key (256 bits).
pub const CIPHER_KEY_SIZE: usize = 32;

/// Supplies the symmetric key used by the field cipher.
///
/// Implementations must be thread-safe (`Send + Sync`); the key is read
/// once at cipher construction and is read-only for the life of the
/// process. There is no rotation or versioning.
///
/// # Example
///
/// ```rust,ignore
/// use custodia::key_provider::KeyProvider;
///
/// struct MyProvider;
///
/// impl KeyProvider for MyProvider {
///     fn cipher_key(&self) -> Result<SecretVec<u8>, KeyProviderError> {
///         // Implementation
///     }
/// }
/// ```
pub trait KeyProvider: Send + Sync {
    /// Returns the 256-bit AES key for the field cipher.
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::KeyNotFound` if no key material is
    /// configured, or `KeyProviderError::InvalidKey` if it is unusable.
    fn cipher_key(&self) -> Result<SecretVec<u8>, KeyProviderError>;
}

/// Key provider holding a key decoded from deployment configuration.
///
/// The usual source is a base64-encoded environment variable; a key of
/// any length other than 32 bytes is rejected at construction, which is
/// the fatal-at-startup path for misconfigured key material.
pub struct StaticKeyProvider {
    key: SecretVec<u8>,
}

impl StaticKeyProvider {
    /// Creates a provider from a base64-encoded 256-bit key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidKeyEncoding` for undecodable
    /// input and `ConfigurationError::InvalidKeyLength` for a key that is
    /// not 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigurationError> {
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigurationError::InvalidKeyEncoding(e.to_string()))?;
        Self::from_bytes(decoded)
    }

    /// Creates a provider from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidKeyLength` for a key that is
    /// not 32 bytes. The rejected buffer is zeroized.
    pub fn from_bytes(mut key: Vec<u8>) -> Result<Self, ConfigurationError> {
        if key.len() != CIPHER_KEY_SIZE {
            let actual = key.len();
            key.zeroize();
            return Err(ConfigurationError::InvalidKeyLength {
                expected: CIPHER_KEY_SIZE,
                actual,
            });
        }
        Ok(Self { key: SecretVec::new(key) })
    }
}

impl KeyProvider for StaticKeyProvider {
    fn cipher_key(&self) -> Result<SecretVec<u8>, KeyProviderError> {
        Ok(SecretVec::new(self.key.expose_secret().clone()))
    }
}
