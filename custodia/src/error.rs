//! Error types for Custodia operations.

use std::fmt;

/// Main error type for Custodia operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Encryption operation failed
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption operation failed (malformed or truncated blob)
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Authentication tag verification failed (data may be corrupted,
    /// tampered, or encrypted under a different key)
    #[error("authentication failed: ciphertext may be corrupted or tampered")]
    AuthenticationFailed,

    /// Key provider operation failed
    #[error("key provider error: {0}")]
    KeyProvider(#[from] KeyProviderError),

    /// Invalid configuration; fatal at startup
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Startup-time configuration failures. None of these are recoverable at
/// request time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Cipher key has the wrong length
    #[error("cipher key must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key size in bytes
        expected: usize,
        /// Size of the key actually supplied
        actual: usize,
    },

    /// Cipher key is not valid base64
    #[error("cipher key is not valid base64: {0}")]
    InvalidKeyEncoding(String),

    /// Registered action codes are missing from the action table
    #[error("action codes missing from the registry: {0}")]
    MissingActions(String),

    /// The access store could not be read during startup validation
    #[error("action registry unavailable: {0}")]
    RegistryUnavailable(String),
}

/// Errors specific to key provider operations.
#[derive(Debug)]
pub enum KeyProviderError {
    /// Key material not found
    KeyNotFound(String),

    /// Key creation failed
    CreationFailed(String),

    /// Key material present but unusable
    InvalidKey(String),

    /// I/O operation failed
    Io(std::io::Error),
}

impl fmt::Display for KeyProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound(what) => write!(f, "key not found: {what}"),
            Self::CreationFailed(msg) => write!(f, "key creation failed: {msg}"),
            Self::InvalidKey(msg) => write!(f, "invalid key: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for KeyProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeyProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
