//! File-based key provider for Custodia.
//!
//! This provider stores the field-cipher key in the filesystem and is
//! suitable for development and testing environments.

#![warn(clippy::pedantic, clippy::nursery)]

use custodia::error::KeyProviderError;
use custodia::key_provider::{KeyProvider, CIPHER_KEY_SIZE};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretVec;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

/// Name of the cipher key file inside the key directory.
const KEY_FILE: &str = "cipher.key";

/// File-based key provider for development and testing.
///
/// Keys are stored in the filesystem with the following structure:
/// ```text
/// keys/
/// └── cipher.key      (32 bytes, 0600 permissions)
/// ```
pub struct FileKeyProvider {
    key_path: PathBuf,
}

impl FileKeyProvider {
    /// Opens an existing key directory.
    ///
    /// # Arguments
    ///
    /// * `key_dir` - Directory containing the key file
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::KeyNotFound` if the key file is absent.
    pub fn new(key_dir: impl Into<PathBuf>) -> Result<Self, KeyProviderError> {
        let key_path = key_dir.into().join(KEY_FILE);
        if !key_path.exists() {
            return Err(KeyProviderError::KeyNotFound(key_path.display().to_string()));
        }
        Ok(Self { key_path })
    }

    /// Initializes a key directory with a freshly generated 256-bit key.
    ///
    /// Refuses to overwrite an existing key file: replacing a live key
    /// makes every stored ciphertext undecryptable.
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::CreationFailed` if a key already
    /// exists, or an I/O error if directory creation or the write fails.
    pub fn init(key_dir: impl Into<PathBuf>) -> Result<(), KeyProviderError> {
        let key_dir = key_dir.into();
        fs::create_dir_all(&key_dir)?;

        let key_path = key_dir.join(KEY_FILE);
        if key_path.exists() {
            return Err(KeyProviderError::CreationFailed(format!(
                "key file already exists: {}",
                key_path.display()
            )));
        }

        let mut key = [0u8; CIPHER_KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        fs::write(&key_path, key)?;
        key.zeroize();

        restrict_permissions(&key_path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl KeyProvider for FileKeyProvider {
    fn cipher_key(&self) -> Result<SecretVec<u8>, KeyProviderError> {
        let bytes = fs::read(&self.key_path)?;
        if bytes.len() != CIPHER_KEY_SIZE {
            return Err(KeyProviderError::InvalidKey(format!(
                "expected {CIPHER_KEY_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(SecretVec::new(bytes))
    }
}
