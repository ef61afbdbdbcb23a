//! Pre-shared secret for gate pass tokens
//!
//! The secret is supplied through the environment and turned into a 256-bit
//! key with SHA-256. Loading fails closed: there is no default secret, and a
//! missing, empty or short value is an error.

use sha2::{Digest, Sha256};
use std::env;
use thiserror::Error;
use zeroize::Zeroizing;

/// Default environment variable holding the secret
pub const DEFAULT_SECRET_ENV: &str = "GATEPASS_QR_SECRET";

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("shared secret not set (environment variable {0})")]
    Missing(String),
    #[error("shared secret too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
}

/// Key material derived from the pre-shared secret. Zeroized on drop.
#[derive(Clone)]
pub struct SharedSecret {
    key: Zeroizing<[u8; 32]>,
}

impl SharedSecret {
    /// Derive the key from raw secret bytes
    pub fn from_bytes(secret: &[u8]) -> Result<Self, SecretError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SecretError::TooShort { len: secret.len(), min: MIN_SECRET_LEN });
        }

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&Sha256::digest(secret));
        Ok(Self { key })
    }

    /// Read the secret from an environment variable
    pub fn from_env(var: &str) -> Result<Self, SecretError> {
        let value = Zeroizing::new(env::var(var).unwrap_or_default());
        if value.trim().is_empty() {
            return Err(SecretError::Missing(var.to_string()));
        }
        Self::from_bytes(value.as_bytes())
    }

    pub(crate) fn key(&self) -> &[u8; 32] {
        &self.key
    }

    /// Short hex fingerprint for logs, safe to print
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.as_slice());
        hex::encode(&digest[..6])
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret").field("fingerprint", &self.fingerprint()).finish()
    }
}
