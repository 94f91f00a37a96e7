//! Password hashing and verification.
//!
//! Passwords are stored as Argon2id digests in PHC string form. The salt and
//! parameters travel inside the digest, so verification needs nothing else.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{Error, Result};

/// One-way digest of a user's password
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash a plaintext password under a fresh random salt
    pub fn hash(plaintext: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Password(format!("hash password: {e}")))?;

        Ok(Self(hash.to_string()))
    }

    /// Wrap a digest loaded from the store, rejecting anything that is not a PHC string
    pub fn from_phc(phc: String) -> Result<Self> {
        PasswordHash::new(&phc).map_err(|e| Error::Password(format!("parse digest: {e}")))?;
        Ok(Self(phc))
    }

    /// Check a plaintext candidate against this digest
    pub fn verify(&self, plaintext: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}
