//! Account password hashing with Argon2id.
//!
//! Stored hashes are PHC strings. A hash starting with
//! [`UNUSABLE_PASSWORD_PREFIX`] marks an account that cannot sign in with a
//! password at all.

use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::Argon2;

use blogicum_core::ports::{AuthError, PasswordService};

/// Prefix of stored hashes that never match any password.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Password service for account registration and login.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        if stored.starts_with(UNUSABLE_PASSWORD_PREFIX) {
            return Ok(false);
        }

        let parsed = PasswordHash::new(stored).map_err(|e| {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            AuthError::HashingError(e.to_string())
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            // Anything else is a broken hash, not a wrong password.
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}
