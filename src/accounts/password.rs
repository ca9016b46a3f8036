//! Salted Argon2id password hashing with tunable cost.

use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

#[cfg(test)]
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::config::AuthConfig;
use crate::error::{PersonaError, Result};

/// Produces and checks PHC-format hashes. Parameters are encoded in each hash,
/// so hashes made under older settings keep verifying after a change.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
    /// Checked in place of a missing account so both rejections cost the same.
    decoy: String,
    #[cfg(test)]
    verify_calls: Arc<AtomicUsize>,
}

impl PasswordHashing {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| PersonaError::Config {
            message: format!("Invalid argon2 parameters: {}", e),
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let decoy = argon2
            .hash_password(uuid::Uuid::new_v4().as_bytes(), &salt)?
            .to_string();

        Ok(Self {
            argon2,
            decoy,
            #[cfg(test)]
            verify_calls: Arc::default(),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        #[cfg(test)]
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let parsed = PasswordHash::new(stored)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify against a stored hash, or against the decoy when there is none.
    /// A missing hash always yields `Ok(false)`.
    pub fn verify_stored(&self, password: &str, stored: Option<&str>) -> Result<bool> {
        match stored {
            Some(stored) => self.verify(password, stored),
            None => {
                self.verify(password, &self.decoy)?;
                Ok(false)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn verify_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}
