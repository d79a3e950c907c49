use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use axum::extract::FromRef;
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::{config::HashingConfig, state::AppState};

/// A password on its way to storage. The variant is decided where the
/// value enters the service: request bodies are `Plaintext`, values read
/// back from the store are `Hashed`. Nothing downstream has to sniff
/// stored-format markers to avoid double-hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Plaintext(String),
    Hashed(String),
}

impl Credential {
    /// Resolve to the stored representation. Already-hashed values pass
    /// through unchanged.
    pub fn hash_with(self, hasher: &Hasher) -> anyhow::Result<String> {
        match self {
            Credential::Plaintext(plain) => hasher.hash(&plain),
            Credential::Hashed(hash) => Ok(hash),
        }
    }
}

/// Argon2id hasher with cost parameters taken from config.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
}

impl Hasher {
    pub fn new(cfg: &HashingConfig) -> Self {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .unwrap_or_else(|e| {
                warn!(error = %e, "invalid argon2 params in config, using defaults");
                Params::default()
            });
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A malformed stored hash counts as a mismatch rather than an error,
    /// so a corrupted row rejects the login instead of crashing it.
    pub fn verify(&self, plain: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2.verify_password(plain.as_bytes(), &parsed).is_ok()
    }
}

impl FromRef<AppState> for Hasher {
    fn from_ref(state: &AppState) -> Self {
        Hasher::new(&state.config.hashing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low-cost parameters keep the test suite fast; the contract under
    // test does not depend on cost.
    fn cheap_hasher() -> Hasher {
        Hasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap_hasher();
        let hash = hasher
            .hash("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_treats_malformed_hash_as_mismatch() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("anything", "not-a-valid-hash"));
        assert!(!hasher.verify("anything", ""));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn configured_cost_shows_up_in_the_hash() {
        let hasher = Hasher::new(&HashingConfig {
            memory_kib: 2048,
            iterations: 3,
            parallelism: 1,
        });
        let hash = hasher.hash("tunable").unwrap();
        assert!(hash.contains("m=2048,t=3,p=1"), "unexpected hash: {hash}");
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        // Zero iterations is below the argon2 minimum.
        let hasher = Hasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 0,
            parallelism: 1,
        });
        let hash = hasher.hash("still-works").unwrap();
        assert!(hasher.verify("still-works", &hash));
    }

    #[test]
    fn plaintext_credential_hashes_and_verifies() {
        let hasher = cheap_hasher();
        let stored = Credential::Plaintext("secret1".into())
            .hash_with(&hasher)
            .unwrap();
        assert_ne!(stored, "secret1");
        assert!(hasher.verify("secret1", &stored));
    }

    #[test]
    fn hashed_credential_passes_through_unchanged() {
        let hasher = cheap_hasher();
        let first = Credential::Plaintext("secret1".into())
            .hash_with(&hasher)
            .unwrap();
        let second = Credential::Hashed(first.clone())
            .hash_with(&hasher)
            .unwrap();
        assert_eq!(first, second);
    }
}
