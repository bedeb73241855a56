//! Password hashing and verification utilities.
//!
//! Uses Argon2id with a service-wide salt taken from the configuration, so the
//! stored value is the raw KDF output rather than a PHC string.

use argon2::{Algorithm, Argon2, Params, Version};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// 37 MiB, expressed in KiB.
pub const ARGON2ID_MEMORY_KIB: u32 = 37 * 1024;
pub const ARGON2ID_ITERATIONS: u32 = 1;
pub const ARGON2ID_PARALLELISM: u32 = 1;
pub const ARGON2ID_HASH_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Argon2 error: {0}")]
    Argon2(argon2::Error),
}

/// Derives a password hash from a password and a salt.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, HashError>;
}

/// Argon2id with the OWASP minimum parameters (m=37 MiB, t=1, p=1).
#[derive(Clone, Debug, Default)]
pub struct Argon2idHasher;

impl PasswordHasher for Argon2idHasher {
    fn hash(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, HashError> {
        let params = Params::new(
            ARGON2ID_MEMORY_KIB,
            ARGON2ID_ITERATIONS,
            ARGON2ID_PARALLELISM,
            Some(ARGON2ID_HASH_LENGTH),
        )
        .map_err(HashError::Argon2)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = vec![0u8; ARGON2ID_HASH_LENGTH];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut out)
            .map_err(HashError::Argon2)?;
        Ok(out)
    }
}

/// Compare two hashes without leaking the position of the first difference.
pub fn hashes_match(stored: &[u8], candidate: &[u8]) -> bool {
    stored.ct_eq(candidate).into()
}

/// Random string of `len` lowercase ASCII letters, used for OAuth2 `state` and `nonce`.
pub fn random_alpha_lower(len: usize) -> Result<String, getrandom::Error> {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    // Largest multiple of 26 below 256, to keep the distribution uniform.
    const LIMIT: u8 = 234;

    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 32];
    while out.len() < len {
        getrandom::fill(&mut buf)?;
        for byte in buf.iter().copied().filter(|b| *b < LIMIT) {
            if out.len() == len {
                break;
            }
            out.push(ALPHABET[(byte % 26) as usize] as char);
        }
    }
    Ok(out)
}
