//! Password hashing
//!
//! PBKDF2-HMAC-SHA512 with a per-user random salt. The salt is rotated on
//! every successful login, so callers always store the pair together.

use sha2::Sha512;
use subtle::ConstantTimeEq;

/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 10_000;

/// Derived key length in bytes.
pub const HASH_LEN: usize = 64;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Hashed password together with the salt it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Derive a hash for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> PasswordHash {
    let salt = rand::random::<[u8; SALT_LEN]>().to_vec();
    let hash = derive(password, &salt);
    PasswordHash { hash, salt }
}

/// Recompute the hash with the stored salt and compare in constant time.
pub fn verify_password(password: &str, salt: &[u8], expected: &[u8]) -> bool {
    let computed = derive(password, salt);
    computed.ct_eq(expected).into()
}

fn derive(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, ITERATIONS, &mut out);
    out
}
