//! Password hashing with Argon2id.
//!
//! Digests are PHC strings carrying their own salt and parameters, so a
//! stored digest is all `verify_password` needs. Comparison of the derived
//! hash is constant-time inside the `password-hash` crate.

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use tracing::warn;

/// Digest checked when the account does not exist, so a login for an
/// unknown email costs as much as a wrong password.
static DUMMY_DIGEST: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("kodak-missing-account").ok());

/// Build the dummy digest now rather than on the first unknown-email login.
/// Returns false if it could not be built.
pub fn warm_up() -> bool {
    LazyLock::force(&DUMMY_DIGEST).is_some()
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(digest.to_string())
}

/// True iff `password` matches `digest`. A malformed digest never matches.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password digest is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Spend one verification on the dummy digest. Always false.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(digest) = DUMMY_DIGEST.as_deref() {
        let _ = verify_password(password, digest);
    }
    false
}
