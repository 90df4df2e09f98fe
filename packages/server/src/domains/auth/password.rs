//! Password hashing with bcrypt.

use anyhow::Result;

/// Hash a password for storage.
///
/// Cost is configurable so tests can use the bcrypt minimum while
/// deployments keep the default work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(Into::into)
}

/// Check a password against a stored hash.
///
/// An unparseable hash counts as a mismatch rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
