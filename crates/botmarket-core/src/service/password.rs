//! Password hashing port.

use botmarket_types::error::UserError;

/// Derives and verifies password hashes. Implemented with argon2 in
/// botmarket-infra; tests substitute a trivial fake.
pub trait PasswordHasher: Send + Sync {
    /// Derive a storable hash from a plaintext password.
    fn hash(&self, password: &str) -> Result<String, UserError>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
