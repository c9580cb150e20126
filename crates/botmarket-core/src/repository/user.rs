//! User repository trait definition.

use botmarket_types::error::RepositoryError;
use botmarket_types::user::User;

/// Repository trait for user persistence. Covers developer/admin accounts
/// and end-user chat sessions alike (one container, keyed by id).
pub trait UserRepository: Send + Sync {
    /// Point lookup. Absence is `Ok(None)`, never an error.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Lookup by stored (lowercased) email. Returns the first match;
    /// registration keeps emails unique.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Replace-or-insert the whole record keyed by `id`.
    fn upsert(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
