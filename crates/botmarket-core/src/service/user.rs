//! User account operations and the session query mutex.
//!
//! The `is_querying` flag is an advisory throttle, not a hard lock. The
//! flag-set and flag-clear steps are plain upserts against a possibly racy
//! store, so two near-simultaneous messages from the same user may both
//! pass the check before either write lands. That is accepted best-effort
//! behavior, not a bug to fix with extra machinery.

use botmarket_types::error::{RepositoryError, UserError, ValidationError};
use botmarket_types::user::{NewAccount, User};

use crate::repository::user::UserRepository;
use crate::service::password::PasswordHasher;

/// Successful login result: what the dashboard needs to scope its requests.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LoginOutcome {
    pub developer_id: String,
    pub name: String,
}

/// Outcome of trying to take the session query mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryGate {
    /// Flag was clear; it is now set and persisted.
    Acquired,
    /// A query is already in flight for this user.
    Busy,
}

/// Service for account registration, login, and chat-session state.
pub struct UserService<U: UserRepository, H: PasswordHasher> {
    users: U,
    hasher: H,
}

impl<U: UserRepository, H: PasswordHasher> UserService<U, H> {
    pub fn new(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }

    /// Register a developer or admin account. The plaintext password is
    /// length-checked, hashed, and discarded; only the hash is stored.
    /// Emails are unique across accounts.
    pub async fn register(&self, account: NewAccount) -> Result<User, UserError> {
        User::validate_password(&account.password)?;
        let email = account.email.trim().to_lowercase();
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(storage)?
            .is_some()
        {
            return Err(ValidationError::new("email", "already registered").into());
        }
        let hash = self.hasher.hash(&account.password)?;
        let user = User::new_account(&account.full_name, &email, hash, account.role)?;
        self.users.upsert(&user).await.map_err(storage)?;
        tracing::info!(id = %user.id, role = %user.role, "account registered");
        Ok(user)
    }

    /// Credential check. Unknown email and wrong password produce the same
    /// `InvalidCredentials` error so the response leaks nothing.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, UserError> {
        let user = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await
            .map_err(storage)?
            .ok_or(UserError::InvalidCredentials)?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(UserError::InvalidCredentials);
        };
        if !self.hasher.verify(password, hash) {
            return Err(UserError::InvalidCredentials);
        }

        Ok(LoginOutcome {
            developer_id: user.id,
            name: user.full_name,
        })
    }

    /// Fetch a user or fail with `NotFound`.
    pub async fn get(&self, id: &str) -> Result<User, UserError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(UserError::NotFound)
    }

    /// Fetch the chat-session user for `chat_id`, creating it on first
    /// contact.
    pub async fn ensure_chat_user(&self, chat_id: &str) -> Result<User, UserError> {
        if let Some(user) = self.users.find_by_id(chat_id).await.map_err(storage)? {
            return Ok(user);
        }
        let user = User::new_chat_session(chat_id)?;
        self.users.upsert(&user).await.map_err(storage)?;
        tracing::debug!(chat_id, "chat session created");
        Ok(user)
    }

    /// Point the session's free-text messages at a chatbot.
    pub async fn select_chatbot(&self, chat_id: &str, chatbot_id: &str) -> Result<User, UserError> {
        let mut user = self.ensure_chat_user(chat_id).await?;
        user.set_selected_chatbot(Some(chatbot_id.to_string()))?;
        self.users.upsert(&user).await.map_err(storage)?;
        Ok(user)
    }

    /// Try to take the session query mutex. On `Acquired` the flag is
    /// persisted before the caller starts the possibly-slow downstream
    /// call.
    pub async fn begin_query(&self, chat_id: &str) -> Result<QueryGate, UserError> {
        let mut user = self.ensure_chat_user(chat_id).await?;
        if user.is_querying {
            return Ok(QueryGate::Busy);
        }
        user.set_is_querying(true)?;
        self.users.upsert(&user).await.map_err(storage)?;
        Ok(QueryGate::Acquired)
    }

    /// Clear the session query mutex. Must run after the downstream call on
    /// every path -- success, failure, or timeout. Re-fetches the record
    /// first; the stored copy may have been rewritten while the query ran.
    pub async fn finish_query(&self, chat_id: &str) -> Result<(), UserError> {
        let Some(mut user) = self.users.find_by_id(chat_id).await.map_err(storage)? else {
            return Ok(());
        };
        if user.is_querying {
            user.set_is_querying(false)?;
            self.users.upsert(&user).await.map_err(storage)?;
        }
        Ok(())
    }
}

fn storage(err: RepositoryError) -> UserError {
    UserError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MemoryUserRepository, PlainHasher};
    use botmarket_types::user::UserRole;

    fn service() -> UserService<MemoryUserRepository, PlainHasher> {
        UserService::new(MemoryUserRepository::new(), PlainHasher)
    }

    fn account(email: &str) -> NewAccount {
        NewAccount {
            full_name: "Dev One".to_string(),
            email: email.to_string(),
            password: "long enough password".to_string(),
            role: UserRole::Developer,
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = service();
        let user = service.register(account("dev@example.com")).await.unwrap();
        // PlainHasher marks hashes; the point is the plaintext is not stored.
        assert_eq!(user.password_hash.as_deref(), Some("hashed:long enough password"));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let service = service();
        let err = service
            .register(NewAccount {
                password: "short".to_string(),
                ..account("dev@example.com")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let service = service();
        service.register(account("dev@example.com")).await.unwrap();
        let err = service
            .register(account("Dev@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let service = service();
        let user = service.register(account("dev@example.com")).await.unwrap();

        let outcome = service
            .login("Dev@Example.com", "long enough password")
            .await
            .unwrap();
        assert_eq!(outcome.developer_id, user.id);
        assert_eq!(outcome.name, "Dev One");
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_identical() {
        let service = service();
        service.register(account("dev@example.com")).await.unwrap();

        let wrong_password = service
            .login("dev@example.com", "not the password")
            .await
            .unwrap_err();
        let unknown_email = service
            .login("nobody@example.com", "whatever pass")
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_ensure_chat_user_is_created_once() {
        let service = service();
        let first = service.ensure_chat_user("42").await.unwrap();
        let second = service.ensure_chat_user("42").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_query_gate_acquire_then_busy() {
        let service = service();
        assert_eq!(
            service.begin_query("42").await.unwrap(),
            QueryGate::Acquired
        );
        // Flag was persisted, so a second attempt is throttled.
        assert_eq!(service.begin_query("42").await.unwrap(), QueryGate::Busy);

        service.finish_query("42").await.unwrap();
        assert_eq!(
            service.begin_query("42").await.unwrap(),
            QueryGate::Acquired
        );
    }

    #[tokio::test]
    async fn test_finish_query_on_missing_user_is_noop() {
        let service = service();
        service.finish_query("ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_select_chatbot_persists() {
        let service = service();
        service.select_chatbot("42", "bot-1").await.unwrap();
        let user = service.get("42").await.unwrap();
        assert_eq!(user.selected_chatbot_id.as_deref(), Some("bot-1"));
    }
}
