use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Minimum pre-hash password length for developer/admin accounts.
const PASSWORD_MIN: usize = 8;

/// A developer/admin account or an end-user chat session identity.
///
/// End-user records are created implicitly at first chat interaction,
/// keyed by the chat session id, and skip the account-level validation
/// that developer and admin registrations go through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    /// Stored lowercased. Must contain `@` for non-end-user roles.
    pub email: String,
    /// Argon2 hash; never the plaintext. Absent for end-user sessions.
    pub password_hash: Option<String>,
    pub role: UserRole,
    /// Chatbot this session routes free-text messages to. Referential
    /// integrity is checked by the caller, not enforced here.
    pub selected_chatbot_id: Option<String>,
    /// Advisory session mutex: true while a query to a chatbot endpoint
    /// is in flight. Best-effort throttle, not a hard lock.
    pub is_querying: bool,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
}

/// Account roles. Serializes as the variant name (`"Admin"`, `"Developer"`,
/// `"User"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Developer,
    User,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "Admin"),
            UserRole::Developer => write!(f, "Developer"),
            UserRole::User => write!(f, "User"),
        }
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(UserRole::Admin),
            "Developer" => Ok(UserRole::Developer),
            "User" => Ok(UserRole::User),
            other => Err(ValidationError::new(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

/// Registration input for a developer or admin account. The plaintext
/// password is validated with [`User::validate_password`] and hashed by
/// the service layer before the entity is built.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl User {
    /// Build and validate a developer or admin account.
    ///
    /// `password_hash` must already be derived; the plaintext never
    /// reaches this type.
    pub fn new_account(
        full_name: &str,
        email: &str,
        password_hash: String,
        role: UserRole,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now().timestamp();
        let user = Self {
            id: Uuid::new_v4().to_string(),
            full_name: full_name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: Some(password_hash),
            role,
            selected_chatbot_id: None,
            is_querying: false,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    /// Build an end-user chat session identity keyed by the chat id.
    /// Skips account-level validation (no name, email, or password).
    pub fn new_chat_session(chat_id: &str) -> Result<Self, ValidationError> {
        let now = Utc::now().timestamp();
        let user = Self {
            id: chat_id.to_string(),
            full_name: String::new(),
            email: String::new(),
            password_hash: None,
            role: UserRole::User,
            selected_chatbot_id: None,
            is_querying: false,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    /// Pre-hash password check for account registration.
    pub fn validate_password(password: &str) -> Result<(), ValidationError> {
        if password.len() < PASSWORD_MIN {
            return Err(ValidationError::new(
                "password",
                format!("must be at least {PASSWORD_MIN} characters"),
            ));
        }
        Ok(())
    }

    /// Check whole-object invariants, failing on the first violation.
    ///
    /// Account-level rules only apply to non-`User` roles; chat session
    /// identities need nothing beyond a non-empty id.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::new("id", "must not be empty"));
        }
        if self.role != UserRole::User {
            if self.full_name.is_empty() {
                return Err(ValidationError::new("full_name", "must not be empty"));
            }
            if !self.email.contains('@') {
                return Err(ValidationError::new("email", "must contain '@'"));
            }
            if self.password_hash.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::new(
                    "password_hash",
                    "account roles require a password hash",
                ));
            }
        }
        Ok(())
    }

    /// Serialize to the stored key-value document.
    pub fn to_document(&self) -> Result<serde_json::Value, ValidationError> {
        serde_json::to_value(self)
            .map_err(|e| ValidationError::new("document", e.to_string()))
    }

    /// Rebuild a user from its stored document; unknown role strings fail.
    pub fn from_document(doc: serde_json::Value) -> Result<Self, ValidationError> {
        let user: User = serde_json::from_value(doc)
            .map_err(|e| ValidationError::new("document", e.to_string()))?;
        user.validate()?;
        Ok(user)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().timestamp();
    }

    /// Point this session's free-text messages at a chatbot.
    pub fn set_selected_chatbot(
        &mut self,
        chatbot_id: Option<String>,
    ) -> Result<(), ValidationError> {
        self.selected_chatbot_id = chatbot_id;
        self.touch();
        self.validate()
    }

    /// Flip the advisory query-in-flight flag.
    pub fn set_is_querying(&mut self, is_querying: bool) -> Result<(), ValidationError> {
        self.is_querying = is_querying;
        self.touch();
        self.validate()
    }
}
