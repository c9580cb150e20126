//! SQLite user repository implementation.

use botmarket_core::repository::user::UserRepository;
use botmarket_types::error::RepositoryError;
use botmarket_types::user::{User, UserRole};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`. One table covers
/// developer/admin accounts and end-user chat sessions.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    full_name: String,
    email: String,
    password_hash: Option<String>,
    role: String,
    selected_chatbot_id: Option<String>,
    is_querying: i64,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            selected_chatbot_id: row.try_get("selected_chatbot_id")?,
            is_querying: row.try_get("is_querying")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e: botmarket_types::error::ValidationError| {
                RepositoryError::Query(e.to_string())
            })?;

        Ok(User {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            selected_chatbot_id: self.selected_chatbot_id,
            is_querying: self.is_querying != 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

async fn fetch_one(
    pool: &DatabasePool,
    sql: &str,
    key: &str,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query(sql)
        .bind(key)
        .fetch_optional(&pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    match row {
        Some(row) => {
            let user_row =
                UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(user_row.into_user()?))
        }
        None => Ok(None),
    }
}

impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        fetch_one(&self.pool, "SELECT * FROM users WHERE id = ?", id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        fetch_one(&self.pool, "SELECT * FROM users WHERE email = ?", email).await
    }

    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, role, selected_chatbot_id, is_querying, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 full_name = excluded.full_name,
                 email = excluded.email,
                 password_hash = excluded.password_hash,
                 role = excluded.role,
                 selected_chatbot_id = excluded.selected_chatbot_id,
                 is_querying = excluded.is_querying,
                 created_at = excluded.created_at,
                 updated_at = excluded.updated_at",
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.selected_chatbot_id)
        .bind(user.is_querying as i64)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
