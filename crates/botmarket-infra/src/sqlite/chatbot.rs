//! SQLite chatbot repository implementation.
//!
//! Implements `ChatbotRepository` from `botmarket-core` using sqlx with
//! split read/write pools. Records are whole-document upserts keyed by id.

use botmarket_core::repository::chatbot::ChatbotRepository;
use botmarket_core::repository::{ChatbotField, FieldFilter, FilterOp, FilterValue};
use botmarket_types::chatbot::{Chatbot, ChatbotStatus};
use botmarket_types::deployment::DeploymentResource;
use botmarket_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatbotRepository`.
pub struct SqliteChatbotRepository {
    pool: DatabasePool,
}

impl SqliteChatbotRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to the domain Chatbot.
struct ChatbotRow {
    id: String,
    name: String,
    version: String,
    endpoint: String,
    description: String,
    status: String,
    developer_id: Option<String>,
    telegram_support: i64,
    deployment_resource: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ChatbotRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            version: row.try_get("version")?,
            endpoint: row.try_get("endpoint")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            developer_id: row.try_get("developer_id")?,
            telegram_support: row.try_get("telegram_support")?,
            deployment_resource: row.try_get("deployment_resource")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chatbot(self) -> Result<Chatbot, RepositoryError> {
        let status: ChatbotStatus = self
            .status
            .parse()
            .map_err(|e: botmarket_types::error::ValidationError| {
                RepositoryError::Query(e.to_string())
            })?;

        let deployment_resource: Option<DeploymentResource> = self
            .deployment_resource
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid deployment JSON: {e}")))?;

        Ok(Chatbot {
            id: self.id,
            name: self.name,
            version: self.version,
            endpoint: self.endpoint,
            description: self.description,
            status,
            developer_id: self.developer_id,
            telegram_support: self.telegram_support != 0,
            deployment_resource,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Chatbot>, RepositoryError> {
    let mut chatbots = Vec::with_capacity(rows.len());
    for row in rows {
        let chatbot_row =
            ChatbotRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        chatbots.push(chatbot_row.into_chatbot()?);
    }
    Ok(chatbots)
}

impl ChatbotRepository for SqliteChatbotRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Chatbot>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chatbots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chatbot_row =
                    ChatbotRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chatbot_row.into_chatbot()?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_field(
        &self,
        field: ChatbotField,
        value: FilterValue,
    ) -> Result<Vec<Chatbot>, RepositoryError> {
        self.search(&[FieldFilter {
            field,
            op: FilterOp::Eq,
            value,
        }])
        .await
    }

    async fn search(&self, filters: &[FieldFilter]) -> Result<Vec<Chatbot>, RepositoryError> {
        // Column names come from the closed ChatbotField set and operators
        // from FilterOp; values are always bound parameters.
        let mut sql = String::from("SELECT * FROM chatbots");
        for (i, filter) in filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(filter.field.column());
            sql.push(' ');
            sql.push_str(filter.op.sql());
            sql.push_str(" ?");
        }
        sql.push_str(" ORDER BY created_at");

        let mut query = sqlx::query(&sql);
        for filter in filters {
            query = match &filter.value {
                FilterValue::Flag(flag) => query.bind(*flag as i64),
                FilterValue::Text(text) => query.bind(text.clone()),
            };
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(&rows)
    }

    async fn upsert(&self, chatbot: &Chatbot) -> Result<(), RepositoryError> {
        let deployment_json = chatbot
            .deployment_resource
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO chatbots (id, name, version, endpoint, description, status, developer_id, telegram_support, deployment_resource, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 version = excluded.version,
                 endpoint = excluded.endpoint,
                 description = excluded.description,
                 status = excluded.status,
                 developer_id = excluded.developer_id,
                 telegram_support = excluded.telegram_support,
                 deployment_resource = excluded.deployment_resource,
                 created_at = excluded.created_at,
                 updated_at = excluded.updated_at",
        )
        .bind(&chatbot.id)
        .bind(&chatbot.name)
        .bind(&chatbot.version)
        .bind(&chatbot.endpoint)
        .bind(&chatbot.description)
        .bind(chatbot.status.to_string())
        .bind(&chatbot.developer_id)
        .bind(chatbot.telegram_support as i64)
        .bind(deployment_json)
        .bind(chatbot.created_at)
        .bind(chatbot.updated_at)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use botmarket_types::chatbot::NewChatbot;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_chatbot(name: &str, status: ChatbotStatus, telegram: bool) -> Chatbot {
        Chatbot::new(NewChatbot {
            id: None,
            name: name.to_string(),
            version: "1.0".to_string(),
            endpoint: format!("https://{name}.example.com"),
            description: format!("the {name} chatbot"),
            status: Some(status),
            developer_id: Some("dev-1".to_string()),
            telegram_support: telegram,
            deployment_resource: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_find_by_id() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        let chatbot = make_chatbot("luna", ChatbotStatus::Active, true);

        repo.upsert(&chatbot).await.unwrap();

        let found = repo.find_by_id(&chatbot.id).await.unwrap().unwrap();
        assert_eq!(found, chatbot);
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        assert!(repo.find_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_record() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        let mut chatbot = make_chatbot("mutable", ChatbotStatus::Inactive, false);
        repo.upsert(&chatbot).await.unwrap();

        chatbot.set_status(ChatbotStatus::Active).unwrap();
        chatbot.set_description("now with a new description").unwrap();
        repo.upsert(&chatbot).await.unwrap();

        let found = repo.find_by_id(&chatbot.id).await.unwrap().unwrap();
        assert_eq!(found.status, ChatbotStatus::Active);
        assert_eq!(found.description, "now with a new description");
    }

    #[tokio::test]
    async fn test_search_with_filters() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        repo.upsert(&make_chatbot("alpha", ChatbotStatus::Active, true))
            .await
            .unwrap();
        repo.upsert(&make_chatbot("beta", ChatbotStatus::Active, false))
            .await
            .unwrap();
        repo.upsert(&make_chatbot("gamma", ChatbotStatus::Inactive, true))
            .await
            .unwrap();

        let all = repo.search(&[]).await.unwrap();
        assert_eq!(all.len(), 3);

        let listed = repo
            .search(&[
                FieldFilter::eq(ChatbotField::Status, FilterValue::text("active")),
                FieldFilter::eq(ChatbotField::TelegramSupport, FilterValue::Flag(true)),
            ])
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_find_by_developer() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        let mut other = make_chatbot("other", ChatbotStatus::Active, false);
        other.developer_id = Some("dev-2".to_string());
        repo.upsert(&make_chatbot("mine", ChatbotStatus::Active, false))
            .await
            .unwrap();
        repo.upsert(&other).await.unwrap();

        let mine = repo
            .find_by_field(ChatbotField::DeveloperId, FilterValue::text("dev-1"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "mine");
    }

    #[tokio::test]
    async fn test_hostile_filter_value_is_inert() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        repo.upsert(&make_chatbot("safe", ChatbotStatus::Active, true))
            .await
            .unwrap();

        let result = repo
            .search(&[FieldFilter::eq(
                ChatbotField::Name,
                FilterValue::text("safe' OR '1'='1"),
            )])
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_deployment_resource_roundtrip() {
        let repo = SqliteChatbotRepository::new(test_pool().await);
        let mut chatbot = make_chatbot("deployed", ChatbotStatus::Active, true);
        chatbot.deployment_resource = Some(DeploymentResource::Custom {
            resource_group_name: "rg-bots".to_string(),
            location: "eastus".to_string(),
            subscription_id: "sub-1".to_string(),
        });
        repo.upsert(&chatbot).await.unwrap();

        let found = repo.find_by_id(&chatbot.id).await.unwrap().unwrap();
        assert_eq!(found.deployment_resource, chatbot.deployment_resource);
    }
}
