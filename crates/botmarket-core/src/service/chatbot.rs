//! Chatbot mutation protocol.
//!
//! Every status/update operation follows the same sequence: fetch the
//! current record, rebuild the entity, skip the write when nothing would
//! change, otherwise run the validating setter and upsert the full record.
//!
//! This is not a compare-and-swap. Two concurrent requests can both read
//! the same state, both decide to transition, and the final stored state is
//! whichever upsert lands last -- both report success with the status they
//! attempted. That last-writer-wins trade-off is accepted; an
//! optimistic-concurrency token on upsert (failing with
//! `RepositoryError::Conflict`) is the documented hardening path.

use botmarket_types::chatbot::{Changed, Chatbot, ChatbotStatus, NewChatbot, UpdateChatbotRequest};
use botmarket_types::error::{ChatbotError, RepositoryError};
use botmarket_types::user::UserRole;

use crate::repository::chatbot::ChatbotRepository;
use crate::repository::user::UserRepository;
use crate::repository::{ChatbotField, FieldFilter, FilterValue};

/// Parameters of a directory listing request, in the order the precedence
/// rules consume them. `has_params` distinguishes "no parameters at all"
/// (list everything) from "parameters present but empty" (forbidden).
#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
    pub developer_id: Option<String>,
    pub chatbot_id: Option<String>,
    pub has_params: bool,
}

/// Service implementing the chatbot mutation protocol and directory lookups.
pub struct ChatbotService<C: ChatbotRepository, U: UserRepository> {
    chatbots: C,
    users: U,
}

impl<C: ChatbotRepository, U: UserRepository> ChatbotService<C, U> {
    pub fn new(chatbots: C, users: U) -> Self {
        Self { chatbots, users }
    }

    /// Register a new chatbot.
    pub async fn create(&self, request: NewChatbot) -> Result<Chatbot, ChatbotError> {
        let chatbot = Chatbot::new(request)?;
        self.chatbots.upsert(&chatbot).await.map_err(storage)?;
        tracing::info!(id = %chatbot.id, name = %chatbot.name, "chatbot registered");
        Ok(chatbot)
    }

    /// Fetch one chatbot or fail with `NotFound`.
    pub async fn get(&self, id: &str) -> Result<Chatbot, ChatbotError> {
        self.chatbots
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(ChatbotError::NotFound)
    }

    pub async fn activate(&self, id: &str) -> Result<Chatbot, ChatbotError> {
        self.set_status(id, ChatbotStatus::Active).await
    }

    pub async fn deactivate(&self, id: &str) -> Result<Chatbot, ChatbotError> {
        self.set_status(id, ChatbotStatus::Inactive).await
    }

    /// Transition a chatbot to `status`.
    ///
    /// Requesting the current status is an idempotent success: the write is
    /// skipped entirely, avoiding redundant `updated_at` churn.
    pub async fn set_status(
        &self,
        id: &str,
        status: ChatbotStatus,
    ) -> Result<Chatbot, ChatbotError> {
        let mut chatbot = self.get(id).await?;
        match chatbot.set_status(status)? {
            Changed::No => {
                tracing::debug!(id, %status, "status unchanged, skipping write");
                Ok(chatbot)
            }
            Changed::Yes => {
                self.chatbots.upsert(&chatbot).await.map_err(storage)?;
                tracing::info!(id, %status, "chatbot status updated");
                Ok(chatbot)
            }
        }
    }

    /// Apply a partial update. Each supplied field goes through its
    /// validating setter; one upsert persists the result.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateChatbotRequest,
    ) -> Result<Chatbot, ChatbotError> {
        let mut chatbot = self.get(id).await?;
        let mut changed = false;

        if let Some(name) = &request.name {
            chatbot.set_name(name)?;
            changed = true;
        }
        if let Some(description) = &request.description {
            chatbot.set_description(description)?;
            changed = true;
        }
        if let Some(status) = request.status {
            if chatbot.set_status(status)? == Changed::Yes {
                changed = true;
            }
        }
        if let Some(version) = &request.version {
            chatbot.set_version(version)?;
            changed = true;
        }
        if let Some(telegram_support) = request.telegram_support {
            chatbot.set_telegram_support(telegram_support)?;
            changed = true;
        }

        if changed {
            self.chatbots.upsert(&chatbot).await.map_err(storage)?;
            tracing::info!(id, "chatbot updated");
        }
        Ok(chatbot)
    }

    /// Every registered chatbot, unfiltered.
    pub async fn list_all(&self) -> Result<Vec<Chatbot>, ChatbotError> {
        self.chatbots.search(&[]).await.map_err(storage)
    }

    /// Structured search with AND-combined field filters.
    pub async fn search(&self, filters: &[FieldFilter]) -> Result<Vec<Chatbot>, ChatbotError> {
        self.chatbots.search(filters).await.map_err(storage)
    }

    /// Directory listing with the fixed parameter precedence:
    ///
    /// 1. no parameters at all -> every chatbot;
    /// 2. `developer_id` -> role-aware: Admins retrieve all chatbots,
    ///    Developers retrieve only their own, any other role gets none;
    /// 3. `chatbot_id` -> that one record;
    /// 4. parameters present but neither id supplied -> `Forbidden`.
    pub async fn get_chatbots(&self, query: &DirectoryQuery) -> Result<Vec<Chatbot>, ChatbotError> {
        if !query.has_params {
            return self.list_all().await;
        }

        if let Some(developer_id) = &query.developer_id {
            let developer = self
                .users
                .find_by_id(developer_id)
                .await
                .map_err(storage)?
                .ok_or(ChatbotError::DeveloperNotFound)?;

            return match developer.role {
                UserRole::Admin => self.list_all().await,
                UserRole::Developer => self
                    .chatbots
                    .find_by_field(
                        ChatbotField::DeveloperId,
                        FilterValue::text(developer_id.clone()),
                    )
                    .await
                    .map_err(storage),
                UserRole::User => Ok(Vec::new()),
            };
        }

        if let Some(chatbot_id) = &query.chatbot_id {
            return Ok(vec![self.get(chatbot_id).await?]);
        }

        Err(ChatbotError::Forbidden(
            "request parameters do not identify a developer or chatbot".to_string(),
        ))
    }
}

fn storage(err: RepositoryError) -> ChatbotError {
    ChatbotError::Storage(err.to_string())
}
