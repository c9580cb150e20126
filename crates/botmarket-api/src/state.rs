//! Application state wiring all services together.
//!
//! Services are generic over repository/transport/hasher traits; AppState
//! pins them to the concrete infra implementations.

use std::sync::Arc;

use botmarket_core::relay::Relay;
use botmarket_core::service::chatbot::ChatbotService;
use botmarket_core::service::user::UserService;
use botmarket_infra::config::Settings;
use botmarket_infra::crypto::Argon2PasswordHasher;
use botmarket_infra::querier::HttpChatbotQuerier;
use botmarket_infra::sqlite::{DatabasePool, SqliteChatbotRepository, SqliteUserRepository};
use botmarket_infra::telegram::TelegramTransport;

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteChatbotService = ChatbotService<SqliteChatbotRepository, SqliteUserRepository>;

pub type ConcreteUserService = UserService<SqliteUserRepository, Argon2PasswordHasher>;

pub type ConcreteRelay = Relay<
    SqliteChatbotRepository,
    SqliteUserRepository,
    Argon2PasswordHasher,
    TelegramTransport,
    HttpChatbotQuerier,
>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chatbot_service: Arc<ConcreteChatbotService>,
    pub user_service: Arc<ConcreteUserService>,
    pub relay: Arc<ConcreteRelay>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, run
    /// migrations, wire services.
    pub async fn init(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&settings.database_url).await?;

        let chatbot_service = ChatbotService::new(
            SqliteChatbotRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
        );
        let user_service = UserService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
        );

        // The relay owns its own service instances; repositories are cheap
        // handles over the shared pool.
        let relay = Relay::new(
            ChatbotService::new(
                SqliteChatbotRepository::new(db_pool.clone()),
                SqliteUserRepository::new(db_pool.clone()),
            ),
            UserService::new(
                SqliteUserRepository::new(db_pool.clone()),
                Argon2PasswordHasher::new(),
            ),
            TelegramTransport::new(&settings.telegram_api_url, &settings.telegram_bot_token),
            HttpChatbotQuerier::new(),
        );

        Ok(Self {
            chatbot_service: Arc::new(chatbot_service),
            user_service: Arc::new(user_service),
            relay: Arc::new(relay),
            db_pool,
        })
    }
}
