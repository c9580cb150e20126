//! SQLite-backed repository implementations.

pub mod chatbot;
pub mod pool;
pub mod user;

pub use chatbot::SqliteChatbotRepository;
pub use pool::DatabasePool;
pub use user::SqliteUserRepository;
