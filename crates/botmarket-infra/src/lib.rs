//! Infrastructure adapters: SQLite persistence, the Telegram HTTP
//! transport, chatbot endpoint forwarding, and argon2 password hashing.
//!
//! Everything here implements a port defined in `botmarket-core`.

pub mod config;
pub mod crypto;
pub mod querier;
pub mod sqlite;
pub mod telegram;
