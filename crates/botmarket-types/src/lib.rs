//! Shared domain types for Botmarket.
//!
//! This crate contains the entity model used across the platform: Chatbot,
//! User, deployment descriptors, Telegram payloads, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chatbot;
pub mod deployment;
pub mod error;
pub mod telegram;
pub mod user;
