//! REST API request handlers.

pub mod auth;
pub mod chatbot;
pub mod telegram;
