//! Mutation protocol services.
//!
//! Stateless request handlers share no process memory, so every operation
//! here is a fresh read-modify-validate-write against the repository.
//! Handlers must never hold an entity across an I/O boundary and assume it
//! is still valid -- always re-fetch before mutating.

pub mod chatbot;
pub mod password;
pub mod user;
