//! Business logic and repository trait definitions for Botmarket.
//!
//! This crate defines the "ports" (repository and transport traits) that the
//! infrastructure layer implements, the mutation protocol services, and the
//! Telegram relay. It depends only on `botmarket-types` -- never on
//! `botmarket-infra` or any database/IO crate.

pub mod relay;
pub mod repository;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;
