//! Chatbot repository trait definition.

use botmarket_types::chatbot::Chatbot;
use botmarket_types::error::RepositoryError;

use super::{ChatbotField, FieldFilter, FilterValue};

/// Repository trait for chatbot persistence.
///
/// Implementations live in botmarket-infra (e.g., SqliteChatbotRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// `upsert` is a full-document replace-or-insert keyed by `id` -- there are
/// no partial-field update semantics; the whole record is written every time.
pub trait ChatbotRepository: Send + Sync {
    /// Point lookup. Absence is `Ok(None)`, never an error.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Chatbot>, RepositoryError>> + Send;

    /// Equality filter on one field, potentially cross-partition.
    /// Result ordering is unspecified.
    fn find_by_field(
        &self,
        field: ChatbotField,
        value: FilterValue,
    ) -> impl std::future::Future<Output = Result<Vec<Chatbot>, RepositoryError>> + Send;

    /// AND-combined filter triples. An empty slice returns every record.
    fn search(
        &self,
        filters: &[FieldFilter],
    ) -> impl std::future::Future<Output = Result<Vec<Chatbot>, RepositoryError>> + Send;

    /// Replace-or-insert the whole record keyed by `id`.
    fn upsert(
        &self,
        chatbot: &Chatbot,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
