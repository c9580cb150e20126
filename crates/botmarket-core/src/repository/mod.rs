//! Repository trait definitions (ports).
//!
//! These traits abstract the document store. The infrastructure layer
//! (botmarket-infra) implements them; this crate never depends on any
//! specific storage technology.
//!
//! Consistency contract: reads may be eventually consistent relative to a
//! very recent write from another process. Callers must not assume
//! read-your-own-write across requests, nor linearizable ordering across
//! concurrent writers. Point lookups return `Ok(None)` for absence.

pub mod chatbot;
pub mod user;

use serde::{Deserialize, Serialize};

use botmarket_types::chatbot::Chatbot;

/// Filterable chatbot fields. A closed set: raw query strings never cross
/// the repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatbotField {
    Id,
    Name,
    Version,
    Status,
    DeveloperId,
    TelegramSupport,
}

impl ChatbotField {
    /// Storage column backing this field.
    pub fn column(&self) -> &'static str {
        match self {
            ChatbotField::Id => "id",
            ChatbotField::Name => "name",
            ChatbotField::Version => "version",
            ChatbotField::Status => "status",
            ChatbotField::DeveloperId => "developer_id",
            ChatbotField::TelegramSupport => "telegram_support",
        }
    }
}

/// Comparison operators supported by [`FieldFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
}

impl FilterOp {
    pub fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
        }
    }
}

/// A filter operand: enum fields compare against their string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Text(String),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }
}

/// One field/operator/value triple. Filters in a search combine with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: ChatbotField,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl FieldFilter {
    pub fn eq(field: ChatbotField, value: FilterValue) -> Self {
        Self {
            field,
            op: FilterOp::Eq,
            value,
        }
    }

    /// Evaluate this filter against an in-memory record. Storage backends
    /// compile filters to bound queries instead; this is the reference
    /// semantics they must match.
    pub fn matches(&self, chatbot: &Chatbot) -> bool {
        let actual = match self.field {
            ChatbotField::Id => FilterValue::Text(chatbot.id.clone()),
            ChatbotField::Name => FilterValue::Text(chatbot.name.clone()),
            ChatbotField::Version => FilterValue::Text(chatbot.version.clone()),
            ChatbotField::Status => FilterValue::Text(chatbot.status.to_string()),
            ChatbotField::DeveloperId => {
                FilterValue::Text(chatbot.developer_id.clone().unwrap_or_default())
            }
            ChatbotField::TelegramSupport => FilterValue::Flag(chatbot.telegram_support),
        };
        match self.op {
            FilterOp::Eq => actual == self.value,
            FilterOp::Ne => actual != self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmarket_types::chatbot::{Chatbot, ChatbotStatus, NewChatbot};

    fn chatbot(status: ChatbotStatus, telegram: bool) -> Chatbot {
        Chatbot::new(NewChatbot {
            id: None,
            name: "probe".to_string(),
            version: "1".to_string(),
            endpoint: "https://example.com".to_string(),
            description: "probe".to_string(),
            status: Some(status),
            developer_id: Some("dev-1".to_string()),
            telegram_support: telegram,
            deployment_resource: None,
        })
        .unwrap()
    }

    #[test]
    fn test_filter_on_status_string() {
        let filter = FieldFilter::eq(ChatbotField::Status, FilterValue::text("active"));
        assert!(filter.matches(&chatbot(ChatbotStatus::Active, true)));
        assert!(!filter.matches(&chatbot(ChatbotStatus::Inactive, true)));
    }

    #[test]
    fn test_filter_on_flag() {
        let filter = FieldFilter::eq(ChatbotField::TelegramSupport, FilterValue::Flag(true));
        assert!(filter.matches(&chatbot(ChatbotStatus::Active, true)));
        assert!(!filter.matches(&chatbot(ChatbotStatus::Active, false)));
    }

    #[test]
    fn test_ne_operator() {
        let filter = FieldFilter {
            field: ChatbotField::Status,
            op: FilterOp::Ne,
            value: FilterValue::text("debug"),
        };
        assert!(filter.matches(&chatbot(ChatbotStatus::Active, true)));
    }

    #[test]
    fn test_filter_deserializes_from_api_shape() {
        let filter: FieldFilter = serde_json::from_value(serde_json::json!({
            "field": "telegram_support",
            "op": "eq",
            "value": true
        }))
        .unwrap();
        assert_eq!(filter.field, ChatbotField::TelegramSupport);
        assert_eq!(filter.value, FilterValue::Flag(true));
    }
}
