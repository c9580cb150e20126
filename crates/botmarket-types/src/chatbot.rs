use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::deployment::DeploymentResource;
use crate::error::ValidationError;

/// Maximum name length after whitespace normalization (exclusive bound 32).
const NAME_MAX: usize = 31;
/// Maximum version string length (exclusive bound 10).
const VERSION_MAX: usize = 9;
/// Maximum description length (exclusive bound 300).
const DESCRIPTION_MAX: usize = 299;

/// A registered chatbot service in the marketplace.
///
/// The repository is the system of record -- in-memory instances are
/// transient views. Every mutator validates its field before applying,
/// bumps `updated_at`, and re-runs full validation. Chatbots are never
/// physically deleted; deactivation is a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chatbot {
    /// Stable identifier, generated at registration if not supplied.
    pub id: String,
    /// 1-31 chars of `[a-zA-Z0-9-]` after spaces are replaced with hyphens.
    pub name: String,
    /// Free-form version string, 1-9 chars.
    pub version: String,
    /// HTTP(S) URL of the deployed chatbot service.
    pub endpoint: String,
    /// 1-299 chars.
    pub description: String,
    /// Current lifecycle state.
    pub status: ChatbotStatus,
    /// Owning developer account, if registered through the dashboard.
    pub developer_id: Option<String>,
    /// Whether the chatbot can be listed and queried through Telegram.
    pub telegram_support: bool,
    /// How the backing service was provisioned.
    pub deployment_resource: Option<DeploymentResource>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds. Bumped by every successful mutation.
    pub updated_at: i64,
}

/// Chatbot lifecycle states. A closed enumeration: widening it is a
/// breaking change, and unknown strings are rejected at the boundary.
///
/// All states are revisitable; transitions happen only through explicit
/// `set_status` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatbotStatus {
    Active,
    Inactive,
    Debug,
}

impl fmt::Display for ChatbotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatbotStatus::Active => write!(f, "active"),
            ChatbotStatus::Inactive => write!(f, "inactive"),
            ChatbotStatus::Debug => write!(f, "debug"),
        }
    }
}

impl FromStr for ChatbotStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ChatbotStatus::Active),
            "inactive" => Ok(ChatbotStatus::Inactive),
            "debug" => Ok(ChatbotStatus::Debug),
            other => Err(ValidationError::new(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

impl Default for ChatbotStatus {
    fn default() -> Self {
        ChatbotStatus::Inactive
    }
}

/// Whether a mutator actually changed the record. `No` means the write
/// can be skipped (idempotent no-op, no `updated_at` churn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Changed {
    Yes,
    No,
}

/// Registration input for a new chatbot. `id` and `status` get defaults
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatbot {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub version: String,
    pub endpoint: String,
    pub description: String,
    #[serde(default)]
    pub status: Option<ChatbotStatus>,
    #[serde(default)]
    pub developer_id: Option<String>,
    #[serde(default)]
    pub telegram_support: bool,
    #[serde(default)]
    pub deployment_resource: Option<DeploymentResource>,
}

/// Partial-update input. Only supplied fields are applied, each through
/// its validating setter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChatbotRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ChatbotStatus>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub telegram_support: Option<bool>,
}

impl UpdateChatbotRequest {
    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.version.is_none()
            && self.telegram_support.is_none()
    }
}

/// Replace spaces with hyphens and enforce the name pattern.
///
/// Returns the normalized name or the violated rule.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim().replace(' ', "-");
    if name.is_empty() || name.len() > NAME_MAX {
        return Err(ValidationError::new(
            "name",
            format!("must be 1-{NAME_MAX} characters after normalization"),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::new(
            "name",
            "only alphanumeric characters and hyphens are allowed",
        ));
    }
    Ok(name)
}

impl Chatbot {
    /// Build and validate a new chatbot registration.
    pub fn new(req: NewChatbot) -> Result<Self, ValidationError> {
        let now = Utc::now().timestamp();
        let chatbot = Self {
            id: req.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: normalize_name(&req.name)?,
            version: req.version,
            endpoint: req.endpoint,
            description: req.description,
            status: req.status.unwrap_or_default(),
            developer_id: req.developer_id,
            telegram_support: req.telegram_support,
            deployment_resource: req.deployment_resource,
            created_at: now,
            updated_at: now,
        };
        chatbot.validate()?;
        Ok(chatbot)
    }

    /// Check every whole-object invariant, failing on the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::new("id", "must not be empty"));
        }
        normalize_name(&self.name)?;
        if self.version.is_empty() || self.version.len() > VERSION_MAX {
            return Err(ValidationError::new(
                "version",
                format!("must be 1-{VERSION_MAX} characters"),
            ));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ValidationError::new(
                "endpoint",
                "must be an http(s) URL",
            ));
        }
        if self.description.is_empty() || self.description.len() > DESCRIPTION_MAX {
            return Err(ValidationError::new(
                "description",
                format!("must be 1-{DESCRIPTION_MAX} characters"),
            ));
        }
        Ok(())
    }

    /// Serialize to the flat key-value document stored in the document store.
    /// Enum fields become their string value, timestamps integer unix seconds.
    pub fn to_document(&self) -> Result<serde_json::Value, ValidationError> {
        serde_json::to_value(self)
            .map_err(|e| ValidationError::new("document", e.to_string()))
    }

    /// Rebuild a chatbot from its stored document.
    ///
    /// Malformed enum values (e.g. an unknown `status` string) fail with
    /// `ValidationError` -- defensive, since the repository is the sole writer.
    pub fn from_document(doc: serde_json::Value) -> Result<Self, ValidationError> {
        let chatbot: Chatbot = serde_json::from_value(doc)
            .map_err(|e| ValidationError::new("document", e.to_string()))?;
        chatbot.validate()?;
        Ok(chatbot)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().timestamp();
    }

    /// Transition to `status`.
    ///
    /// Setting the current status is a no-op: returns `Changed::No` without
    /// bumping `updated_at`, so redundant activate/deactivate calls skip the
    /// write entirely.
    pub fn set_status(&mut self, status: ChatbotStatus) -> Result<Changed, ValidationError> {
        if self.status == status {
            return Ok(Changed::No);
        }
        self.status = status;
        self.touch();
        self.validate()?;
        Ok(Changed::Yes)
    }

    /// Normalize and set the name.
    pub fn set_name(&mut self, raw: &str) -> Result<(), ValidationError> {
        let name = normalize_name(raw)?;
        self.name = name;
        self.touch();
        self.validate()
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), ValidationError> {
        if description.is_empty() || description.len() > DESCRIPTION_MAX {
            return Err(ValidationError::new(
                "description",
                format!("must be 1-{DESCRIPTION_MAX} characters"),
            ));
        }
        self.description = description.to_string();
        self.touch();
        self.validate()
    }

    pub fn set_version(&mut self, version: &str) -> Result<(), ValidationError> {
        if version.is_empty() || version.len() > VERSION_MAX {
            return Err(ValidationError::new(
                "version",
                format!("must be 1-{VERSION_MAX} characters"),
            ));
        }
        self.version = version.to_string();
        self.touch();
        self.validate()
    }

    pub fn set_telegram_support(&mut self, telegram_support: bool) -> Result<(), ValidationError> {
        self.telegram_support = telegram_support;
        self.touch();
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chatbot {
        Chatbot::new(NewChatbot {
            id: None,
            name: "support bot".to_string(),
            version: "1.0.0".to_string(),
            endpoint: "https://bots.example.com/support".to_string(),
            description: "Answers support questions".to_string(),
            status: None,
            developer_id: Some("dev-1".to_string()),
            telegram_support: true,
            deployment_resource: None,
        })
        .unwrap()
    }

    #[test]
    fn test_new_generates_id_and_defaults_inactive() {
        let bot = sample();
        assert!(!bot.id.is_empty());
        assert_eq!(bot.status, ChatbotStatus::Inactive);
        assert_eq!(bot.created_at, bot.updated_at);
    }

    #[test]
    fn test_name_normalization() {
        let mut bot = sample();
        bot.set_name("a b").unwrap();
        assert_eq!(bot.name, "a-b");
    }

    #[test]
    fn test_name_rejects_empty_and_too_long() {
        let mut bot = sample();
        assert!(bot.set_name("").is_err());
        assert!(bot.set_name(&"x".repeat(40)).is_err());
        // 31 chars is the inclusive maximum
        bot.set_name(&"x".repeat(31)).unwrap();
        assert!(bot.set_name(&"x".repeat(32)).is_err());
    }

    #[test]
    fn test_name_rejects_bad_characters() {
        let mut bot = sample();
        let err = bot.set_name("bot!bot").unwrap_err();
        assert_eq!(err.field, "name");
        // Failed setter leaves the entity untouched
        assert_eq!(bot.name, "support-bot");
    }

    #[test]
    fn test_set_status_is_idempotent() {
        let mut bot = sample();
        bot.set_status(ChatbotStatus::Active).unwrap();
        let stamped = bot.updated_at;
        // Pin updated_at to the past so a bump would be visible even
        // within the same second.
        bot.updated_at = stamped - 100;
        assert_eq!(bot.set_status(ChatbotStatus::Active).unwrap(), Changed::No);
        assert_eq!(bot.updated_at, stamped - 100);
    }

    #[test]
    fn test_set_status_bumps_updated_at() {
        let mut bot = sample();
        bot.updated_at -= 100;
        let before = bot.updated_at;
        assert_eq!(
            bot.set_status(ChatbotStatus::Active).unwrap(),
            Changed::Yes
        );
        assert!(bot.updated_at > before);
    }

    #[test]
    fn test_version_bounds() {
        let mut bot = sample();
        assert!(bot.set_version("").is_err());
        assert!(bot.set_version("1.0.0-beta1").is_err());
        bot.set_version("2.1").unwrap();
        assert_eq!(bot.version, "2.1");
    }

    #[test]
    fn test_description_bounds() {
        let mut bot = sample();
        assert!(bot.set_description("").is_err());
        assert!(bot.set_description(&"d".repeat(300)).is_err());
        bot.set_description(&"d".repeat(299)).unwrap();
    }

    #[test]
    fn test_endpoint_must_be_url() {
        let result = Chatbot::new(NewChatbot {
            id: None,
            name: "bot".to_string(),
            version: "1".to_string(),
            endpoint: String::new(),
            description: "d".to_string(),
            status: None,
            developer_id: None,
            telegram_support: false,
            deployment_resource: None,
        });
        assert_eq!(result.unwrap_err().field, "endpoint");
    }

    #[test]
    fn test_document_roundtrip() {
        let bot = sample();
        let doc = bot.to_document().unwrap();
        assert_eq!(doc["status"], "inactive");
        assert!(doc["created_at"].is_i64());
        let back = Chatbot::from_document(doc).unwrap();
        assert_eq!(back, bot);
    }

    #[test]
    fn test_from_document_rejects_unknown_status() {
        let mut doc = sample().to_document().unwrap();
        doc["status"] = serde_json::json!("zombie");
        let err = Chatbot::from_document(doc).unwrap_err();
        assert_eq!(err.field, "document");
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            ChatbotStatus::Active,
            ChatbotStatus::Inactive,
            ChatbotStatus::Debug,
        ] {
            let parsed: ChatbotStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("enabled".parse::<ChatbotStatus>().is_err());
    }
}
