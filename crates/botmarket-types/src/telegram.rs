//! Subset of the Telegram webhook payload the relay cares about.
//!
//! Unknown fields are ignored so payload additions on the platform side
//! never break deserialization.

use serde::{Deserialize, Serialize};

/// An inbound webhook update: a plain message, a callback from an inline
/// keyboard, or neither.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub message: IncomingMessage,
    pub data: String,
}

/// What the relay should act on, extracted from an update.
///
/// Callback queries win over plain messages when both are present,
/// matching how the platform delivers inline-button presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Free text or a slash command.
    Text { chat_id: String, text: String },
    /// An inline-keyboard callback payload (e.g. `"select_<id>"`).
    Callback { chat_id: String, data: String },
}

impl TelegramUpdate {
    /// Extract the actionable content, if any.
    pub fn parse(&self) -> Option<Inbound> {
        if let Some(callback) = &self.callback_query {
            return Some(Inbound::Callback {
                chat_id: callback.message.chat.id.to_string(),
                data: callback.data.clone(),
            });
        }
        if let Some(message) = &self.message {
            if let Some(text) = &message.text {
                return Some(Inbound::Text {
                    chat_id: message.chat.id.to_string(),
                    text: text.clone(),
                });
            }
        }
        None
    }
}
