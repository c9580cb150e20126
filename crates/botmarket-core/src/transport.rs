//! Outbound transport traits (ports).
//!
//! The chat-messaging platform and the chatbot services themselves are
//! external collaborators; the core only sees these interfaces.

use botmarket_types::error::TransportError;

/// One selectable item in an inline keyboard. `callback_data` is the opaque
/// payload echoed back when the button is pressed (`"<tag>_<id>"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// Chat-platform message delivery.
pub trait MessagingTransport: Send + Sync {
    /// Send a plain text message to a chat.
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Send a text message with an inline keyboard, one button per row.
    fn send_inline_keyboard(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[KeyboardButton],
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

/// Forwarding a user query to a deployed chatbot endpoint.
pub trait ChatbotQuerier: Send + Sync {
    /// POST the query to the chatbot's endpoint and return its textual reply.
    fn query(
        &self,
        endpoint: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, TransportError>> + Send;
}
