//! Telegram Bot API transport.
//!
//! Implements `MessagingTransport` over the HTTP Bot API. The base URL is
//! configurable so tests and self-hosted gateways can point elsewhere.

use botmarket_core::transport::{KeyboardButton, MessagingTransport};
use botmarket_types::error::TransportError;
use serde_json::json;

/// HTTP client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramTransport {
    /// `api_url` is the base up to and excluding the token, e.g.
    /// `https://api.telegram.org/bot`.
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{api_url}{token}"),
        }
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> Result<(), TransportError> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError(format!("telegram request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError(format!(
                "telegram api returned {status}: {detail}"
            )));
        }
        Ok(())
    }
}

impl MessagingTransport for TelegramTransport {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        self.post("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[KeyboardButton],
    ) -> Result<(), TransportError> {
        // One button per row keeps long chatbot names readable.
        let rows: Vec<Vec<serde_json::Value>> = buttons
            .iter()
            .map(|b| vec![json!({ "text": b.text, "callback_data": b.callback_data })])
            .collect();
        self.post(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "reply_markup": { "inline_keyboard": rows }
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_includes_token() {
        let transport = TelegramTransport::new("https://api.telegram.org/bot", "123:abc");
        assert_eq!(transport.base_url, "https://api.telegram.org/bot123:abc");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let transport = TelegramTransport::new("http://127.0.0.1:1/bot", "t");
        let err = transport.send_message("42", "hi").await.unwrap_err();
        assert!(err.0.contains("telegram request failed"));
    }
}
