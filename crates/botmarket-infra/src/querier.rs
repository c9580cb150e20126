//! Forwarding user queries to deployed chatbot endpoints.

use botmarket_core::transport::ChatbotQuerier;
use botmarket_types::error::TransportError;
use serde_json::json;

/// HTTP implementation of `ChatbotQuerier`: POSTs `{"query": ...}` to the
/// chatbot's registered endpoint and returns the response body as text.
#[derive(Clone, Default)]
pub struct HttpChatbotQuerier {
    client: reqwest::Client,
}

impl HttpChatbotQuerier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatbotQuerier for HttpChatbotQuerier {
    async fn query(&self, endpoint: &str, text: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .json(&json!({ "query": text }))
            .send()
            .await
            .map_err(|e| TransportError(format!("chatbot request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TransportError(format!(
                "chatbot endpoint returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError(format!("chatbot response unreadable: {e}")))
    }
}
