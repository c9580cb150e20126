//! Messaging relay: turns chat-platform updates into marketplace actions.
//!
//! Every inbound update gets a textual reply. Domain failures (unknown
//! chatbot, inactive chatbot, downstream errors, timeouts) are rendered as
//! chat messages, never propagated; only a failure to deliver the reply
//! itself surfaces as an error.

use std::time::Duration;

use botmarket_types::chatbot::{Chatbot, ChatbotStatus};
use botmarket_types::error::{ChatbotError, TransportError};
use botmarket_types::telegram::{Inbound, TelegramUpdate};

use crate::repository::chatbot::ChatbotRepository;
use crate::repository::user::UserRepository;
use crate::repository::{ChatbotField, FieldFilter, FilterValue};
use crate::service::chatbot::ChatbotService;
use crate::service::password::PasswordHasher;
use crate::service::user::{QueryGate, UserService};
use crate::transport::{ChatbotQuerier, KeyboardButton, MessagingTransport};

/// Callback payload prefix for chatbot selection buttons.
const SELECT_TAG: &str = "select_";

/// Cap on how long a forwarded query may hold the session mutex.
const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

const GREETING: &str =
    "Welcome to the chatbot marketplace!\nType /list to see the available chatbots.";
const NO_CHATBOTS: &str = "No chatbots are available right now. Check back later!";
const PICK_PROMPT: &str = "Select a chatbot to chat with:";
const NO_SELECTION: &str = "You haven't selected a chatbot yet. Type /list to pick one.";
const SELECTION_GONE: &str =
    "Your selected chatbot is no longer available. Type /list to pick another.";
const UNAVAILABLE: &str = "That chatbot is not available right now. Type /list to pick another.";
const BUSY: &str = "Please wait for your current query to finish.";
const QUERY_FAILED: &str = "Sorry, the chatbot could not answer that. Please try again.";
const QUERY_TIMED_OUT: &str = "The chatbot took too long to answer. Please try again.";
const INTERNAL: &str = "Something went wrong on our side. Please try again.";

/// Relay wiring the directory and session services to a chat platform.
pub struct Relay<C, U, H, T, Q>
where
    C: ChatbotRepository,
    U: UserRepository,
    H: PasswordHasher,
    T: MessagingTransport,
    Q: ChatbotQuerier,
{
    chatbots: ChatbotService<C, U>,
    users: UserService<U, H>,
    transport: T,
    querier: Q,
    query_timeout: Duration,
}

impl<C, U, H, T, Q> Relay<C, U, H, T, Q>
where
    C: ChatbotRepository,
    U: UserRepository,
    H: PasswordHasher,
    T: MessagingTransport,
    Q: ChatbotQuerier,
{
    pub fn new(
        chatbots: ChatbotService<C, U>,
        users: UserService<U, H>,
        transport: T,
        querier: Q,
    ) -> Self {
        Self {
            chatbots,
            users,
            transport,
            querier,
            query_timeout: QUERY_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Dispatch one webhook update. Updates with nothing actionable are
    /// dropped silently; everything else gets a reply.
    pub async fn handle_update(&self, update: &TelegramUpdate) -> Result<(), TransportError> {
        let Some(inbound) = update.parse() else {
            tracing::debug!("update carried no actionable content");
            return Ok(());
        };

        match inbound {
            Inbound::Callback { chat_id, data } => match data.strip_prefix(SELECT_TAG) {
                Some(chatbot_id) => self.handle_select(&chat_id, chatbot_id).await,
                None => {
                    tracing::warn!(data, "unrecognized callback payload");
                    self.transport.send_message(&chat_id, INTERNAL).await
                }
            },
            Inbound::Text { chat_id, text } => match text.trim() {
                "/start" => self.transport.send_message(&chat_id, GREETING).await,
                "/list" => self.handle_list(&chat_id).await,
                query => self.handle_query(&chat_id, query).await,
            },
        }
    }

    /// `/list`: active, telegram-capable chatbots as an inline keyboard.
    async fn handle_list(&self, chat_id: &str) -> Result<(), TransportError> {
        let filters = [
            FieldFilter::eq(
                ChatbotField::Status,
                FilterValue::text(ChatbotStatus::Active.to_string()),
            ),
            FieldFilter::eq(ChatbotField::TelegramSupport, FilterValue::Flag(true)),
        ];
        let listed = match self.chatbots.search(&filters).await {
            Ok(listed) => listed,
            Err(err) => {
                tracing::error!(%err, "chatbot listing failed");
                return self.transport.send_message(chat_id, INTERNAL).await;
            }
        };

        if listed.is_empty() {
            return self.transport.send_message(chat_id, NO_CHATBOTS).await;
        }

        let buttons: Vec<KeyboardButton> = listed
            .iter()
            .map(|c| KeyboardButton {
                text: c.name.clone(),
                callback_data: format!("{SELECT_TAG}{}", c.id),
            })
            .collect();
        self.transport
            .send_inline_keyboard(chat_id, PICK_PROMPT, &buttons)
            .await
    }

    /// Selection callback: validate the chatbot, persist the choice.
    async fn handle_select(&self, chat_id: &str, chatbot_id: &str) -> Result<(), TransportError> {
        let chatbot = match self.chatbots.get(chatbot_id).await {
            Ok(chatbot) => chatbot,
            Err(ChatbotError::NotFound) => {
                return self.transport.send_message(chat_id, SELECTION_GONE).await;
            }
            Err(err) => {
                tracing::error!(%err, chatbot_id, "chatbot lookup failed");
                return self.transport.send_message(chat_id, INTERNAL).await;
            }
        };
        if !Self::reachable(&chatbot) {
            return self.transport.send_message(chat_id, UNAVAILABLE).await;
        }

        if let Err(err) = self.users.select_chatbot(chat_id, &chatbot.id).await {
            tracing::error!(%err, chat_id, "storing selection failed");
            return self.transport.send_message(chat_id, INTERNAL).await;
        }
        self.transport
            .send_message(
                chat_id,
                &format!("You are now chatting with {}. Ask away!", chatbot.name),
            )
            .await
    }

    /// Free text: forward to the selected chatbot under the session mutex.
    async fn handle_query(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        let user = match self.users.ensure_chat_user(chat_id).await {
            Ok(user) => user,
            Err(err) => {
                tracing::error!(%err, chat_id, "chat session lookup failed");
                return self.transport.send_message(chat_id, INTERNAL).await;
            }
        };
        let Some(chatbot_id) = user.selected_chatbot_id else {
            return self.transport.send_message(chat_id, NO_SELECTION).await;
        };

        let chatbot = match self.chatbots.get(&chatbot_id).await {
            Ok(chatbot) => chatbot,
            Err(ChatbotError::NotFound) => {
                return self.transport.send_message(chat_id, SELECTION_GONE).await;
            }
            Err(err) => {
                tracing::error!(%err, chatbot_id, "chatbot lookup failed");
                return self.transport.send_message(chat_id, INTERNAL).await;
            }
        };
        if !Self::reachable(&chatbot) {
            return self.transport.send_message(chat_id, UNAVAILABLE).await;
        }

        match self.users.begin_query(chat_id).await {
            Ok(QueryGate::Acquired) => {}
            Ok(QueryGate::Busy) => {
                return self.transport.send_message(chat_id, BUSY).await;
            }
            Err(err) => {
                tracing::error!(%err, chat_id, "acquiring query gate failed");
                return self.transport.send_message(chat_id, INTERNAL).await;
            }
        }

        let outcome =
            tokio::time::timeout(self.query_timeout, self.querier.query(&chatbot.endpoint, text))
                .await;

        // The gate must reopen no matter how the query ended.
        if let Err(err) = self.users.finish_query(chat_id).await {
            tracing::error!(%err, chat_id, "releasing query gate failed");
        }

        let reply = match outcome {
            Ok(Ok(answer)) => answer,
            Ok(Err(err)) => {
                tracing::warn!(%err, chatbot_id = %chatbot.id, "chatbot query failed");
                QUERY_FAILED.to_string()
            }
            Err(_) => {
                tracing::warn!(chatbot_id = %chatbot.id, "chatbot query timed out");
                QUERY_TIMED_OUT.to_string()
            }
        };
        self.transport.send_message(chat_id, &reply).await
    }

    fn reachable(chatbot: &Chatbot) -> bool {
        chatbot.status == ChatbotStatus::Active && chatbot.telegram_support
    }
}
