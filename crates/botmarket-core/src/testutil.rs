//! In-memory fakes for service and relay tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use botmarket_types::chatbot::{Chatbot, ChatbotStatus, NewChatbot};
use botmarket_types::error::{RepositoryError, TransportError, UserError};
use botmarket_types::user::User;

use crate::repository::chatbot::ChatbotRepository;
use crate::repository::user::UserRepository;
use crate::repository::{ChatbotField, FieldFilter, FilterValue};
use crate::service::password::PasswordHasher;
use crate::transport::{ChatbotQuerier, KeyboardButton, MessagingTransport};

/// A valid registration request with sensible defaults.
pub fn new_chatbot(name: &str, developer_id: Option<String>) -> NewChatbot {
    NewChatbot {
        id: None,
        name: name.to_string(),
        version: "1.0".to_string(),
        endpoint: "https://bots.example.com/hook".to_string(),
        description: "a chatbot under test".to_string(),
        status: None,
        developer_id,
        telegram_support: false,
        deployment_resource: None,
    }
}

/// HashMap-backed [`ChatbotRepository`]. Clones share storage.
#[derive(Clone, Default)]
pub struct MemoryChatbotRepository {
    inner: Arc<Mutex<MemoryChatbotState>>,
}

#[derive(Default)]
struct MemoryChatbotState {
    records: BTreeMap<String, Chatbot>,
    upserts: usize,
}

impl MemoryChatbotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed, for asserting skipped no-op writes.
    pub fn upsert_count(&self) -> usize {
        self.inner.lock().unwrap().upserts
    }

    /// Push a record's `updated_at` into the past so a later write is
    /// distinguishable at second granularity.
    pub fn rewind_updated_at(&self, id: &str, secs: i64) -> Option<()> {
        let mut state = self.inner.lock().unwrap();
        let record = state.records.get_mut(id)?;
        record.updated_at -= secs;
        Some(())
    }
}

impl ChatbotRepository for MemoryChatbotRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Chatbot>, RepositoryError> {
        Ok(self.inner.lock().unwrap().records.get(id).cloned())
    }

    async fn find_by_field(
        &self,
        field: ChatbotField,
        value: FilterValue,
    ) -> Result<Vec<Chatbot>, RepositoryError> {
        self.search(&[FieldFilter::eq(field, value)]).await
    }

    async fn search(&self, filters: &[FieldFilter]) -> Result<Vec<Chatbot>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .values()
            .filter(|c| filters.iter().all(|f| f.matches(c)))
            .cloned()
            .collect())
    }

    async fn upsert(&self, chatbot: &Chatbot) -> Result<(), RepositoryError> {
        let mut state = self.inner.lock().unwrap();
        state.records.insert(chatbot.id.clone(), chatbot.clone());
        state.upserts += 1;
        Ok(())
    }
}

/// HashMap-backed [`UserRepository`]. Clones share storage.
#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    records: Arc<Mutex<BTreeMap<String, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without going through a service.
    pub fn insert(&self, user: User) {
        self.records.lock().unwrap().insert(user.id.clone(), user);
    }
}

impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .unwrap()
            .insert(user.id.clone(), user.clone());
        Ok(())
    }
}

/// Marker-prefix hasher. Keeps tests fast and assertions readable.
#[derive(Clone, Copy)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, UserError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash == format!("hashed:{password}")
    }
}

/// Records every outbound message instead of delivering it.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub messages: Arc<Mutex<Vec<(String, String)>>>,
    pub keyboards: Arc<Mutex<Vec<(String, String, Vec<KeyboardButton>)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn last_keyboard(&self) -> Option<Vec<KeyboardButton>> {
        self.keyboards
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, buttons)| buttons.clone())
    }
}

impl MessagingTransport for RecordingTransport {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        self.messages
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[KeyboardButton],
    ) -> Result<(), TransportError> {
        self.keyboards.lock().unwrap().push((
            chat_id.to_string(),
            text.to_string(),
            buttons.to_vec(),
        ));
        Ok(())
    }
}

/// Returns a canned reply (or failure) and records each call.
#[derive(Clone)]
pub struct ScriptedQuerier {
    reply: Result<String, String>,
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedQuerier {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ChatbotQuerier for ScriptedQuerier {
    async fn query(&self, endpoint: &str, text: &str) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), text.to_string()));
        self.reply.clone().map_err(TransportError)
    }
}

/// Shortcut: create and store an already-active, telegram-capable chatbot.
pub async fn active_chatbot(
    repo: &MemoryChatbotRepository,
    name: &str,
) -> Result<Chatbot, RepositoryError> {
    let mut request = new_chatbot(name, None);
    request.status = Some(ChatbotStatus::Active);
    request.telegram_support = true;
    let chatbot = Chatbot::new(request).unwrap();
    repo.upsert(&chatbot).await?;
    Ok(chatbot)
}
