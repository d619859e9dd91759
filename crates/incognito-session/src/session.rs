use incognito_llm::{Attachment, ChatMessage, ChatMode, ProxyMessage, ProxyRequest, Role};
use incognito_persist::{Chat, ChatStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::CompletionBackend;
use crate::error::{Result, SessionError};

/// Assistant message recorded when `send` fails
pub const APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Assistant message recorded when `regenerate` fails
pub const REGENERATE_APOLOGY: &str =
    "I apologize, but I encountered an error regenerating the response. Please try again.";

/// Result of one `send` or `regenerate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Nothing was sent: another request was in flight or there was nothing to send
    Ignored,
    /// The assistant replied
    Replied,
    /// The backend failed; an apology was recorded instead
    Failed,
}

#[derive(Default)]
struct SessionState {
    messages: Vec<ChatMessage>,
    /// Conversation the messages belong to, once one exists
    chat: Option<Chat>,
}

/// Holds the in-flight flag for as long as it lives
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One user's view of a conversation
///
/// Keeps the visible message list, talks to the proxy through a
/// [`CompletionBackend`] and writes every exchange through to the
/// [`ChatStore`]. At most one request is in flight; calls made meanwhile
/// are ignored or rejected with [`SessionError::Busy`].
pub struct ChatSession {
    backend: Arc<dyn CompletionBackend>,
    store: Arc<ChatStore>,
    mode: ChatMode,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn CompletionBackend>, store: Arc<ChatStore>) -> Self {
        Self {
            backend,
            store,
            mode: ChatMode::default(),
            state: Mutex::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_mode(mut self, mode: ChatMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().messages.clone()
    }

    pub fn active_chat_id(&self) -> Option<String> {
        self.state().chat.as_ref().map(|chat| chat.id.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Chats known to the store, most recent first
    pub async fn chats(&self) -> Vec<Chat> {
        self.store.list_chats().await
    }

    /// Bind the chat the store marks active, if it still exists
    pub async fn restore(&self) -> bool {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return false;
        };

        let storage = self.store.load().await;
        let Some(chat) = storage
            .active_chat_id
            .as_deref()
            .and_then(|id| storage.chat(id))
            .cloned()
        else {
            return false;
        };

        tracing::debug!(chat_id = %chat.id, "Restored active chat");
        self.bind(Some(chat));
        true
    }

    /// Send a user turn and record the reply
    pub async fn send(&self, content: &str, attachments: Vec<Attachment>) -> Exchange {
        if content.trim().is_empty() && attachments.is_empty() {
            return Exchange::Ignored;
        }
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Send ignored while a request is in flight");
            return Exchange::Ignored;
        };

        let metas = attachments.iter().map(Attachment::meta).collect();
        let request = {
            let mut state = self.state();
            state
                .messages
                .push(ChatMessage::user(content).with_attachments(metas));
            self.build_request(&state.messages, attachments)
        };

        self.exchange(request, APOLOGY).await
    }

    /// Ask for a new reply to the latest user turn
    ///
    /// A trailing assistant message is dropped first. Attachment contents are
    /// not kept, so the retried turn carries only its text.
    pub async fn regenerate(&self) -> Exchange {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Regenerate ignored while a request is in flight");
            return Exchange::Ignored;
        };

        let request = {
            let mut state = self.state();
            if !state.messages.iter().any(|m| m.role == Role::User) {
                return Exchange::Ignored;
            }
            if state.messages.last().map(|m| m.role) == Some(Role::Assistant) {
                state.messages.pop();
            }
            self.build_request(&state.messages, Vec::new())
        };

        self.exchange(request, REGENERATE_APOLOGY).await
    }

    /// Bind an existing chat and mark it active
    pub async fn open(&self, chat_id: &str) -> Result<()> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(SessionError::Busy)?;

        let chat = self
            .store
            .get_chat(chat_id)
            .await
            .ok_or_else(|| SessionError::ChatNotFound(chat_id.to_string()))?;

        self.bind(Some(chat));
        self.store.set_active_chat(Some(chat_id)).await;
        Ok(())
    }

    /// Start an empty conversation; nothing is stored until the first reply
    pub async fn new_chat(&self) -> Result<()> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(SessionError::Busy)?;

        self.bind(None);
        self.store.set_active_chat(None).await;
        Ok(())
    }

    /// Remove a chat from the store, unbinding it when it is the open one
    pub async fn delete(&self, chat_id: &str) -> Result<()> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(SessionError::Busy)?;

        if self.active_chat_id().as_deref() == Some(chat_id) {
            self.bind(None);
        }
        self.store.delete_chat(chat_id).await;
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bind(&self, chat: Option<Chat>) {
        let mut state = self.state();
        state.messages = chat.as_ref().map(|c| c.messages.clone()).unwrap_or_default();
        state.chat = chat;
    }

    /// Conversation as sent to the proxy; `attachments` ride on the last message
    fn build_request(&self, messages: &[ChatMessage], attachments: Vec<Attachment>) -> ProxyRequest {
        let mut proxy_messages: Vec<ProxyMessage> = messages.iter().map(ProxyMessage::from).collect();
        if let Some(last) = proxy_messages.last_mut() {
            last.attachments = attachments;
        }

        ProxyRequest {
            messages: proxy_messages,
            mode: self.mode,
        }
    }

    async fn exchange(&self, request: ProxyRequest, apology: &str) -> Exchange {
        let (reply, outcome) = match self.backend.complete(request).await {
            Ok(reply) => (
                ChatMessage::assistant(reply.message.content).with_signature(reply.signature),
                Exchange::Replied,
            ),
            Err(e) => {
                tracing::error!("Chat exchange failed: {}", e);
                (ChatMessage::assistant(apology), Exchange::Failed)
            }
        };

        let created = self.state().chat.is_none();
        if let Some(chat) = self.record(reply, outcome == Exchange::Replied) {
            let saved = self.store.upsert_chat(chat.clone()).await;
            tracing::debug!(chat_id = %chat.id, outcome = ?saved, "Saved chat");
            if created {
                self.store.set_active_chat(Some(chat.id.as_str())).await;
            }
        }

        outcome
    }

    /// Append the reply and return the chat to persist
    ///
    /// A conversation without a chat only gets one on a successful reply.
    fn record(&self, reply: ChatMessage, replied: bool) -> Option<Chat> {
        let mut guard = self.state();
        let state = &mut *guard;
        state.messages.push(reply);

        if state.chat.is_none() {
            if !replied {
                return None;
            }
            let title = state
                .messages
                .iter()
                .find(|m| m.role == Role::User)
                .map(|m| Chat::title_from(&m.content))
                .unwrap_or_else(|| Chat::title_from(""));
            state.chat = Some(self.store.create_chat(title));
        }

        let chat = state.chat.as_mut()?;
        chat.set_messages(state.messages.clone());
        Some(chat.clone())
    }
}
