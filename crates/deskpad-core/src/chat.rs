//! Chat transcript and the send state machine.
//!
//! The transcript is never persisted. A send moves `Idle -> Sending`, and the
//! outcome of the request (whatever it is) moves it back to `Idle` with one
//! bot message appended.

use log::{info, warn};

use crate::ai::{ChatError, Reply};

pub const MISSING_KEY_MESSAGE: &str = "Please save your Gemini API key first!";
pub const KEY_SAVED_MESSAGE: &str = "API key saved successfully! You can now chat with me.";
pub const GREETING_MESSAGE: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const EMPTY_REPLY_MESSAGE: &str = "Sorry, I could not generate a response.";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Error: Could not connect to Gemini API. Please check your API key.";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.role == ChatRole::User
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    Sending,
}

/// A request the caller must run against a [`TextGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub api_key: String,
    pub prompt: String,
}

#[derive(Debug, Default)]
pub struct Chat {
    messages: Vec<ChatMessage>,
    phase: ChatPhase,
}

impl Chat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// True while a request is outstanding; the UI shows "Thinking..." meanwhile.
    pub fn is_thinking(&self) -> bool {
        self.phase == ChatPhase::Sending
    }

    pub fn push_bot(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn greet(&mut self) {
        self.push_bot(GREETING_MESSAGE);
    }

    /// Starts a send.
    ///
    /// Returns `None` when nothing needs to go over the network: blank input,
    /// a request already in flight, or no credential (which appends the
    /// missing-key message instead).
    pub fn submit(&mut self, input: &str, credential: Option<&str>) -> Option<PendingRequest> {
        let prompt = input.trim();
        if prompt.is_empty() || self.is_thinking() {
            return None;
        }

        let Some(api_key) = credential.filter(|k| !k.is_empty()) else {
            self.push_bot(MISSING_KEY_MESSAGE);
            return None;
        };

        self.messages.push(ChatMessage::user(prompt));
        self.phase = ChatPhase::Sending;
        info!("event=chat_send chars={}", prompt.chars().count());

        Some(PendingRequest {
            api_key: api_key.to_string(),
            prompt: prompt.to_string(),
        })
    }

    /// Finishes the outstanding send with the request outcome. Ignored when
    /// nothing is in flight.
    pub fn complete(&mut self, outcome: Result<Reply, ChatError>) {
        if !self.is_thinking() {
            warn!("event=chat_reply status=unexpected");
            return;
        }
        self.phase = ChatPhase::Idle;

        let message = match outcome {
            Ok(Reply::Text(text)) => {
                info!("event=chat_reply status=ok");
                text
            }
            Ok(Reply::ApiError(message)) => {
                warn!("event=chat_reply status=api_error");
                format!("Error: {}", message)
            }
            Ok(Reply::Empty) => {
                warn!("event=chat_reply status=empty");
                EMPTY_REPLY_MESSAGE.to_string()
            }
            Err(err) => {
                warn!("event=chat_reply status=failed error={}", err);
                CONNECTION_ERROR_MESSAGE.to_string()
            }
        };

        self.push_bot(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_ignored() {
        let mut chat = Chat::new();
        assert!(chat.submit("   ", Some("key")).is_none());
        assert!(chat.messages().is_empty());
        assert_eq!(chat.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_missing_key_reports_without_request() {
        let mut chat = Chat::new();
        assert!(chat.submit("hello", None).is_none());
        assert!(chat.submit("hello", Some("")).is_none());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[0], ChatMessage::assistant(MISSING_KEY_MESSAGE));
        assert!(!chat.is_thinking());
    }

    #[test]
    fn test_submit_enters_sending() {
        let mut chat = Chat::new();
        let request = chat.submit("  what is rust?  ", Some("k")).unwrap();
        assert_eq!(request.prompt, "what is rust?");
        assert_eq!(request.api_key, "k");
        assert!(chat.is_thinking());
        assert!(chat.messages()[0].is_from_user());

        // second submit while sending is dropped
        assert!(chat.submit("again", Some("k")).is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_complete_without_send_is_ignored() {
        let mut chat = Chat::new();
        chat.complete(Ok(Reply::Text("stray".to_string())));
        assert!(chat.messages().is_empty());

        chat.submit("a", Some("k"));
        chat.complete(Ok(Reply::Text("reply".to_string())));
        chat.complete(Ok(Reply::Text("late duplicate".to_string())));
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].content, "reply");
    }

    #[test]
    fn test_complete_maps_outcomes() {
        let mut chat = Chat::new();
        chat.submit("a", Some("k"));
        chat.complete(Ok(Reply::Text("reply".to_string())));
        chat.submit("b", Some("k"));
        chat.complete(Ok(Reply::ApiError("bad key".to_string())));
        chat.submit("c", Some("k"));
        chat.complete(Ok(Reply::Empty));
        chat.submit("d", Some("k"));
        let decode = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        chat.complete(Err(ChatError::Decode(decode)));

        let bot: Vec<&str> = chat
            .messages()
            .iter()
            .filter(|m| !m.is_from_user())
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            bot,
            vec!["reply", "Error: bad key", EMPTY_REPLY_MESSAGE, CONNECTION_ERROR_MESSAGE]
        );
        assert!(!chat.is_thinking());
    }
}
