use std::cell::RefCell;

use super::client::ApiError;
use super::types::OutgoingMessage;

/// Outgoing side of the Bot API - allows both the real client and a
/// recording stand-in for tests
pub trait Messenger {
    fn send_message(&self, message: &OutgoingMessage) -> Result<(), ApiError>;

    fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), ApiError>;

    fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), ApiError>;
}

/// Something the bot tried to send
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message(OutgoingMessage),
    CallbackAnswer {
        callback_query_id: String,
        text: Option<String>,
        show_alert: bool,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
    },
}

/// Records every call instead of sending it
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: RefCell<Vec<Sent>>,
    /// Chats whose `sendMessage` calls fail
    unreachable: Vec<i64>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every message to `chat_id` fail as if the user blocked the bot
    pub fn with_unreachable(mut self, chat_id: i64) -> Self {
        self.unreachable.push(chat_id);
        self
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> Vec<Sent> {
        self.sent.borrow_mut().drain(..).collect()
    }

    /// Texts of messages sent to `chat_id`
    pub fn messages_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Sent::Message(m) if m.chat_id == chat_id => Some(m.text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Messenger for RecordingMessenger {
    fn send_message(&self, message: &OutgoingMessage) -> Result<(), ApiError> {
        if self.unreachable.contains(&message.chat_id) {
            return Err(ApiError::Api {
                code: 403,
                description: "Forbidden: bot was blocked by the user".into(),
            });
        }
        self.sent.borrow_mut().push(Sent::Message(message.clone()));
        Ok(())
    }

    fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), ApiError> {
        self.sent.borrow_mut().push(Sent::CallbackAnswer {
            callback_query_id: callback_query_id.to_string(),
            text: text.map(str::to_string),
            show_alert,
        });
        Ok(())
    }

    fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), ApiError> {
        self.sent.borrow_mut().push(Sent::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
