//! Inbound message types.

use std::fmt;

/// Unique identity of a chat message.
///
/// Telegram message ids are only unique within a chat, so the pair is the
/// deduplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub chat_id: i64,
    pub message_id: i64,
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

/// A message as delivered by the transport. Only the fields the forwarder
/// reads; everything else on the Telegram update is ignored.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub key: MessageKey,
    pub author_id: i64,
    pub author_name: String,
    pub text: String,
}
