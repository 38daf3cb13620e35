//! Forwarder module - relays keyword-matched Telegram messages into a
//! Google Doc.

pub mod appender;
pub mod auth;
pub mod docs;
pub mod engine;
pub mod filter;
pub mod message;

pub use auth::TokenProvider;
pub use docs::GoogleDocsClient;
pub use engine::ForwarderEngine;
pub use message::{InboundMessage, MessageKey};
