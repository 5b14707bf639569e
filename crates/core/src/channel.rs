//! Channel trait: the abstraction over chat transports.
//!
//! A Channel connects gymbot to a messaging platform (Telegram, the local
//! terminal). It receives messages from users and sends replies back,
//! together with the menu buttons the user should see next.

use crate::error::ChannelError;
use crate::schedule::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// The channel this message belongs to
    pub channel_id: ChannelId,

    /// Sender identifier (platform user id)
    pub sender_id: UserId,

    /// Human-readable sender name (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// The chat the reply goes to
    pub chat_id: String,

    /// The text content
    pub content: String,

    /// Whether the platform flagged the text as a bot command
    #[serde(default)]
    pub is_command: bool,
}

/// An outbound reply: text plus the ordered menu labels to offer next.
///
/// An empty menu leaves whatever keyboard the user already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub menu: Vec<String>,
}

impl Reply {
    pub fn new(text: impl Into<String>, menu: Vec<String>) -> Self {
        Self {
            text: text.into(),
            menu,
        }
    }

    /// A reply without a menu; the current keyboard stays.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// The core Channel trait.
///
/// Implementations handle platform-specific connection logic, keyboard
/// rendering and authentication.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "telegram", "cli").
    fn name(&self) -> &str;

    /// Unique ID for this channel instance.
    fn id(&self) -> &ChannelId;

    /// Start listening for incoming messages.
    ///
    /// Returns a receiver that yields incoming messages. The channel
    /// implementation handles polling internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelMessage, ChannelError>>,
        ChannelError,
    >;

    /// Send a reply to a specific chat.
    async fn send(&self, chat_id: &str, reply: &Reply) -> std::result::Result<(), ChannelError>;

    /// Check if a sender is allowed (allowlist check).
    fn is_allowed(&self, sender_id: UserId) -> bool;

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }

    /// Health check: is the channel connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}
