pub mod stdio;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{InboundMessage, ReplyRequest, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the transport between the chat platform and the
/// dispatcher: where inbound messages come from, and where selected replies go.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to detect when the bot is mentioned.
    fn bot_user_id(&self) -> &str;

    /// Wait for the next inbound message.
    ///
    /// Returns `None` once the transport is closed.
    async fn next_message(&self) -> Res<Option<InboundMessage>>;

    /// Deliver a reply request to the platform.
    async fn send_reply(&self, request: &ReplyRequest) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
