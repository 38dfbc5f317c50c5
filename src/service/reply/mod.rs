pub mod relay;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{InboundMessage, Void};

// Traits.

/// Generic reply handler trait.
///
/// Each method composes and sends a reply for one trigger path. The
/// dispatcher calls at most one of them per message, only after every gate has
/// resolved, and treats the return as terminal.
#[async_trait]
pub trait GenericReplyHandler: Send + Sync + 'static {
    /// Reply in a direct conversation.
    async fn handle_private(&self, message: &InboundMessage, content: &str) -> Void;

    /// Reply because the bot was named or mentioned.
    async fn handle_nickname(&self, message: &InboundMessage, content: &str) -> Void;

    /// Reply because the judge said the message deserves one.
    async fn handle_auto_reply(&self, message: &InboundMessage, content: &str) -> Void;

    /// Reply because the random trigger fired.
    async fn handle_random(&self, message: &InboundMessage, content: &str) -> Void;
}

// Structs.

/// Reply handler for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ReplyClient {
    inner: Arc<dyn GenericReplyHandler>,
}

impl Deref for ReplyClient {
    type Target = dyn GenericReplyHandler;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ReplyClient {
    pub fn new(inner: Arc<dyn GenericReplyHandler>) -> Self {
        Self { inner }
    }
}
