//! Reply handlers that relay the selected path back through the chat transport.
//!
//! Composing the reply text is the host's job; the relay tells it which path
//! fired and hands over the content that path should answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    base::types::{HandlerKind, InboundMessage, ReplyRequest, Void},
    service::chat::ChatClient,
};

use super::{GenericReplyHandler, ReplyClient};

// Extra methods on `ReplyClient` applied by the relay implementation.

impl ReplyClient {
    pub fn relay(chat: ChatClient) -> Self {
        Self::new(Arc::new(RelayReplyHandler { chat }))
    }
}

/// Relay reply handler.
#[derive(Clone)]
pub struct RelayReplyHandler {
    chat: ChatClient,
}

impl RelayReplyHandler {
    async fn relay(&self, kind: HandlerKind, message: &InboundMessage, content: &str) -> Void {
        let request = ReplyRequest {
            kind,
            channel_id: message.channel_id.clone(),
            user_id: message.user_id.clone(),
            content: content.to_string(),
        };

        self.chat.send_reply(&request).await
    }
}

#[async_trait]
impl GenericReplyHandler for RelayReplyHandler {
    #[instrument(skip_all)]
    async fn handle_private(&self, message: &InboundMessage, content: &str) -> Void {
        self.relay(HandlerKind::Private, message, content).await
    }

    #[instrument(skip_all)]
    async fn handle_nickname(&self, message: &InboundMessage, content: &str) -> Void {
        self.relay(HandlerKind::NickName, message, content).await
    }

    #[instrument(skip_all)]
    async fn handle_auto_reply(&self, message: &InboundMessage, content: &str) -> Void {
        self.relay(HandlerKind::AutoReply, message, content).await
    }

    #[instrument(skip_all)]
    async fn handle_random(&self, message: &InboundMessage, content: &str) -> Void {
        self.relay(HandlerKind::Random, message, content).await
    }
}
