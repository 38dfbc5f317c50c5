//! Side-effect hooks that run before routing.
//!
//! Observers are best-effort bookkeeping. Each one runs in order, and a
//! failure is logged and swallowed so it can never change the routing outcome.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::{
    base::{
        config::DispatchConfig,
        types::{InboundMessage, MessageClass, Void},
    },
    service::db::DbClient,
};

// Traits.

/// A side effect invoked for inbound messages before routing.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this observer wants the message.
    fn applies(&self, message: &InboundMessage, class: MessageClass, config: &DispatchConfig) -> bool;

    /// Record the message.
    async fn observe(&self, message: &InboundMessage) -> Void;
}

/// Run every applicable observer, in order, isolating failures.
#[instrument(skip_all)]
pub async fn notify_all(observers: &[Arc<dyn Observer>], message: &InboundMessage, class: MessageClass, config: &DispatchConfig) {
    for observer in observers {
        if !observer.applies(message, class, config) {
            continue;
        }

        match observer.observe(message).await {
            Ok(()) => debug!("Observer `{}` recorded the message.", observer.name()),
            Err(err) => warn!("Observer `{}` failed: {}", observer.name(), err),
        }
    }
}

/// The standard observers, in order: warning list, channel memory, broadcast seed.
pub fn default_observers(db: &DbClient) -> Vec<Arc<dyn Observer>> {
    vec![
        Arc::new(WarningObserver { db: db.clone() }),
        Arc::new(ChannelMemoryObserver { db: db.clone() }),
        Arc::new(BroadcastObserver { db: db.clone() }),
    ]
}

// Structs.

/// Feeds the warning list from the configured warning channel.
pub struct WarningObserver {
    db: DbClient,
}

#[async_trait]
impl Observer for WarningObserver {
    fn name(&self) -> &'static str {
        "warning"
    }

    fn applies(&self, message: &InboundMessage, _class: MessageClass, config: &DispatchConfig) -> bool {
        config.watches_warning_channel(&message.channel_id)
    }

    async fn observe(&self, message: &InboundMessage) -> Void {
        self.db.add_warning(message).await
    }
}

/// Keeps conversational memory for the channel. Special messages are skipped.
pub struct ChannelMemoryObserver {
    db: DbClient,
}

#[async_trait]
impl Observer for ChannelMemoryObserver {
    fn name(&self) -> &'static str {
        "channel_memory"
    }

    fn applies(&self, _message: &InboundMessage, class: MessageClass, _config: &DispatchConfig) -> bool {
        !class.is_special()
    }

    async fn observe(&self, message: &InboundMessage) -> Void {
        self.db.add_channel_memory(message).await
    }
}

/// Seeds future broadcasts. Sees every message.
pub struct BroadcastObserver {
    db: DbClient,
}

#[async_trait]
impl Observer for BroadcastObserver {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn applies(&self, _message: &InboundMessage, _class: MessageClass, _config: &DispatchConfig) -> bool {
        true
    }

    async fn observe(&self, message: &InboundMessage) -> Void {
        self.db.add_broadcast_seed(message).await
    }
}
