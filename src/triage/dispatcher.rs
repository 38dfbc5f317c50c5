//! The message-triage dispatcher.
//!
//! Evaluation order, first match wins:
//! 1. observers (warning list, channel memory, broadcast seed), never gating;
//! 2. private conversations;
//! 3. nickname or direct mention in a group;
//! 4. the configured auto-trigger (judge or random);
//! 5. pass-through.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::{
    base::{
        config::{DispatchConfig, TriggerPolicy},
        types::{DispatchOutcome, HandlerKind, InboundMessage, Res},
    },
    service::{db::DbClient, judge::JudgeClient, reply::ReplyClient},
};

use super::{
    classifier::classify,
    gate::{self, Roll},
    nickname,
    observer::{self, Observer},
    prompt::normalize_prompt,
    session::is_private,
};

/// Routes each inbound message to at most one reply handler.
///
/// Holds no per-message state; it is trivially cloneable and safe to share
/// across concurrently dispatched messages.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<DispatchConfig>,
    db: DbClient,
    judge: JudgeClient,
    replies: ReplyClient,
    observers: Arc<[Arc<dyn Observer>]>,
    roll: Roll,
}

impl Dispatcher {
    /// Create a dispatcher with the standard observers and a thread-local RNG.
    pub fn new(config: DispatchConfig, db: DbClient, judge: JudgeClient, replies: ReplyClient) -> Self {
        let observers = observer::default_observers(&db).into();

        Self {
            config: Arc::new(config),
            db,
            judge,
            replies,
            observers,
            roll: gate::thread_roll(),
        }
    }

    /// Replace the observers.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observer>>) -> Self {
        self.observers = observers.into();
        self
    }

    /// Replace the random source used by the random trigger.
    pub fn with_roll(mut self, roll: Roll) -> Self {
        self.roll = roll;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Triage one message.
    ///
    /// Observer failures are logged and ignored. Failures of the profile store
    /// or of the selected handler are returned; once a handler is selected
    /// there is no fallback to a lower-priority path.
    #[instrument(skip_all, fields(channel_id = %message.channel_id, user_id = %message.user_id))]
    pub async fn dispatch(&self, message: &InboundMessage) -> Res<DispatchOutcome> {
        let config = self.config.clone();
        let class = classify(message);

        observer::notify_all(&self.observers, message, class, &config).await;

        let private = is_private(message);

        if config.private_enabled && private && !message.is_from_self() {
            let prompt = normalize_prompt(&message.content, &message.self_id);

            if prompt.is_empty() {
                debug!("Empty private message, passing through.");
                return Ok(DispatchOutcome::PassThrough);
            }

            self.replies.handle_private(message, &prompt).await.context("Private handler failed")?;
            return Ok(self.handled(HandlerKind::Private));
        }

        if config.nick_name_enabled && !private && !class.is_special() && nickname::matches_nickname(message, &config, &self.db).await? {
            let prompt = normalize_prompt(&message.content, &message.self_id);

            if prompt.is_empty() {
                debug!("Nickname matched an empty prompt, passing through.");
                return Ok(DispatchOutcome::PassThrough);
            }

            self.replies.handle_nickname(message, &prompt).await.context("Nickname handler failed")?;
            return Ok(self.handled(HandlerKind::NickName));
        }

        match config.trigger_policy {
            TriggerPolicy::Judge => {
                if gate::should_auto_reply(message, &config, &self.judge).await {
                    self.replies.handle_auto_reply(message, &message.content).await.context("Auto-reply handler failed")?;
                    return Ok(self.handled(HandlerKind::AutoReply));
                }
            }
            TriggerPolicy::Random => {
                if gate::should_random_reply(message, &config, &self.roll) {
                    self.replies.handle_random(message, &message.content).await.context("Random handler failed")?;
                    return Ok(self.handled(HandlerKind::Random));
                }
            }
        }

        debug!("No trigger matched, passing through.");

        Ok(DispatchOutcome::PassThrough)
    }

    fn handled(&self, kind: HandlerKind) -> DispatchOutcome {
        info!("Handled by {:?}.", kind);
        DispatchOutcome::Handled(kind)
    }
}
