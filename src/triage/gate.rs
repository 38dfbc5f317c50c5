//! Auto-reply gate and its random-trigger sibling.

use std::sync::Arc;

use rand::Rng;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::{
    base::{config::DispatchConfig, types::InboundMessage},
    service::judge::JudgeClient,
};

use super::{classifier::classify, session::is_private};

/// Source of uniform draws in `[0, 1)` for the random trigger.
pub type Roll = Arc<dyn Fn() -> f64 + Send + Sync>;

/// A [`Roll`] backed by the thread-local RNG.
pub fn thread_roll() -> Roll {
    Arc::new(|| rand::rng().random::<f64>())
}

/// Whether the bot should reply to a message nobody addressed to it.
///
/// Local filters run first so the judge is only consulted for plausible
/// candidates. A judge error or timeout counts as "no".
#[instrument(skip_all, fields(channel_id = %message.channel_id))]
pub async fn should_auto_reply(message: &InboundMessage, config: &DispatchConfig, judge: &JudgeClient) -> bool {
    if !config.enable_auto_reply || classify(message).is_special() || message.is_from_self() {
        return false;
    }

    if message.content_len() > config.max_tokens {
        debug!("Message too long for auto-reply ({} > {}).", message.content_len(), config.max_tokens);
        return false;
    }

    match timeout(config.judge_timeout, judge.should_reply(message)).await {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(err)) => {
            warn!("Judge failed, not replying: {}", err);
            false
        }
        Err(_) => {
            warn!("Judge timed out after {:?}, not replying.", config.judge_timeout);
            false
        }
    }
}

/// Whether the random trigger fires for this message.
///
/// Group sessions only, never for special messages, and only for messages
/// longer than `random_min_tokens`. The draw happens last.
pub fn should_random_reply(message: &InboundMessage, config: &DispatchConfig, roll: &Roll) -> bool {
    if is_private(message) || classify(message).is_special() || message.is_from_self() {
        return false;
    }

    if message.content_len() <= config.random_min_tokens {
        return false;
    }

    roll() < config.random_reply_probability
}
