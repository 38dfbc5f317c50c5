pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{InboundMessage, Res};

// Traits.

/// Generic reply-judge trait that clients must implement.
///
/// A judge makes the semantic call of whether the bot should reply to a
/// message nobody addressed to it. Implementing this trait allows different
/// LLM providers (or heuristics) to back the auto-reply gate.
#[async_trait]
pub trait GenericJudgeClient: Send + Sync + 'static {
    /// Decide whether the bot should reply, unprompted, to `message`.
    ///
    /// Errors are treated as "no" by the caller.
    async fn should_reply(&self, message: &InboundMessage) -> Res<bool>;
}

// Structs.

/// Judge client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct JudgeClient {
    inner: Arc<dyn GenericJudgeClient>,
}

impl Deref for JudgeClient {
    type Target = dyn GenericJudgeClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl JudgeClient {
    pub fn new(inner: Arc<dyn GenericJudgeClient>) -> Self {
        Self { inner }
    }
}
