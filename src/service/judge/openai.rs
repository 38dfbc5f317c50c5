//! Thin wrapper around async-openai for the reply judge.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{InboundMessage, Res},
};

use super::{GenericJudgeClient, JudgeClient};

// Extra methods on `JudgeClient` applied by the openai implementation.

impl JudgeClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiJudgeClient::new(config);
        Self::new(Arc::new(client))
    }
}

// Types.

/// The judge model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JudgeVerdict {
    pub reply: bool,
    #[serde(default)]
    pub reason: String,
}

impl JudgeVerdict {
    /// Parse the model output, tolerating a surrounding code fence.
    pub fn parse(content: &str) -> Res<Self> {
        let trimmed = content.trim();
        let body = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.strip_suffix("```"))
            .unwrap_or(trimmed);

        Ok(serde_json::from_str(body.trim())?)
    }
}

// Specific implementations.

/// OpenAI judge client implementation.
#[derive(Clone)]
pub struct OpenAiJudgeClient {
    client: Client<OpenAIConfig>,
    model: String,
    directive: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiJudgeClient {
    /// Create a new OpenAI judge client.
    #[instrument(name = "OpenAiJudgeClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            model: config.openai_judge_model.clone(),
            directive: config.judge_directive.clone(),
            temperature: config.openai_judge_temperature,
            max_tokens: config.openai_judge_max_tokens,
        }
    }

    fn build_messages(&self, message: &InboundMessage) -> Res<Vec<ChatCompletionRequestMessage>> {
        let user_message = serde_json::to_string(message)?;

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default().content(self.directive.clone()).build()?.into(),
            ChatCompletionRequestUserMessageArgs::default().content(user_message).build()?.into(),
        ])
    }
}

#[async_trait]
impl GenericJudgeClient for OpenAiJudgeClient {
    #[instrument(name = "OpenAiJudgeClient::should_reply", skip_all)]
    async fn should_reply(&self, message: &InboundMessage) -> Res<bool> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(self.build_messages(message)?)
            .max_completion_tokens(self.max_tokens)
            .response_format(ResponseFormat::JsonObject);

        // Reasoning models reject a custom temperature.
        if self.model.starts_with("gpt") {
            request.temperature(self.temperature);
        }

        let response = self.client.chat().create(request.build()?).await?;
        let content = response.choices.first().and_then(|choice| choice.message.content.clone()).unwrap_or_default();

        debug!("Judge raw output: {}", content);

        let verdict = JudgeVerdict::parse(&content)?;

        info!("Judge verdict: reply = {} ({})", verdict.reply, verdict.reason);

        Ok(verdict.reply)
    }
}
