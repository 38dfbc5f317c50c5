//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI judge model to use
fn default_openai_judge_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default sampling temperature for the OpenAI judge
fn default_openai_judge_temperature() -> f32 {
    0.0
}

/// Default max output tokens for the judge verdict
fn default_openai_judge_max_tokens() -> u32 {
    256
}

/// Default system directive for the judge.
fn default_judge_directive() -> String {
    prompts::JUDGE_SYSTEM_DIRECTIVE.to_string()
}

fn default_db_endpoint() -> String {
    "mem://".to_string()
}

fn default_db_namespace() -> String {
    "chat".to_string()
}

fn default_db_database() -> String {
    "triage".to_string()
}

fn default_max_tokens() -> usize {
    50
}

fn default_random_min_tokens() -> usize {
    10
}

fn default_judge_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_nick_name_item_key() -> String {
    "情侶合照".to_string()
}

/// Configuration for the chat-triage application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI model used by the reply judge (`OPENAI_JUDGE_MODEL`).
    #[serde(default = "default_openai_judge_model")]
    pub openai_judge_model: String,
    /// Sampling temperature for the judge model (`OPENAI_JUDGE_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_openai_judge_temperature")]
    pub openai_judge_temperature: f32,
    /// Max output tokens for the judge verdict (`OPENAI_JUDGE_MAX_TOKENS`).
    #[serde(default = "default_openai_judge_max_tokens")]
    pub openai_judge_max_tokens: u32,
    /// Optional custom judge directive to override the default (`JUDGE_DIRECTIVE`).
    #[serde(default = "default_judge_directive")]
    pub judge_directive: String,
    /// The bot's own user ID on the chat platform (`BOT_USER_ID`).
    #[serde(default)]
    pub bot_user_id: String,
    /// Database endpoint URL (`DB_ENDPOINT`), e.g. `mem://` or `ws://localhost:8000`.
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`). Remote endpoints only.
    #[serde(default)]
    pub db_username: String,
    /// Database password (`DB_PASSWORD`). Remote endpoints only.
    #[serde(default)]
    pub db_password: String,
    /// Database namespace (`DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
    /// Routing options (`DISPATCH__*`).
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Which auto-trigger runs after the private and nickname checks.
///
/// The two are mutually exclusive; a deployment picks one.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPolicy {
    /// Ask the reply judge.
    #[default]
    Judge,
    /// Roll against `random_reply_probability`.
    Random,
}

/// Which stored nickname is merged into the trigger set.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NickNameSource {
    /// What the bot calls the user.
    #[default]
    User,
    /// What the user calls the bot.
    Bot,
}

/// Options that drive message triage.
#[serde_as]
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DispatchConfig {
    /// Enables the judge-backed auto-reply path.
    pub enable_auto_reply: bool,
    /// Messages longer than this (in characters) are never auto-replied to.
    pub max_tokens: usize,
    /// Probability, in `[0, 1]`, that the random trigger fires.
    pub random_reply_probability: f64,
    /// Messages must be longer than this (in characters) for the random trigger.
    pub random_min_tokens: usize,
    /// Enables the nickname trigger.
    pub nick_name_enabled: bool,
    /// Static trigger names.
    pub nick_name_list: Vec<String>,
    /// Words that veto the nickname trigger.
    pub nick_name_block_words: Vec<String>,
    /// Enables replies in direct conversations.
    pub private_enabled: bool,
    /// Enables the favorability subsystem (required for the warning list).
    pub favorability_enabled: bool,
    /// Enables the warning-list side effect.
    pub warning_enabled: bool,
    /// Channel whose messages feed the warning list.
    pub warning_channel_id: String,
    /// The active auto-trigger.
    pub trigger_policy: TriggerPolicy,
    /// Deadline for the judge call. Expiry counts as "do not reply".
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "judge_timeout_secs")]
    pub judge_timeout: Duration,
    /// Profile item whose metadata holds the per-user nickname.
    pub nick_name_item_key: String,
    /// Which stored nickname joins the trigger set.
    pub nick_name_source: NickNameSource,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enable_auto_reply: false,
            max_tokens: default_max_tokens(),
            random_reply_probability: 0.0,
            random_min_tokens: default_random_min_tokens(),
            nick_name_enabled: false,
            nick_name_list: Vec::new(),
            nick_name_block_words: Vec::new(),
            private_enabled: false,
            favorability_enabled: false,
            warning_enabled: false,
            warning_channel_id: String::new(),
            trigger_policy: TriggerPolicy::default(),
            judge_timeout: default_judge_timeout(),
            nick_name_item_key: default_nick_name_item_key(),
            nick_name_source: NickNameSource::default(),
        }
    }
}

impl DispatchConfig {
    /// Whether the warning-list side effect should see messages from `channel_id`.
    pub fn watches_warning_channel(&self, channel_id: &str) -> bool {
        self.favorability_enabled && self.warning_enabled && !self.warning_channel_id.is_empty() && self.warning_channel_id == channel_id
    }

    pub fn validate(&self) -> Res<()> {
        if !(0.0..=1.0).contains(&self.random_reply_probability) {
            return Err(anyhow::anyhow!("Random reply probability must be between 0 and 1."));
        }

        if self.judge_timeout.is_zero() {
            return Err(anyhow::anyhow!("Judge timeout must be at least one second."));
        }

        Ok(())
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let env = config::Environment::default()
            .prefix("CHAT_TRIAGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("dispatch.nick_name_list")
            .with_list_parse_key("dispatch.nick_name_block_words");

        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // Environment variables take precedence over the file.
        cfg = cfg.add_source(env);

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    pub fn validate(&self) -> Res<()> {
        if self.openai_judge_temperature < 0.0 || self.openai_judge_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI judge temperature must be between 0 and 2."));
        }

        if self.openai_judge_max_tokens < 1 {
            return Err(anyhow::anyhow!("OpenAI judge max tokens must be at least 1."));
        }

        self.dispatch.validate()
    }
}
