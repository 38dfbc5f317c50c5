//! Nickname trigger resolution.

use tracing::{debug, instrument};

use crate::{
    base::{
        config::{DispatchConfig, NickNameSource},
        types::{InboundMessage, Res, UserProfile},
    },
    service::db::DbClient,
};

use super::prompt::normalize_prompt;

/// Merge the static trigger names with a stored per-user nickname.
///
/// Returns a new list; blank names and duplicates are dropped, order is kept.
pub fn merge_nicknames(static_names: &[String], stored: Option<&str>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(static_names.len() + 1);

    for name in static_names.iter().map(String::as_str).chain(stored) {
        if !name.is_empty() && !merged.iter().any(|existing| existing == name) {
            merged.push(name.to_string());
        }
    }

    merged
}

/// The nickname the profile stores under the configured item and source.
pub fn stored_nickname<'a>(profile: &'a UserProfile, config: &DispatchConfig) -> Option<&'a str> {
    let metadata = profile.item_metadata(&config.nick_name_item_key)?;

    let nickname = match config.nick_name_source {
        NickNameSource::User => metadata.user_nickname.as_deref(),
        NickNameSource::Bot => metadata.bot_nickname.as_deref(),
    };

    nickname.filter(|name| !name.is_empty())
}

/// Whether `content` contains any non-empty block word.
pub fn contains_block_word(content: &str, block_words: &[String]) -> bool {
    block_words.iter().any(|word| !word.is_empty() && content.contains(word.as_str()))
}

/// Whether the message calls the bot by name or mentions it directly.
///
/// Block words and messages sent by the bot itself reject before the profile
/// lookup. Name matching is case-sensitive containment against the normalized
/// prompt. A profile store failure is returned as an error.
#[instrument(skip_all, fields(user_id = %message.user_id))]
pub async fn matches_nickname(message: &InboundMessage, config: &DispatchConfig, db: &DbClient) -> Res<bool> {
    if message.is_from_self() {
        return Ok(false);
    }

    if contains_block_word(&message.content, &config.nick_name_block_words) {
        debug!("Nickname trigger vetoed by a block word.");
        return Ok(false);
    }

    let username = message.username.as_deref().unwrap_or_default();
    let profile = db.get_or_create_user(&message.user_id, username).await?;
    let names = merge_nicknames(&config.nick_name_list, stored_nickname(&profile, config));

    let prompt = normalize_prompt(&message.content, &message.self_id);

    Ok(message.mentions_self() || names.iter().any(|name| prompt.contains(name.as_str())))
}
