use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Messages.

/// A structured element of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text {
        content: String,
    },
    /// A mention of another participant (`at` on most platforms).
    #[serde(alias = "at")]
    Mention {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    File {
        #[serde(default)]
        src: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// One incoming chat message, immutable for the duration of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw text content.
    pub content: String,
    /// Structured elements, in order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// The sender.
    pub user_id: String,
    /// The sender's display name, if the transport provides one.
    #[serde(default)]
    pub username: Option<String>,
    /// The channel (or group) the message arrived in.
    pub channel_id: String,
    /// Set by transports that know whether the session is a direct conversation.
    #[serde(default)]
    pub is_direct: Option<bool>,
    /// Session subtype for transports without a direct flag (e.g. `private`, `group`).
    #[serde(default)]
    pub subtype: Option<String>,
    /// The responding agent's own user ID.
    pub self_id: String,
}

impl InboundMessage {
    /// Whether the agent itself sent this message.
    pub fn is_from_self(&self) -> bool {
        self.user_id == self.self_id
    }

    /// Whether any mention element targets the agent.
    pub fn mentions_self(&self) -> bool {
        self.elements.iter().any(|e| matches!(e, Element::Mention { id, .. } if *id == self.self_id))
    }

    /// Content length, counted in characters.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

// Triage results.

/// Coarse message label computed before routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// Media, links, or protocol noise. Never a conversational prompt.
    Special,
    Ordinary,
}

impl MessageClass {
    pub fn is_special(self) -> bool {
        self == MessageClass::Special
    }
}

/// The reply path selected for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Random,
    NickName,
    Private,
    AutoReply,
}

/// The terminal result of triaging one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled(HandlerKind),
    PassThrough,
}

/// What a reply handler hands to the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub kind: HandlerKind,
    pub channel_id: String,
    pub user_id: String,
    pub content: String,
}

// Profiles.

/// Metadata attached to a profile item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileItemMetadata {
    #[serde(default)]
    pub user_nickname: Option<String>,
    #[serde(default)]
    pub bot_nickname: Option<String>,
}

/// An item held in a user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileItem {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub metadata: Option<ProfileItemMetadata>,
}

/// A user's profile, as owned by the profile store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub items: BTreeMap<String, ProfileItem>,
}

impl UserProfile {
    /// A fresh profile with no items.
    pub fn new(user_id: &str, username: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.to_string(),
            items: BTreeMap::new(),
        }
    }

    /// Metadata stored under `item_key`, if any.
    pub fn item_metadata(&self, item_key: &str) -> Option<&ProfileItemMetadata> {
        self.items.get(item_key).and_then(|item| item.metadata.as_ref())
    }
}
