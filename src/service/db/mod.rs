pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{InboundMessage, Res, UserProfile, Void};

// Traits.

/// Generic database client trait that clients must implement.
///
/// This trait covers the profile lookup used by the nickname trigger and the
/// bookkeeping side effects that run before routing. Implementing this trait
/// allows different database backends to be used with chat-triage.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets the user's profile by ID; or, creates a default profile if it doesn't exist.
    ///
    /// Safe to call once per message; repeated calls return the same record.
    async fn get_or_create_user(&self, user_id: &str, username: &str) -> Res<UserProfile>;

    /// Appends the message to its channel's conversational memory.
    async fn add_channel_memory(&self, message: &InboundMessage) -> Void;

    /// Records the message as a candidate seed for broadcasts.
    async fn add_broadcast_seed(&self, message: &InboundMessage) -> Void;

    /// Records the message on the warning list.
    async fn add_warning(&self, message: &InboundMessage) -> Void;
}

// Structs.

/// Database client for chat-triage.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
