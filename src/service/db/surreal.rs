//! SurrealDB implementation for chat-triage data storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{debug, info, instrument, warn};

use crate::base::{
    config::Config,
    types::{InboundMessage, Res, UserProfile, Void},
};

use super::{DbClient, GenericDbClient};

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the database named by the configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(config).await?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Creates a client backed by a fresh in-memory database.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::memory().await?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Tables.

const USER_TABLE: &str = "user";

/// Append-only tables written by the bookkeeping side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTable {
    ChannelMemory,
    BroadcastSeed,
    Warning,
}

impl LogTable {
    pub fn as_str(self) -> &'static str {
        match self {
            LogTable::ChannelMemory => "channel_memory",
            LogTable::BroadcastSeed => "broadcast_seed",
            LogTable::Warning => "warning",
        }
    }
}

/// A message captured by one of the bookkeeping tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub channel_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    fn from_message(message: &InboundMessage) -> Self {
        Self {
            channel_id: message.channel_id.clone(),
            user_id: message.user_id.clone(),
            content: message.content.clone(),
            created_at: Utc::now(),
        }
    }
}

// Client.

/// SurrealDB client.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Create a new database client from the configuration.
    ///
    /// Credentials are only used for remote endpoints.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let db = any::connect(config.db_endpoint.as_str()).await?;

        if !config.db_username.is_empty() {
            db.signin(Root {
                username: &config.db_username,
                password: &config.db_password,
            })
            .await?;
        }

        Self::init(db, &config.db_namespace, &config.db_database).await
    }

    /// Create a new client backed by an in-memory database.
    pub async fn memory() -> Res<Self> {
        let db = any::connect("mem://").await?;
        Self::init(db, "chat", "triage").await
    }

    async fn init(db: Surreal<Any>, namespace: &str, database: &str) -> Res<Self> {
        db.use_ns(namespace).use_db(database).await?;

        // Define schemas.

        db.query(format!("DEFINE TABLE IF NOT EXISTS {USER_TABLE} SCHEMALESS")).await?;

        for table in [LogTable::ChannelMemory, LogTable::BroadcastSeed, LogTable::Warning] {
            let table = table.as_str();
            db.query(format!("DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS")).await?;
            db.query(format!("DEFINE INDEX IF NOT EXISTS {table}_channel ON {table} FIELDS channel_id")).await?;
        }

        info!("Database initialized successfully.");

        Ok(Self { db })
    }

    /// Lists the entries a bookkeeping table holds for a channel, oldest first.
    #[instrument(skip(self))]
    pub async fn list_entries(&self, table: LogTable, channel_id: &str) -> Res<Vec<LogEntry>> {
        let mut response = self
            .db
            .query(format!("SELECT channel_id, user_id, content, created_at FROM {} WHERE channel_id = $channel ORDER BY created_at", table.as_str()))
            .bind(("channel", channel_id.to_string()))
            .await?;

        let entries: Vec<LogEntry> = response.take(0)?;

        Ok(entries)
    }

    async fn append(&self, table: LogTable, message: &InboundMessage) -> Void {
        let entry = LogEntry::from_message(message);
        let _: Option<LogEntry> = self.db.create(table.as_str()).content(entry).await?;

        debug!("Appended message from `{}` to `{}`.", message.user_id, table.as_str());

        Ok(())
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn get_or_create_user(&self, user_id: &str, username: &str) -> Res<UserProfile> {
        let user: Option<UserProfile> = self.db.select((USER_TABLE, user_id)).await?;

        if let Some(user) = user {
            debug!("User `{}` found.", user_id);
            return Ok(user);
        }

        info!("User `{}` not found, creating a new one.", user_id);

        let created: Res<Option<UserProfile>> = self
            .db
            .create((USER_TABLE, user_id))
            .content(UserProfile::new(user_id, username))
            .await
            .map_err(Into::into);

        match created {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(anyhow::anyhow!("Failed to create user `{}`.", user_id)),
            Err(err) => {
                // Another message from the same user may have created the record first.
                warn!("Creating user `{}` failed, reading it back: {}", user_id, err);

                let user: Option<UserProfile> = self.db.select((USER_TABLE, user_id)).await?;
                user.ok_or(err)
            }
        }
    }

    #[instrument(skip_all)]
    async fn add_channel_memory(&self, message: &InboundMessage) -> Void {
        self.append(LogTable::ChannelMemory, message).await
    }

    #[instrument(skip_all)]
    async fn add_broadcast_seed(&self, message: &InboundMessage) -> Void {
        self.append(LogTable::BroadcastSeed, message).await
    }

    #[instrument(skip_all)]
    async fn add_warning(&self, message: &InboundMessage) -> Void {
        self.append(LogTable::Warning, message).await
    }
}
