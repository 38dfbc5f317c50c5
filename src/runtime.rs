//! Runtime services and shared state for chat-triage.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction,
    service::{chat::ChatClient, db::DbClient, judge::JudgeClient, reply::ReplyClient},
    triage::Dispatcher,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the service clients, and the
/// dispatcher. It is designed to be trivially cloneable, allowing it to be
/// passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The reply judge instance.
    pub judge: JudgeClient,
    /// The chat transport instance.
    pub chat: ChatClient,
    /// The message dispatcher.
    pub dispatcher: Dispatcher,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the judge.
        let judge = JudgeClient::openai(&config);

        // Initialize the chat transport.
        let chat = ChatClient::stdio(&config);

        Ok(Self::from_parts(config, db, judge, chat))
    }

    /// Assemble a runtime from existing clients, relaying replies through `chat`.
    pub fn from_parts(config: Config, db: DbClient, judge: JudgeClient, chat: ChatClient) -> Self {
        let replies = ReplyClient::relay(chat.clone());
        let dispatcher = Dispatcher::new(config.dispatch.clone(), db.clone(), judge.clone(), replies);

        Self { config, db, judge, chat, dispatcher }
    }

    /// Process messages until the transport closes or Ctrl-C is received.
    ///
    /// Ctrl-C drops the in-flight dispatch.
    pub async fn start(&self) -> Void {
        info!("Listening for messages as `{}` ...", self.chat.bot_user_id());

        tokio::select! {
            result = self.run() => result,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Shutting down ...");
                Ok(())
            }
        }
    }

    /// Process messages, one at a time, until the transport closes.
    pub async fn run(&self) -> Void {
        while let Some(message) = self.chat.next_message().await? {
            interaction::inbound::handle_inbound(&message, &self.dispatcher).await;
        }

        info!("Chat transport closed.");

        Ok(())
    }
}
