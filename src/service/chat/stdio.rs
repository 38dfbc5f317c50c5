//! Line-delimited JSON chat transport.
//!
//! Each input line is one serialized [`InboundMessage`]; each reply is written
//! as one serialized [`ReplyRequest`] line. Hosts pipe their platform events
//! through this transport.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines},
    sync::Mutex,
};
use tracing::{instrument, warn};

use crate::base::{
    config::Config,
    types::{InboundMessage, ReplyRequest, Res, Void},
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the line implementation.

impl ChatClient {
    /// Creates a chat client that reads stdin and writes stdout.
    pub fn stdio(config: &Config) -> Self {
        let client = LineChatClient::new(config.bot_user_id.clone(), BufReader::new(tokio::io::stdin()), tokio::io::stdout());
        Self::new(Arc::new(client))
    }
}

/// Chat client over any line-oriented reader and writer.
pub struct LineChatClient<R, W> {
    bot_user_id: String,
    reader: Mutex<Lines<R>>,
    writer: Mutex<W>,
}

impl<R, W> LineChatClient<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(bot_user_id: String, reader: R, writer: W) -> Self {
        Self {
            bot_user_id,
            reader: Mutex::new(reader.lines()),
            writer: Mutex::new(writer),
        }
    }

    /// Consume the client, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<R, W> GenericChatClient for LineChatClient<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    #[instrument(skip_all)]
    async fn next_message(&self) -> Res<Option<InboundMessage>> {
        let mut reader = self.reader.lock().await;

        while let Some(line) = reader.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let mut message: InboundMessage = match serde_json::from_str(&line) {
                Ok(message) => message,
                Err(err) => {
                    warn!("Skipping malformed message line: {}", err);
                    continue;
                }
            };

            // Transports may leave the bot's own ID implicit.
            if message.self_id.is_empty() {
                message.self_id = self.bot_user_id.clone();
            }

            return Ok(Some(message));
        }

        Ok(None)
    }

    #[instrument(skip(self))]
    async fn send_reply(&self, request: &ReplyRequest) -> Void {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;

        Ok(())
    }
}
