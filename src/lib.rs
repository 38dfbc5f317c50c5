//! Library root for `chat-triage`.
//!
//! Chat-triage decides, for each incoming chat message, whether a bot should
//! reply and which single reply path handles it:
//! - Direct conversations go to the private path
//! - Group messages that name or mention the bot go to the nickname path
//! - Anything else may still get an unprompted reply, gated by an LLM judge
//!   (or, alternatively, a random trigger)
//! - Everything else passes through untouched
//!
//! Storage, the judge, the chat transport, and the reply handlers sit behind
//! traits, so each can be swapped out (or mocked) independently.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod triage;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the chat-triage runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with database, judge, and chat clients
/// - Starts the main loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting chat-triage ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the rustls crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
