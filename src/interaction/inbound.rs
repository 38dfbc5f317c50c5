//! Handles one inbound message from the chat transport.

use tracing::{error, info, instrument};

use crate::{
    base::types::{DispatchOutcome, InboundMessage},
    triage::Dispatcher,
};

/// Dispatches the message and logs the result.
///
/// A dispatch failure is logged and swallowed so the next message is still
/// processed.
#[instrument(skip_all, fields(channel_id = %message.channel_id))]
pub async fn handle_inbound(message: &InboundMessage, dispatcher: &Dispatcher) {
    match dispatcher.dispatch(message).await {
        Ok(DispatchOutcome::PassThrough) => info!("Passed through."),
        Ok(DispatchOutcome::Handled(_)) => {}
        Err(err) => error!("Error while handling: {:#}", err),
    }
}
