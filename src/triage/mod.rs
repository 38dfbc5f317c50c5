//! Message triage: deciding whether, and how, the bot replies to a message.
//!
//! - `classifier` labels a message special or ordinary.
//! - `session` tells private conversations from group ones.
//! - `nickname` resolves the nickname trigger.
//! - `gate` holds the judge-backed auto-reply gate and the random trigger.
//! - `observer` runs the bookkeeping side effects.
//! - `dispatcher` ties them together in priority order.

pub mod classifier;
pub mod dispatcher;
pub mod gate;
pub mod nickname;
pub mod observer;
pub mod prompt;
pub mod session;

pub use dispatcher::Dispatcher;
