//! Event handling for chat-triage.
//!
//! This module connects inbound events from the chat transport to the
//! dispatcher, and keeps dispatch failures from taking the event loop down.

pub mod inbound;
