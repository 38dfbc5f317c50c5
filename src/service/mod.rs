//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the collaborators the dispatcher calls into:
//! - Chat transport (line-delimited JSON)
//! - Database services (e.g., SurrealDB) for profiles and bookkeeping
//! - Reply judge (e.g., OpenAI)
//! - Reply handlers
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
pub mod judge;
pub mod reply;
