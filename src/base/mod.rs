//! Core components, types, and utilities for chat-triage.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System prompts for the reply judge.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
