//! Core components, types, and utilities for the support-triage-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System directives for LLM interactions.
//! - Common types (the triage verdict and its parts) and result handling.

pub mod config;
pub mod prompts;
pub mod types;
