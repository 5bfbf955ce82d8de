//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the support-triage-bot:
//! - LLM services (e.g., OpenAI), backing the primary triage strategy
//! - The HTTP server exposing the A2A endpoints
//!
//! The LLM service defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod llm;
pub mod server;
