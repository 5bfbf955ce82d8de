//! Request handling for support-triage-bot.
//!
//! This module provides the entry points that receive support messages:
//! - The A2A agent endpoint (chat-style and JSON-RPC `message/send`)
//! - The triage workflow endpoint
//! - Health and index endpoints
//!
//! Every entry point goes through the shared pipeline in [`triage`].

pub mod a2a;
pub mod json_rpc;
pub mod status;
pub mod triage;
pub mod workflow;
