//! Support message triage.
//!
//! - `keywords`: the deterministic keyword classifier.
//! - `format`: turning a verdict into a display-ready response.
//! - `strategy`: the LLM-or-fallback classification chain.

pub mod format;
pub mod keywords;
pub mod strategy;

pub use format::{FormattedResponse, TelexPayload, format};
pub use keywords::{KeywordMatches, KeywordSet};
pub use strategy::{Triage, TriageDispatcher, TriageStrategy};
