//! Formatting of triage verdicts for the Telex integration.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::base::types::{PriorityLevel, TriageVerdict, VisualIndicator};

static RESPONSE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The serialized triage payload: the verdict plus presentation extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelexPayload {
    #[serde(flatten)]
    pub verdict: TriageVerdict,
    pub visual_indicator: VisualIndicator,
    pub timestamp: String,
    pub response_id: String,
}

/// A verdict formatted for display and for the chat-ops integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResponse {
    pub payload: TelexPayload,
    /// Pretty JSON rendering of `payload`.
    pub telex_response: String,
    /// Actions derived from the verdict's urgency and priority.
    pub actions: Vec<String>,
    /// Echo of the verdict's suggested actions.
    pub telex_actions: Vec<String>,
    pub visual_indicator: VisualIndicator,
    pub summary: String,
}

impl FormattedResponse {
    pub fn response_id(&self) -> &str {
        &self.payload.response_id
    }

    pub fn timestamp(&self) -> &str {
        &self.payload.timestamp
    }
}

/// Pick the indicator from the verdict itself; upstream verdicts are not assumed consistent.
pub fn visual_indicator(verdict: &TriageVerdict) -> VisualIndicator {
    if verdict.needs_urgent_triage || verdict.priority_level == PriorityLevel::High {
        VisualIndicator::Red
    } else if verdict.priority_level == PriorityLevel::Medium {
        VisualIndicator::Yellow
    } else {
        VisualIndicator::Green
    }
}

pub fn summary(verdict: &TriageVerdict) -> String {
    format!(
        "Priority: {} | Urgent: {} | Keywords: {}",
        verdict.priority_level.as_str().to_uppercase(),
        if verdict.needs_urgent_triage { "YES" } else { "NO" },
        verdict.keywords_found.len()
    )
}

/// Current time as an RFC 3339 UTC timestamp with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generate a response identifier, unique within a process run.
pub fn response_id() -> String {
    let sequence = RESPONSE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("tri_{}_{}", Utc::now().timestamp_millis(), sequence)
}

/// Format a verdict.
pub fn format(verdict: &TriageVerdict) -> FormattedResponse {
    let visual_indicator = visual_indicator(verdict);

    let payload = TelexPayload {
        verdict: verdict.clone(),
        visual_indicator,
        timestamp: timestamp(),
        response_id: response_id(),
    };

    // Serializing plain strings, bools and vectors cannot fail.
    let telex_response = serde_json::to_string_pretty(&payload).unwrap_or_default();

    FormattedResponse {
        payload,
        telex_response,
        actions: verdict.priority_level.actions(verdict.needs_urgent_triage),
        telex_actions: verdict.suggested_actions.clone(),
        visual_indicator,
        summary: summary(verdict),
    }
}

// Tests.
