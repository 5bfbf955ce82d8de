//! Common types and result handling.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Action identifiers consumed by the chat-ops integration.

pub const ACTION_RED_CIRCLE_REACTION: &str = "add_red_circle_reaction";
pub const ACTION_URGENT_THREAD_REPLY: &str = "post_urgent_thread_reply";
pub const ACTION_YELLOW_CIRCLE_REACTION: &str = "add_yellow_circle_reaction";
pub const ACTION_STANDARD_THREAD_REPLY: &str = "post_standard_thread_reply";
pub const ACTION_GREEN_CIRCLE_REACTION: &str = "add_green_circle_reaction";

/// Priority assigned to a support message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

impl PriorityLevel {
    /// Precedence policy for simultaneous bucket matches: high beats medium, medium beats low.
    pub fn resolve(high_matches: usize, medium_matches: usize) -> Self {
        if high_matches > 0 {
            PriorityLevel::High
        } else if medium_matches > 0 {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Low => "low",
            PriorityLevel::Medium => "medium",
            PriorityLevel::High => "high",
        }
    }

    /// Suggested chat-ops actions for a verdict with this priority.
    ///
    /// Urgency wins over the level, since an upstream verdict may flag urgency without
    /// marking the message as high.
    pub fn actions(&self, needs_urgent_triage: bool) -> Vec<String> {
        let actions: &[&str] = if needs_urgent_triage {
            &[ACTION_RED_CIRCLE_REACTION, ACTION_URGENT_THREAD_REPLY]
        } else if *self == PriorityLevel::Medium {
            &[ACTION_YELLOW_CIRCLE_REACTION, ACTION_STANDARD_THREAD_REPLY]
        } else {
            &[ACTION_GREEN_CIRCLE_REACTION]
        };

        actions.iter().map(|a| a.to_string()).collect()
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured triage classification for a single message.
///
/// Verdicts handed to the formatter may omit the collection fields and `reason`; those
/// are treated as empty rather than rejected.  Model output is checked strictly by
/// [`crate::triage::strategy::parse_verdict`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageVerdict {
    pub needs_urgent_triage: bool,
    pub priority_level: PriorityLevel,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub keywords_found: Vec<String>,
}

impl TriageVerdict {
    /// The verdict reported when triage could not run at all.
    pub fn unavailable() -> Self {
        Self {
            needs_urgent_triage: false,
            priority_level: PriorityLevel::Low,
            suggested_actions: vec!["System temporarily unavailable".to_string()],
            reason: "An error occurred while processing your request".to_string(),
            keywords_found: Vec::new(),
        }
    }
}

/// Emoji indicator shown next to a triaged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualIndicator {
    #[serde(rename = "🔴")]
    Red,
    #[serde(rename = "🟡")]
    Yellow,
    #[serde(rename = "🟢")]
    Green,
}

impl VisualIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualIndicator::Red => "🔴",
            VisualIndicator::Yellow => "🟡",
            VisualIndicator::Green => "🟢",
        }
    }
}

impl fmt::Display for VisualIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
