//! Deterministic keyword triage.
//!
//! Messages are matched case-insensitively against three ordered keyword buckets
//! (high, medium, low).  Matching is plain substring search, so multi-word
//! entries like "not working" work as-is.

use tracing::{debug, instrument};

use crate::base::types::{PriorityLevel, TriageVerdict};

const HIGH_PRIORITY_KEYWORDS: &[&str] = &["broken", "crash", "emergency", "urgent", "not working", "error", "failed", "down", "critical", "outage"];
const MEDIUM_PRIORITY_KEYWORDS: &[&str] = &["issue", "problem", "help", "question", "how to", "stuck", "trouble", "not sure", "confused", "slow"];
const LOW_PRIORITY_KEYWORDS: &[&str] = &["thanks", "thank you", "feature", "suggestion", "idea", "maybe", "when", "can you", "would like"];

/// The three keyword buckets, each in declared (match reporting) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(to_owned(HIGH_PRIORITY_KEYWORDS), to_owned(MEDIUM_PRIORITY_KEYWORDS), to_owned(LOW_PRIORITY_KEYWORDS))
    }
}

impl KeywordSet {
    /// Create a keyword set.  Keywords are lower-cased; blank entries are dropped since they
    /// would match every message.
    pub fn new(high: Vec<String>, medium: Vec<String>, low: Vec<String>) -> Self {
        Self {
            high: normalize(high),
            medium: normalize(medium),
            low: normalize(low),
        }
    }

    /// Find the keywords of every bucket present in `message`.
    pub fn detect(&self, message: &str) -> KeywordMatches {
        let message = message.to_lowercase();

        KeywordMatches {
            high: matches_in(&self.high, &message),
            medium: matches_in(&self.medium, &message),
            low: matches_in(&self.low, &message),
        }
    }

    /// Classify a message into a triage verdict.
    #[instrument(name = "KeywordSet::classify", skip_all)]
    pub fn classify(&self, message: &str) -> TriageVerdict {
        let matches = self.detect(message);

        debug!(
            high = matches.high.len(),
            medium = matches.medium.len(),
            low = matches.low.len(),
            urgency_score = matches.urgency_score(),
            "Keyword detection complete"
        );

        matches.into_verdict()
    }
}

/// Per-bucket keyword matches for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatches {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

impl KeywordMatches {
    /// All matches: high, then medium, then low.
    pub fn all(&self) -> Vec<String> {
        self.high.iter().chain(&self.medium).chain(&self.low).cloned().collect()
    }

    pub fn priority_level(&self) -> PriorityLevel {
        PriorityLevel::resolve(self.high.len(), self.medium.len())
    }

    /// A 0 to 10 urgency score driven by the highest matching bucket.
    pub fn urgency_score(&self) -> f32 {
        let score = if !self.high.is_empty() {
            8.0 + self.high.len() as f32 * 0.5
        } else if !self.medium.is_empty() {
            4.0 + self.medium.len() as f32 * 0.3
        } else if !self.low.is_empty() {
            1.0 + self.low.len() as f32 * 0.1
        } else {
            0.0
        };

        score.min(10.0)
    }

    pub fn reason(&self) -> String {
        format!("Found keywords: high=[{}], medium=[{}], low=[{}]", self.high.join(", "), self.medium.join(", "), self.low.join(", "))
    }

    pub fn into_verdict(self) -> TriageVerdict {
        let needs_urgent_triage = !self.high.is_empty();
        let priority_level = self.priority_level();

        TriageVerdict {
            needs_urgent_triage,
            priority_level,
            suggested_actions: priority_level.actions(needs_urgent_triage),
            reason: self.reason(),
            keywords_found: self.all(),
        }
    }
}

fn to_owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

fn normalize(keywords: Vec<String>) -> Vec<String> {
    keywords.into_iter().map(|k| k.to_lowercase()).filter(|k| !k.trim().is_empty()).collect()
}

fn matches_in(keywords: &[String], lowered_message: &str) -> Vec<String> {
    keywords.iter().filter(|k| lowered_message.contains(k.as_str())).cloned().collect()
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::{ACTION_GREEN_CIRCLE_REACTION, ACTION_RED_CIRCLE_REACTION, ACTION_URGENT_THREAD_REPLY};

    fn classify(message: &str) -> TriageVerdict {
        KeywordSet::default().classify(message)
    }

    #[test]
    fn test_no_keywords_is_low() {
        let verdict = classify("The weather is nice today");

        assert_eq!(verdict.priority_level, PriorityLevel::Low);
        assert!(!verdict.needs_urgent_triage);
        assert!(verdict.keywords_found.is_empty());
        assert_eq!(verdict.suggested_actions, vec![ACTION_GREEN_CIRCLE_REACTION.to_string()]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        for message in ["", "   \n\t"] {
            let verdict = classify(message);

            assert_eq!(verdict.priority_level, PriorityLevel::Low);
            assert!(verdict.keywords_found.is_empty());
            assert_eq!(verdict.reason, "Found keywords: high=[], medium=[], low=[]");
        }
    }

    #[test]
    fn test_broken_login_is_urgent() {
        let verdict = classify("Our system is broken and customers can't login");

        assert_eq!(verdict.priority_level, PriorityLevel::High);
        assert!(verdict.needs_urgent_triage);
        assert!(verdict.keywords_found.contains(&"broken".to_string()));
        assert_eq!(verdict.suggested_actions, vec![ACTION_RED_CIRCLE_REACTION.to_string(), ACTION_URGENT_THREAD_REPLY.to_string()]);
    }

    #[test]
    fn test_high_wins_over_medium_and_low() {
        let verdict = classify("URGENT: need help, thanks");

        assert_eq!(verdict.priority_level, PriorityLevel::High);
        assert!(verdict.needs_urgent_triage);
        assert_eq!(verdict.keywords_found, vec!["urgent", "help", "thanks"]);
    }

    #[test]
    fn test_medium_wins_over_low() {
        let verdict = classify("Thanks for the help, great feature idea");

        assert_eq!(verdict.priority_level, PriorityLevel::Medium);
        assert!(!verdict.needs_urgent_triage);
        assert_eq!(verdict.keywords_found, vec!["help", "thanks", "feature", "idea"]);
        assert_eq!(verdict.reason, "Found keywords: high=[], medium=[help], low=[thanks, feature, idea]");
    }

    #[test]
    fn test_password_reset_question_has_no_canonical_match() {
        // "How do I" is not "how to".
        let verdict = classify("How do I reset my password?");

        assert_eq!(verdict.priority_level, PriorityLevel::Low);
        assert!(verdict.keywords_found.is_empty());
    }

    #[test]
    fn test_how_to_phrase_is_medium() {
        let verdict = classify("How to reset my password?");

        assert_eq!(verdict.priority_level, PriorityLevel::Medium);
        assert_eq!(verdict.keywords_found, vec!["how to"]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify("URGENT issue"), classify("urgent issue"));
    }

    #[test]
    fn test_matches_follow_list_order_not_message_order() {
        let verdict = classify("the deploy failed with an error after a crash");

        assert_eq!(verdict.keywords_found, vec!["crash", "error", "failed"]);
    }

    #[test]
    fn test_overlapping_substrings_count_per_bucket() {
        let verdict = classify("thank you, thanks");

        assert_eq!(verdict.keywords_found, vec!["thanks", "thank you"]);
    }

    #[test]
    fn test_keywords_found_is_concatenation_of_buckets() {
        let matches = KeywordSet::default().detect("Emergency! The app is slow and I have an idea");

        assert_eq!(matches.all().len(), matches.high.len() + matches.medium.len() + matches.low.len());
        assert_eq!(matches.all(), vec!["emergency", "slow", "idea"]);
    }

    #[test]
    fn test_urgency_score() {
        let keywords = KeywordSet::default();

        assert_eq!(keywords.detect("nothing here").urgency_score(), 0.0);
        assert!((keywords.detect("great idea").urgency_score() - 1.1).abs() < 1e-6);
        assert!((keywords.detect("I have a problem").urgency_score() - 4.3).abs() < 1e-6);
        assert_eq!(keywords.detect("urgent").urgency_score(), 8.5);
        assert_eq!(keywords.detect("urgent emergency critical outage crash broken").urgency_score(), 10.0);
    }

    #[test]
    fn test_custom_keyword_set() {
        let keywords = KeywordSet::new(vec!["SEV1".to_string(), "  ".to_string()], vec![], vec!["kudos".to_string()]);

        assert_eq!(keywords.high, vec!["sev1".to_string()]);

        let verdict = keywords.classify("Sev1 declared, kudos to the team");

        assert_eq!(verdict.priority_level, PriorityLevel::High);
        assert_eq!(verdict.keywords_found, vec!["sev1", "kudos"]);
    }
}
