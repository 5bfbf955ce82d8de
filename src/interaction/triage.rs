//! The triage pipeline shared by every entry point.

use std::time::Instant;

use tracing::{debug, instrument};

use crate::{
    base::types::Res,
    triage::{FormattedResponse, TriageDispatcher, format},
};

/// A triaged and formatted message.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub formatted: FormattedResponse,
    /// Name of the strategy that produced the verdict.
    pub strategy: &'static str,
    pub processing_time_ms: u64,
}

/// Classify a message and format the verdict.
#[instrument(skip_all, fields(message_len = message.len()))]
pub async fn run(dispatcher: &TriageDispatcher, message: &str) -> Res<TriageOutcome> {
    let start = Instant::now();

    let triage = dispatcher.triage(message).await?;
    let formatted = format(&triage.verdict);

    debug!("Triage summary: {}", formatted.summary);

    Ok(TriageOutcome {
        formatted,
        strategy: triage.strategy,
        processing_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base::types::VisualIndicator, triage::KeywordSet};

    #[tokio::test]
    async fn test_run_with_keyword_dispatcher() {
        let dispatcher = TriageDispatcher::standard(None, KeywordSet::default());

        let outcome = run(&dispatcher, "Production outage, everything is down").await.unwrap();

        assert_eq!(outcome.strategy, "keyword");
        assert_eq!(outcome.formatted.visual_indicator, VisualIndicator::Red);
        assert_eq!(outcome.formatted.summary, "Priority: HIGH | Urgent: YES | Keywords: 2");
    }
}
