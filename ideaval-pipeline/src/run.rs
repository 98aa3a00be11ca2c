use crate::StageKind;
use chrono::{DateTime, Utc};
use ideaval_core::{CoreConcept, MarketAnalysis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown when the report stage returns nothing.
pub const NO_REPORT_MESSAGE: &str = "No content was returned by the validator.";

/// What a caller of `validate` gets back: a report or a short failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Report { markdown: String },
    Failed { stage: StageKind, message: String },
    NoReport,
}

impl ValidationOutcome {
    pub(crate) fn concept_failed(idea: &str) -> Self {
        Self::Failed {
            stage: StageKind::CoreConcept,
            message: format!("Could not extract the core concept of the app idea: {idea}"),
        }
    }

    pub(crate) fn market_failed() -> Self {
        Self::Failed {
            stage: StageKind::MarketAnalysis,
            message: "Could not obtain the market analysis for the app idea".to_string(),
        }
    }

    pub fn is_report(&self) -> bool {
        matches!(self, Self::Report { .. })
    }

    pub fn report(&self) -> Option<&str> {
        match self {
            Self::Report { markdown } => Some(markdown),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Report { .. } => "report",
            Self::Failed { .. } => "failed",
            Self::NoReport => "no_report",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report { markdown } => f.write_str(markdown),
            Self::Failed { message, .. } => f.write_str(message),
            Self::NoReport => f.write_str(NO_REPORT_MESSAGE),
        }
    }
}

/// Everything one run produced, in stage order.
///
/// Results of stages that never ran, or produced nothing, stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: String,
    pub idea: String,
    pub core_concept: Option<CoreConcept>,
    pub market_analysis: Option<MarketAnalysis>,
    pub competitor_review: Option<String>,
    pub outcome: ValidationOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineRun {
    pub(crate) fn start(run_id: String, idea: &str) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            idea: idea.to_string(),
            core_concept: None,
            market_analysis: None,
            competitor_review: None,
            outcome: ValidationOutcome::NoReport,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(&mut self, outcome: ValidationOutcome) {
        self.outcome = outcome;
        self.finished_at = Utc::now();
    }

    /// Stages that produced a result during this run.
    pub fn completed_stages(&self) -> Vec<StageKind> {
        let mut stages = Vec::new();
        if self.core_concept.is_some() {
            stages.push(StageKind::CoreConcept);
        }
        if self.market_analysis.is_some() {
            stages.push(StageKind::MarketAnalysis);
        }
        if self.competitor_review.is_some() {
            stages.push(StageKind::CompetitorReview);
        }
        if self.outcome.is_report() {
            stages.push(StageKind::Report);
        }
        stages
    }
}
