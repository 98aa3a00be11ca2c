use crate::context::StageContext;
use ideaval_core::{
    GenerationRequest, ResponseSchema, StageError, StageRecord, TextGenerator, WebLookup,
};
use ideaval_core::{CoreConcept, MarketAnalysis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    CoreConcept,
    MarketAnalysis,
    CompetitorReview,
    Report,
}

impl StageKind {
    pub const ALL: [StageKind; 4] = [
        StageKind::CoreConcept,
        StageKind::MarketAnalysis,
        StageKind::CompetitorReview,
        StageKind::Report,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::CoreConcept => "core_concept",
            StageKind::MarketAnalysis => "market_analysis",
            StageKind::CompetitorReview => "competitor_review",
            StageKind::Report => "report",
        }
    }

    pub fn default_instructions(self) -> Vec<String> {
        let lines: &[&str] = match self {
            StageKind::CoreConcept => &[
                "Analyze the app idea and clarify its core concept.",
                "Identify the main problem, the innovative features and the technical and operational feasibility of the app.",
            ],
            StageKind::MarketAnalysis => &[
                "Conduct market research, estimate the total addressable market, identify user segments and analyze trends.",
            ],
            StageKind::CompetitorReview => &[
                "Identify direct competitors and analyze their strengths, weaknesses, opportunities and threats (SWOT).",
            ],
            StageKind::Report => &[
                "Generate a detailed report of the analyses performed, including the total addressable market, user segments, competitors, competitive advantages and recommendations.",
            ],
        };
        lines.iter().map(|line| (*line).to_string()).collect()
    }

    fn response_schema(self) -> Option<ResponseSchema> {
        match self {
            StageKind::CoreConcept => Some(CoreConcept::response_schema()),
            StageKind::MarketAnalysis => Some(MarketAnalysis::response_schema()),
            StageKind::CompetitorReview | StageKind::Report => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of the pipeline: instructions, expected shape and lookup grant.
///
/// Shaped stages (concept, market) request a JSON record; research stages
/// (market, competitors) may be granted a lookup; free-text stages
/// (competitors, report) ask for markdown.
#[derive(Clone)]
pub struct Stage {
    kind: StageKind,
    instructions: Vec<String>,
    response_schema: Option<ResponseSchema>,
    lookup: Option<Arc<dyn WebLookup>>,
}

impl Stage {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            instructions: kind.default_instructions(),
            response_schema: kind.response_schema(),
            lookup: None,
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Grant lookup access. Ignored for stages that never research.
    pub fn with_lookup(mut self, lookup: Arc<dyn WebLookup>) -> Self {
        if matches!(self.kind, StageKind::MarketAnalysis | StageKind::CompetitorReview) {
            self.lookup = Some(lookup);
        }
        self
    }

    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn is_shaped(&self) -> bool {
        self.response_schema.is_some()
    }

    fn request(&self, context: String, now: Option<&str>) -> GenerationRequest {
        let mut instructions = self.instructions.clone();
        if self.is_shaped() {
            instructions
                .push("Respond only with a JSON object matching the requested schema.".to_string());
        } else {
            instructions.push("Format your answer as markdown.".to_string());
        }
        if let Some(now) = now {
            instructions.push(format!("The current time is {now}."));
        }

        let mut request = GenerationRequest::new(context).with_instructions(instructions);
        if let Some(schema) = &self.response_schema {
            request = request.with_response_schema(schema.clone());
        }
        if let Some(lookup) = &self.lookup {
            request = request.with_lookup(Arc::clone(lookup));
        }
        request
    }

    /// Run the generation and return its non-blank content.
    pub async fn generate(
        &self,
        generator: &dyn TextGenerator,
        context: &dyn StageContext,
        now: Option<&str>,
    ) -> Result<String, StageError> {
        let rendered = context
            .render()
            .map_err(|e| StageError::Generation(ideaval_core::IdeaError::Serde(e)))?;
        let response = generator
            .generate(self.request(rendered, now))
            .await
            .map_err(StageError::Generation)?;

        response.text().map(str::to_string).ok_or(StageError::EmptyContent)
    }

    /// Free-text stage: any failure becomes `None`.
    pub async fn run_text(
        &self,
        generator: &dyn TextGenerator,
        context: &dyn StageContext,
        now: Option<&str>,
    ) -> Option<String> {
        let span = ideaval_telemetry::stage_span(self.kind.name());
        async { self.settle(self.generate(generator, context, now).await) }.instrument(span).await
    }

    /// Shaped stage: the content must parse into `T`; a mismatch counts as no result.
    pub async fn run_shaped<T: StageRecord>(
        &self,
        generator: &dyn TextGenerator,
        context: &dyn StageContext,
        now: Option<&str>,
    ) -> Option<T> {
        let span = ideaval_telemetry::stage_span(self.kind.name());
        async {
            let outcome = match self.generate(generator, context, now).await {
                Ok(content) => T::parse(&content),
                Err(e) => Err(e),
            };
            self.settle(outcome)
        }
        .instrument(span)
        .await
    }

    fn settle<T>(&self, outcome: Result<T, StageError>) -> Option<T> {
        match outcome {
            Ok(value) => {
                tracing::debug!(stage = self.kind.name(), "stage completed");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(stage = self.kind.name(), error = %e, "stage produced no result");
                None
            }
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("kind", &self.kind)
            .field("instructions", &self.instructions)
            .field("shaped", &self.is_shaped())
            .field("lookup", &self.lookup.as_ref().map(|l| l.name().to_string()))
            .finish()
    }
}
