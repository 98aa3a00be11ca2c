use crate::context::{CompetitorInput, IdeaInput, MarketInput, ReportInput};
use crate::{PipelineRun, Stage, StageKind, ValidationOutcome};
use chrono::Local;
use ideaval_core::{CoreConcept, IdeaError, MarketAnalysis, Result, TextGenerator, WebLookup};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;

/// Validates app ideas through four dependent stages.
///
/// 1. core concept (shaped, fatal when absent)
/// 2. market analysis (shaped, lookup, fatal when absent)
/// 3. competitor review (free text, lookup, optional)
/// 4. report (free text), returned as-is
///
/// Stages run strictly in sequence; each one's input is built from the
/// previous one's output.
pub struct ValidationPipeline {
    generator: Arc<dyn TextGenerator>,
    core_concept: Stage,
    market_analysis: Stage,
    competitor_review: Stage,
    report: Stage,
    add_datetime_to_instructions: bool,
}

impl ValidationPipeline {
    pub fn builder() -> ValidationPipelineBuilder {
        ValidationPipelineBuilder::new()
    }

    /// Pipeline with default instructions and no lookup.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            core_concept: Stage::new(StageKind::CoreConcept),
            market_analysis: Stage::new(StageKind::MarketAnalysis),
            competitor_review: Stage::new(StageKind::CompetitorReview),
            report: Stage::new(StageKind::Report),
            add_datetime_to_instructions: false,
        }
    }

    pub fn stage(&self, kind: StageKind) -> &Stage {
        match kind {
            StageKind::CoreConcept => &self.core_concept,
            StageKind::MarketAnalysis => &self.market_analysis,
            StageKind::CompetitorReview => &self.competitor_review,
            StageKind::Report => &self.report,
        }
    }

    /// Validate an idea and return the report or a failure message.
    pub async fn validate(&self, idea: &str) -> ValidationOutcome {
        self.run(uuid::Uuid::new_v4().to_string(), idea).await.outcome
    }

    /// Validate an idea and keep every intermediate result, e.g. for persisting.
    pub async fn run(&self, run_id: impl Into<String>, idea: &str) -> PipelineRun {
        let mut run = PipelineRun::start(run_id.into(), idea);
        let span = ideaval_telemetry::pipeline_run_span(&run.run_id);

        let outcome = self.execute(&mut run).instrument(span).await;
        tracing::info!(run_id = %run.run_id, status = outcome.status(), "validation finished");
        run.finish(outcome);
        run
    }

    async fn execute(&self, run: &mut PipelineRun) -> ValidationOutcome {
        let idea = run.idea.clone();
        let generator = self.generator.as_ref();
        let now = self
            .add_datetime_to_instructions
            .then(|| Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string());
        let now = now.as_deref();

        tracing::info!(idea = %idea, "generating report");

        let Some(core_concept) = self
            .core_concept
            .run_shaped::<CoreConcept>(generator, &IdeaInput { app_idea: &idea }, now)
            .await
        else {
            return ValidationOutcome::concept_failed(&idea);
        };
        run.core_concept = Some(core_concept.clone());

        let Some(market_analysis) = self
            .market_analysis
            .run_shaped::<MarketAnalysis>(
                generator,
                &MarketInput { app_idea: &idea, core_concept: &core_concept },
                now,
            )
            .await
        else {
            return ValidationOutcome::market_failed();
        };
        run.market_analysis = Some(market_analysis.clone());

        let competitor_review = self
            .competitor_review
            .run_text(
                generator,
                &CompetitorInput { app_idea: &idea, market_analysis: &market_analysis },
                now,
            )
            .await;
        if competitor_review.is_none() {
            tracing::info!("continuing without competitor review");
        }
        run.competitor_review = competitor_review.clone();

        let report_input = ReportInput {
            app_idea: &idea,
            core_concept: &core_concept,
            market_analysis: &market_analysis,
            competitor_review: competitor_review.as_deref(),
        };
        match self.report.run_text(generator, &report_input, now).await {
            Some(markdown) => ValidationOutcome::Report { markdown },
            None => ValidationOutcome::NoReport,
        }
    }
}

/// Builder for [`ValidationPipeline`].
///
/// ```rust,ignore
/// let pipeline = ValidationPipeline::builder()
///     .generator(Arc::new(model))
///     .lookup(Arc::new(search))
///     .add_datetime_to_instructions(true)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ValidationPipelineBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    lookup: Option<Arc<dyn WebLookup>>,
    instructions: HashMap<StageKind, Vec<String>>,
    add_datetime_to_instructions: bool,
}

impl ValidationPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Lookup granted to the market analysis and competitor review stages.
    pub fn lookup(mut self, lookup: Arc<dyn WebLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn lookup_opt(mut self, lookup: Option<Arc<dyn WebLookup>>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Replace the default instructions of one stage.
    pub fn instructions<I, S>(mut self, kind: StageKind, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions.insert(kind, instructions.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_datetime_to_instructions(mut self, enabled: bool) -> Self {
        self.add_datetime_to_instructions = enabled;
        self
    }

    pub fn build(mut self) -> Result<ValidationPipeline> {
        let generator = self
            .generator
            .ok_or_else(|| IdeaError::Config("a text generator is required".to_string()))?;

        let mut stage = |kind: StageKind| {
            let mut stage = Stage::new(kind);
            if let Some(instructions) = self.instructions.remove(&kind) {
                stage = stage.with_instructions(instructions);
            }
            if let Some(lookup) = &self.lookup {
                stage = stage.with_lookup(Arc::clone(lookup));
            }
            stage
        };

        Ok(ValidationPipeline {
            core_concept: stage(StageKind::CoreConcept),
            market_analysis: stage(StageKind::MarketAnalysis),
            competitor_review: stage(StageKind::CompetitorReview),
            report: stage(StageKind::Report),
            generator,
            add_datetime_to_instructions: self.add_datetime_to_instructions,
        })
    }
}
