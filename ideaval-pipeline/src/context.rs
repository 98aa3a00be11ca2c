//! Context objects handed to each stage.
//!
//! Each input holds the original idea plus the fields of the immediately
//! preceding result, flattened into one JSON object. The report input is the
//! only one that sees every earlier result.

use ideaval_core::{CoreConcept, MarketAnalysis};
use serde::Serialize;

/// Something that can be rendered into the context text of a generation call.
pub trait StageContext: Sync {
    fn render(&self) -> serde_json::Result<String>;
}

/// Input of the concept stage: the raw idea text, passed through untouched.
#[derive(Debug, Clone, Copy)]
pub struct IdeaInput<'a> {
    pub app_idea: &'a str,
}

impl StageContext for IdeaInput<'_> {
    fn render(&self) -> serde_json::Result<String> {
        Ok(self.app_idea.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarketInput<'a> {
    pub app_idea: &'a str,
    #[serde(flatten)]
    pub core_concept: &'a CoreConcept,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompetitorInput<'a> {
    pub app_idea: &'a str,
    #[serde(flatten)]
    pub market_analysis: &'a MarketAnalysis,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReportInput<'a> {
    pub app_idea: &'a str,
    #[serde(flatten)]
    pub core_concept: &'a CoreConcept,
    #[serde(flatten)]
    pub market_analysis: &'a MarketAnalysis,
    /// `null` when the competitor review stage produced nothing.
    pub competitor_review: Option<&'a str>,
}

impl StageContext for MarketInput<'_> {
    fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl StageContext for CompetitorInput<'_> {
    fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl StageContext for ReportInput<'_> {
    fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn concept() -> CoreConcept {
        CoreConcept {
            problem: "P".to_string(),
            innovation: "I".to_string(),
            feasibility: "F".to_string(),
        }
    }

    fn market() -> MarketAnalysis {
        MarketAnalysis {
            addressable_market: "$1B".to_string(),
            user_segment: "students".to_string(),
            market_trends: "growing".to_string(),
        }
    }

    fn parsed(context: &dyn StageContext) -> Value {
        serde_json::from_str(&context.render().unwrap()).unwrap()
    }

    #[test]
    fn test_idea_input_is_raw_text() {
        assert_eq!(IdeaInput { app_idea: "study app" }.render().unwrap(), "study app");
    }

    #[test]
    fn test_market_input_flattens_concept() {
        let concept = concept();
        let value = parsed(&MarketInput { app_idea: "study app", core_concept: &concept });
        assert_eq!(
            value,
            json!({ "app_idea": "study app", "problem": "P", "innovation": "I", "feasibility": "F" })
        );
    }

    #[test]
    fn test_competitor_input_sees_only_market_fields() {
        let market = market();
        let value = parsed(&CompetitorInput { app_idea: "study app", market_analysis: &market });
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert!(!keys.contains(&"problem"));
        assert_eq!(value["addressable_market"], "$1B");
    }

    #[test]
    fn test_report_input_with_absent_review() {
        let (concept, market) = (concept(), market());
        let value = parsed(&ReportInput {
            app_idea: "study app",
            core_concept: &concept,
            market_analysis: &market,
            competitor_review: None,
        });
        assert_eq!(value["competitor_review"], Value::Null);
        assert_eq!(value["feasibility"], "F");
        assert_eq!(value["market_trends"], "growing");
    }
}
