use crate::AppConfig;
use anyhow::Result;
use ideaval_session::StoredRun;

pub fn format_entry(stored: &StoredRun) -> String {
    format!(
        "{}  {:<9}  {}  ({})",
        stored.run.finished_at.format("%Y-%m-%d %H:%M"),
        stored.run.outcome.status(),
        stored.run.idea,
        stored.session_id
    )
}

pub async fn run(config: &AppConfig, limit: usize) -> Result<()> {
    let store = config.run_store().await?;
    let runs = store.list(limit).await?;
    if runs.is_empty() {
        println!("No ideas validated yet.");
        return Ok(());
    }
    for stored in &runs {
        println!("{}", format_entry(stored));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ideaval_pipeline::{PipelineRun, ValidationOutcome};

    #[test]
    fn test_format_entry() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 0).unwrap();
        let stored = StoredRun {
            session_id: "study-app".to_string(),
            run: PipelineRun {
                run_id: "study-app".to_string(),
                idea: "Study app".to_string(),
                core_concept: None,
                market_analysis: None,
                competitor_review: None,
                outcome: ValidationOutcome::NoReport,
                started_at: at,
                finished_at: at,
            },
        };
        assert_eq!(format_entry(&stored), "2026-10-18 14:05  no_report  Study app  (study-app)");
    }
}
