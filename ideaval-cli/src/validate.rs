use crate::AppConfig;
use anyhow::{Result, bail};
use ideaval_pipeline::{PipelineRun, ValidationPipeline};
use ideaval_session::{RunStore, generate_session_id};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_IDEA: &str = "A productivity app for focused work sessions";

/// Pick the idea to validate: the argument when given, otherwise whatever
/// `prompt` returns, falling back to [`DEFAULT_IDEA`] for an empty answer.
pub fn resolve_idea(arg: Option<String>, prompt: impl FnOnce() -> io::Result<String>) -> Result<String> {
    let idea = match arg {
        Some(idea) => idea,
        None => {
            let answer = prompt()?;
            if answer.trim().is_empty() { DEFAULT_IDEA.to_string() } else { answer }
        }
    };
    let idea = idea.trim();
    if idea.is_empty() {
        bail!("please enter an app idea");
    }
    Ok(idea.to_string())
}

fn prompt_stdin() -> io::Result<String> {
    print!("Describe your app idea [{DEFAULT_IDEA}]: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// `DIR/report_<session>.md`. Session ids keep whatever the idea contained, so
/// anything outside `[a-z0-9_-]` becomes `-` to keep the file inside `dir`.
pub fn report_path(dir: &Path, session_id: &str) -> PathBuf {
    let name: String = session_id
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    dir.join(format!("report_{name}.md"))
}

/// Run the pipeline for `idea` under its session id and record it in `store`.
///
/// A history write failure is logged; the run itself is still returned.
pub async fn validate_idea(
    pipeline: &ValidationPipeline,
    store: Option<&dyn RunStore>,
    idea: &str,
) -> (String, PipelineRun) {
    let session_id = generate_session_id(idea);
    let run = pipeline.run(session_id.clone(), idea).await;

    if let Some(store) = store {
        if let Err(e) = store.persist(&session_id, &run).await {
            tracing::warn!(session_id, error = %e, "failed to record run");
        }
    }
    (session_id, run)
}

pub async fn run(
    config: &AppConfig,
    idea: Option<String>,
    output: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let idea = resolve_idea(idea, prompt_stdin)?;
    let pipeline = config.pipeline()?;
    let store = if no_save { None } else { Some(config.run_store().await?) };

    let (session_id, run) = validate_idea(&pipeline, store.as_deref(), &idea).await;
    println!("{}", run.outcome);

    if let Some(dir) = output {
        match run.outcome.report() {
            Some(markdown) => {
                std::fs::create_dir_all(&dir)?;
                let path = report_path(&dir, &session_id);
                std::fs::write(&path, markdown)?;
                println!("\nReport saved to {}", path.display());
            }
            None => tracing::warn!(session_id, "no report to save"),
        }
    }
    Ok(())
}
