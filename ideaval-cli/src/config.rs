//! Application configuration: TOML file, then environment, then CLI flags.

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use ideaval_calendar::{GoogleCalendarClient, GoogleCalendarConfig, parse_timezone};
use ideaval_core::{TextGenerator, WebLookup};
use ideaval_model::OpenRouterClient;
use ideaval_model::openrouter::{DEFAULT_MODEL, OPENROUTER_API_BASE, OpenRouterConfig};
use ideaval_pipeline::ValidationPipeline;
use ideaval_session::{RunStore, SqliteRunStore};
use ideaval_tool::{GoogleSearchClient, GoogleSearchConfig};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tmp/ideaval.db";

const APP_TITLE: &str = "ideaval";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub openrouter_api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub database_url: String,
    pub calendar_token: Option<String>,
    pub calendar_id: String,
    pub timezone: String,
    pub otlp_endpoint: Option<String>,
    /// Append the current date and time to every stage's instructions.
    pub add_datetime_to_instructions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_API_BASE.to_string(),
            search_api_key: None,
            search_engine_id: None,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            calendar_token: None,
            calendar_id: "primary".to_string(),
            timezone: "UTC".to_string(),
            otlp_endpoint: None,
            add_datetime_to_instructions: true,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// OTLP endpoint for telemetry start-up. Falls back to the environment when
/// the config failed to load, so the load error itself is still exported.
pub fn otlp_endpoint(
    loaded: Option<&AppConfig>,
    var: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    match loaded {
        Some(config) => config.otlp_endpoint.clone(),
        None => var("OTEL_EXPORTER_OTLP_ENDPOINT").and_then(non_empty),
    }
}

impl AppConfig {
    /// Load the optional TOML file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config.apply_env_with(|key| std::env::var(key).ok()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from environment variables, read through `var`.
    pub fn apply_env_with(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| var(key).and_then(non_empty);

        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.openrouter_api_key = Some(v);
        }
        if let Some(v) = get("IDEAVAL_MODEL") {
            self.model = v;
        }
        if let Some(v) = get("IDEAVAL_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = get("GOOGLE_SEARCH_API_KEY") {
            self.search_api_key = Some(v);
        }
        if let Some(v) = get("GOOGLE_SEARCH_ENGINE_ID") {
            self.search_engine_id = Some(v);
        }
        if let Some(v) = get("IDEAVAL_DB") {
            self.database_url = v;
        }
        if let Some(v) = get("GOOGLE_CALENDAR_TOKEN") {
            self.calendar_token = Some(v);
        }
        if let Some(v) = get("GOOGLE_CALENDAR_ID") {
            self.calendar_id = v;
        }
        if let Some(v) = get("IDEAVAL_TIMEZONE") {
            self.timezone = v;
        }
        if let Some(v) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
            self.otlp_endpoint = Some(v);
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }

    pub fn generator(&self) -> Result<Arc<dyn TextGenerator>> {
        let Some(api_key) = self.openrouter_api_key.as_deref() else {
            bail!("OPENROUTER_API_KEY is not set");
        };
        let config = OpenRouterConfig::new(api_key, &self.model)
            .with_base_url(&self.base_url)
            .with_app_title(APP_TITLE);
        Ok(Arc::new(OpenRouterClient::new(config)?))
    }

    /// Web lookup for the research stages, when search credentials are configured.
    pub fn lookup(&self) -> Result<Option<Arc<dyn WebLookup>>> {
        match (&self.search_api_key, &self.search_engine_id) {
            (Some(key), Some(engine)) => {
                let client = GoogleSearchClient::new(GoogleSearchConfig::new(key, engine))?;
                Ok(Some(Arc::new(client)))
            }
            _ => {
                tracing::warn!("Google search is not configured; research stages run without lookup");
                Ok(None)
            }
        }
    }

    pub fn pipeline(&self) -> Result<ValidationPipeline> {
        self.pipeline_with(self.generator()?)
    }

    pub fn pipeline_with(&self, generator: Arc<dyn TextGenerator>) -> Result<ValidationPipeline> {
        Ok(ValidationPipeline::builder()
            .generator(generator)
            .lookup_opt(self.lookup()?)
            .add_datetime_to_instructions(self.add_datetime_to_instructions)
            .build()?)
    }

    pub async fn run_store(&self) -> Result<Arc<dyn RunStore>> {
        let store = SqliteRunStore::new(&self.database_url)
            .await
            .with_context(|| format!("opening run history at {}", self.database_url))?;
        store.migrate().await?;
        Ok(Arc::new(store))
    }

    pub fn calendar(&self) -> Result<GoogleCalendarClient> {
        let Some(token) = self.calendar_token.as_deref() else {
            bail!("GOOGLE_CALENDAR_TOKEN is not set");
        };
        let config = GoogleCalendarConfig::new(token).with_calendar_id(&self.calendar_id);
        Ok(GoogleCalendarClient::new(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.calendar_id, "primary");
        assert!(config.add_datetime_to_instructions);
    }

    #[test]
    fn test_toml_then_env() {
        let config = AppConfig::from_toml_str(
            r#"
            model = "anthropic/claude-3.5-haiku"
            timezone = "Europe/Lisbon"
            add_datetime_to_instructions = false
            "#,
        )
        .unwrap()
        .apply_env_with(env(&[
            ("IDEAVAL_MODEL", "openai/gpt-4o"),
            ("OPENROUTER_API_KEY", "sk-or-1"),
            ("GOOGLE_SEARCH_API_KEY", "   "),
        ]));

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.timezone, "Europe/Lisbon");
        assert_eq!(config.openrouter_api_key.as_deref(), Some("sk-or-1"));
        assert_eq!(config.search_api_key, None);
        assert!(!config.add_datetime_to_instructions);
    }

    #[test]
    fn test_cli_model_wins() {
        let config = AppConfig::default()
            .apply_env_with(env(&[("IDEAVAL_MODEL", "from-env")]))
            .with_model(Some("from-flag".to_string()));
        assert_eq!(config.model, "from-flag");
    }

    #[test]
    fn test_wrong_toml_type_is_an_error() {
        assert!(AppConfig::from_toml_str("model = 3").is_err());
    }

    #[test]
    fn test_generator_requires_key() {
        let err = AppConfig::default().generator().err().unwrap();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_lookup_needs_both_credentials() {
        let partial = AppConfig {
            search_api_key: Some("key".to_string()),
            ..AppConfig::default()
        };
        assert!(partial.lookup().unwrap().is_none());

        let full = AppConfig {
            search_api_key: Some("key".to_string()),
            search_engine_id: Some("cx".to_string()),
            ..AppConfig::default()
        };
        assert!(full.lookup().unwrap().is_some());
    }

    #[test]
    fn test_otlp_endpoint_from_loaded_config() {
        let config = AppConfig::default()
            .apply_env_with(env(&[("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317")]));
        assert_eq!(
            otlp_endpoint(Some(&config), env(&[])).as_deref(),
            Some("http://collector:4317")
        );
        assert_eq!(otlp_endpoint(Some(&AppConfig::default()), env(&[])), None);
    }

    #[test]
    fn test_otlp_endpoint_without_config_reads_env() {
        let broken = AppConfig::from_toml_str("model = 3");
        assert!(broken.is_err());
        let endpoint = otlp_endpoint(
            broken.as_ref().ok(),
            env(&[("OTEL_EXPORTER_OTLP_ENDPOINT", " http://collector:4317 ")]),
        );
        assert_eq!(endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(otlp_endpoint(None, env(&[("OTEL_EXPORTER_OTLP_ENDPOINT", "  ")])), None);
    }

    #[test]
    fn test_bad_timezone() {
        let config = AppConfig { timezone: "Nowhere/Land".to_string(), ..AppConfig::default() };
        assert!(config.timezone().is_err());
    }
}
