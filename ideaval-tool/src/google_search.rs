use async_trait::async_trait;
use ideaval_core::{IdeaError, Result, WebLookup};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Default Custom Search JSON API endpoint.
pub const GOOGLE_SEARCH_API_BASE: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSearchConfig {
    pub api_key: String,
    /// Programmable Search Engine id (`cx`).
    pub engine_id: String,
    #[serde(default = "default_num_results")]
    pub num_results: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_num_results() -> u8 {
    5
}

impl GoogleSearchConfig {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            num_results: default_num_results(),
            base_url: None,
        }
    }

    /// The API caps a single page at ten results.
    pub fn with_num_results(mut self, num_results: u8) -> Self {
        self.num_results = num_results.clamp(1, 10);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Web lookup over Google's Custom Search JSON API.
pub struct GoogleSearchClient {
    client: Client,
    config: GoogleSearchConfig,
}

impl GoogleSearchClient {
    pub fn new(config: GoogleSearchConfig) -> Result<Self> {
        if config.api_key.is_empty() || config.engine_id.is_empty() {
            return Err(IdeaError::Config(
                "Google search needs both an API key and a search engine id".to_string(),
            ));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| IdeaError::Lookup(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// The API key travels in the query string, so reqwest errors are stripped
    /// of their URL before they reach logs or the model.
    async fn fetch(&self, query: &str) -> Result<SearchResponse> {
        let url = self.config.base_url.as_deref().unwrap_or(GOOGLE_SEARCH_API_BASE);
        let num = self.config.num_results.to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                IdeaError::Lookup(format!("Google search request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(IdeaError::Lookup(format!(
                "Google search error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| {
                IdeaError::Lookup(format!("Failed to parse search response: {}", e.without_url()))
            })
    }
}

fn format_results(query: &str, items: &[SearchItem]) -> String {
    if items.is_empty() {
        return format!("No results found for \"{query}\".");
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!("{}. {}\n   {}\n   {}", i + 1, item.title, item.link, item.snippet.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl WebLookup for GoogleSearchClient {
    fn name(&self) -> &str {
        "google_search"
    }

    async fn search(&self, query: &str) -> Result<String> {
        let span = ideaval_telemetry::lookup_span(self.name());
        async {
            let response = self.fetch(query).await?;
            tracing::debug!(query, results = response.items.len(), "search completed");
            Ok(format_results(query, &response.items))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results() {
        let items = vec![
            SearchItem {
                title: "Focus apps".to_string(),
                link: "https://a.example".to_string(),
                snippet: "Market worth $1B ".to_string(),
            },
            SearchItem {
                title: "Pomodoro".to_string(),
                link: "https://b.example".to_string(),
                snippet: String::new(),
            },
        ];
        let text = format_results("focus", &items);
        assert!(text.starts_with("1. Focus apps\n   https://a.example\n   Market worth $1B"));
        assert!(text.contains("2. Pomodoro"));
    }

    #[test]
    fn test_no_results() {
        assert_eq!(format_results("zzz", &[]), "No results found for \"zzz\".");
    }

    #[test]
    fn test_config_clamps_result_count() {
        assert_eq!(GoogleSearchConfig::new("k", "cx").with_num_results(50).num_results, 10);
        assert_eq!(GoogleSearchConfig::new("k", "cx").with_num_results(0).num_results, 1);
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            GoogleSearchClient::new(GoogleSearchConfig::new("", "cx")),
            Err(IdeaError::Config(_))
        ));
    }
}
