use crate::{CalendarEvent, EventWindow};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use ideaval_core::{IdeaError, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Default Google Calendar v3 endpoint.
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCalendarConfig {
    /// OAuth access token with the calendar scope.
    pub access_token: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

impl GoogleCalendarConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), calendar_id: default_calendar_id(), base_url: None }
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: EventTime,
    end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventResource>,
    #[serde(rename = "timeZone")]
    time_zone: Option<String>,
}

impl From<&CalendarEvent> for EventResource {
    fn from(event: &CalendarEvent) -> Self {
        let time = |at: &DateTime<FixedOffset>| EventTime {
            date_time: Some(at.to_rfc3339_opts(SecondsFormat::Secs, false)),
            date: None,
            time_zone: Some(event.timezone.clone()),
        };
        Self {
            id: None,
            summary: event.title.clone(),
            description: Some(event.description.clone()),
            start: time(&event.start),
            end: time(&event.end),
            html_link: None,
        }
    }
}

impl EventResource {
    fn into_event(self, fallback_zone: &str) -> Result<CalendarEvent> {
        let (start, all_day) = parse_time(&self.start)?;
        let (end, _) = parse_time(&self.end)?;
        let timezone = self.start.time_zone.unwrap_or_else(|| fallback_zone.to_string());
        Ok(CalendarEvent {
            id: self.id,
            title: self.summary,
            description: self.description.unwrap_or_default(),
            start,
            end,
            timezone,
            all_day,
            link: self.html_link,
        })
    }
}

/// All-day events only carry a date; they are read as starting at UTC midnight.
fn parse_time(time: &EventTime) -> Result<(DateTime<FixedOffset>, bool)> {
    let bad = |value: &str| IdeaError::Calendar(format!("unreadable event time: {value}"));
    if let Some(value) = &time.date_time {
        let at = DateTime::parse_from_rfc3339(value).map_err(|_| bad(value))?;
        return Ok((at, false));
    }
    if let Some(value) = &time.date {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| bad(value))?;
        let at = date.and_hms_opt(0, 0, 0).ok_or_else(|| bad(value))?.and_utc().fixed_offset();
        return Ok((at, true));
    }
    Err(bad("missing"))
}

/// Client for one Google calendar.
pub struct GoogleCalendarClient {
    client: Client,
    config: GoogleCalendarConfig,
}

impl GoogleCalendarClient {
    pub fn new(config: GoogleCalendarConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(IdeaError::Config("Google Calendar needs an access token".to_string()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| IdeaError::Calendar(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn calendar_id(&self) -> &str {
        &self.config.calendar_id
    }

    fn events_url(&self) -> Result<Url> {
        let base = self.config.base_url.as_deref().unwrap_or(GOOGLE_CALENDAR_API_BASE);
        let mut url = Url::parse(base)
            .map_err(|e| IdeaError::Config(format!("invalid calendar base url {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| IdeaError::Config(format!("invalid calendar base url {base}")))?
            .pop_if_empty()
            .extend(["calendars", self.config.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Err(IdeaError::Calendar(format!("Google Calendar error ({}): {}", status, error_text)))
    }

    /// Events overlapping `window`, in start order. Recurring events are expanded.
    pub async fn list_events(&self, window: &EventWindow) -> Result<Vec<CalendarEvent>> {
        let span = ideaval_telemetry::calendar_span("list_events");
        async {
            let time_min = window.start.to_rfc3339_opts(SecondsFormat::Secs, false);
            let time_max = window.end.to_rfc3339_opts(SecondsFormat::Secs, false);

            let response = self
                .client
                .get(self.events_url()?)
                .bearer_auth(&self.config.access_token)
                .query(&[
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                ])
                .send()
                .await
                .map_err(|e| {
                    IdeaError::Calendar(format!("Calendar request failed: {}", e.without_url()))
                })?;

            let list: EventList = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| {
                    IdeaError::Calendar(format!("Failed to parse event list: {}", e.without_url()))
                })?;

            let fallback = list.time_zone.unwrap_or_else(|| window.timezone().name().to_string());
            let events = list
                .items
                .into_iter()
                .map(|item| item.into_event(&fallback))
                .collect::<Result<Vec<_>>>()?;
            tracing::debug!(count = events.len(), "calendar events listed");
            Ok(events)
        }
        .instrument(span)
        .await
    }

    /// Create `event` and return it as stored, with its id and link filled in.
    pub async fn insert_event(&self, event: &CalendarEvent) -> Result<CalendarEvent> {
        let span = ideaval_telemetry::calendar_span("insert_event");
        async {
            let response = self
                .client
                .post(self.events_url()?)
                .bearer_auth(&self.config.access_token)
                .json(&EventResource::from(event))
                .send()
                .await
                .map_err(|e| {
                    IdeaError::Calendar(format!("Calendar request failed: {}", e.without_url()))
                })?;

            let created: EventResource = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| {
                    IdeaError::Calendar(format!("Failed to parse created event: {}", e.without_url()))
                })?;

            let created = created.into_event(&event.timezone)?;
            tracing::info!(id = created.id.as_deref().unwrap_or_default(), "calendar event created");
            Ok(created)
        }
        .instrument(span)
        .await
    }
}
