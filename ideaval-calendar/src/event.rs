use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use ideaval_core::{IdeaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parse an IANA timezone name such as `America/Sao_Paulo`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| IdeaError::Config(format!("unknown timezone: {name}")))
}

/// A span of time in a specific timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl EventWindow {
    /// Window beginning at the current instant.
    pub fn starting_now(duration: Duration, tz: Tz) -> Self {
        Self::starting_at(Utc::now(), duration, tz)
    }

    pub fn starting_at(start: DateTime<Utc>, duration: Duration, tz: Tz) -> Self {
        let start = start.with_timezone(&tz);
        Self { start, end: start + duration }
    }

    /// The local calendar day containing `now`, midnight to midnight.
    pub fn day_of(now: DateTime<Utc>, tz: Tz) -> Result<Self> {
        let today = now.with_timezone(&tz).date_naive();
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| IdeaError::Calendar("date out of range".to_string()))?;
        Ok(Self { start: local_midnight(today, tz)?, end: local_midnight(tomorrow, tz)? })
    }

    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        // Midnight skipped by a DST jump; the day starts an hour later.
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| IdeaError::Calendar(format!("no local midnight on {date} in {tz}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// IANA timezone name the event was scheduled in.
    pub timezone: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, description: impl Into<String>, window: &EventWindow) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            start: window.start.fixed_offset(),
            end: window.end.fixed_offset(),
            timezone: window.timezone().name().to_string(),
            all_day: false,
            link: None,
        }
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_day {
            write!(f, "all day      {}", self.title)
        } else {
            write!(f, "{} - {}  {}", self.start.format("%H:%M"), self.end.format("%H:%M"), self.title)
        }
    }
}
