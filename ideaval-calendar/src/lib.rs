//! # ideaval-calendar
//!
//! Reads and creates Google Calendar events so a validated idea can be turned
//! into scheduled work.
//!
//! ```rust,ignore
//! use ideaval_calendar::{CalendarEvent, EventWindow, GoogleCalendarClient, GoogleCalendarConfig};
//!
//! let client = GoogleCalendarClient::new(GoogleCalendarConfig::new(token))?;
//! let window = EventWindow::starting_now(chrono::Duration::hours(1), chrono_tz::Europe::Lisbon);
//! let event = CalendarEvent::new("Fill in the project report", "Work on it for the next hour.", &window);
//! client.insert_event(&event).await?;
//! ```

pub mod client;
pub mod event;

pub use client::{GOOGLE_CALENDAR_API_BASE, GoogleCalendarClient, GoogleCalendarConfig};
pub use event::{CalendarEvent, EventWindow, parse_timezone};
