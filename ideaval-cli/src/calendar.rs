use crate::AppConfig;
use crate::cli::CalendarCommand;
use anyhow::Result;
use chrono::{Duration, Utc};
use ideaval_calendar::{CalendarEvent, EventWindow};

pub async fn run(config: &AppConfig, action: CalendarCommand) -> Result<()> {
    let client = config.calendar()?;
    let tz = config.timezone()?;

    match action {
        CalendarCommand::Today => {
            let today = EventWindow::day_of(Utc::now(), tz)?;
            let events = client.list_events(&today).await?;
            if events.is_empty() {
                println!("No events today.");
            }
            for event in &events {
                println!("{event}");
            }
        }
        CalendarCommand::Create { title, description, minutes } => {
            let window = EventWindow::starting_now(Duration::minutes(i64::from(minutes)), tz);
            let created = client.insert_event(&CalendarEvent::new(title, description, &window)).await?;
            println!("Created {created}");
            if let Some(link) = &created.link {
                println!("{link}");
            }
        }
    }
    Ok(())
}
