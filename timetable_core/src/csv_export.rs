//! CSV export of calendar sessions.
//!
//! One row per session, in schedule order, with a header row.

use crate::{CalendarSession, Result, Schedule};
use std::io::Write;

/// Column names, in serialization order
pub const HEADER: [&str; 9] = [
    "date",
    "weekday",
    "week",
    "start_time",
    "duration_minutes",
    "primary_topic",
    "topics",
    "tasks",
    "completed",
];

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    weekday: String,
    week: u32,
    start_time: String,
    duration_minutes: u32,
    primary_topic: String,
    topics: String,
    tasks: String,
    completed: bool,
}

impl From<&CalendarSession> for CsvRow {
    fn from(session: &CalendarSession) -> Self {
        CsvRow {
            date: session.date.format("%Y-%m-%d").to_string(),
            weekday: session.weekday_name.clone(),
            week: session.week_number,
            start_time: session.time_of_day.format("%H:%M").to_string(),
            duration_minutes: session.duration_minutes,
            primary_topic: session.primary_topic.clone(),
            topics: session
                .topic_allocations
                .iter()
                .map(|a| a.topic.title.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            tasks: session.tasks.join("; "),
            completed: session.completed,
        }
    }
}

/// Write all sessions of a schedule as CSV
pub fn write_csv<W: Write>(schedule: &Schedule, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    // Headers come from the first serialized row, so write them by hand
    // when there is none.
    if schedule.sessions.is_empty() {
        writer.write_record(HEADER)?;
    }

    for session in &schedule.sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    tracing::debug!("Wrote {} sessions to CSV", schedule.sessions.len());
    Ok(())
}

/// Render all sessions of a schedule as a CSV string
pub fn to_csv_string(schedule: &Schedule) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(schedule, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| crate::Error::Other(format!("Invalid UTF-8 in CSV: {}", e)))
}
