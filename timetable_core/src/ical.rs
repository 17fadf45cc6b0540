//! iCalendar export.
//!
//! Serializes a schedule as a VCALENDAR with one VEVENT per calendar
//! session, in schedule order. Lines are CRLF-terminated.

use crate::{CalendarSession, Schedule};
use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

const PRODID: &str = "-//RUTA//Study Timetable//EN";
const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const UID_DOMAIN: &str = "study-timetable";

/// Presentation settings for the exported calendar
#[derive(Clone, Debug)]
pub struct IcalOptions {
    /// Value of X-WR-CALNAME
    pub calendar_name: String,
    /// Prefix of each event SUMMARY ("<prefix>: <topic>")
    pub summary_prefix: String,
}

impl Default for IcalOptions {
    fn default() -> Self {
        Self {
            calendar_name: "RUTA Study Plan".into(),
            summary_prefix: "RUTA".into(),
        }
    }
}

/// Render a schedule as iCalendar text
pub fn to_ical(schedule: &Schedule, options: &IcalOptions) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".into(),
        "METHOD:PUBLISH".into(),
        format!("X-WR-CALNAME:{}", single_line(&options.calendar_name)),
    ];

    for session in &schedule.sessions {
        push_event(&mut lines, session, options);
    }

    lines.push("END:VCALENDAR".into());

    tracing::debug!("Rendered {} events to iCalendar", schedule.sessions.len());
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn push_event(lines: &mut Vec<String>, session: &CalendarSession, options: &IcalOptions) {
    let start = NaiveDateTime::new(session.date, session.time_of_day);
    let end = start + Duration::minutes(i64::from(session.duration_minutes));

    lines.push("BEGIN:VEVENT".into());
    lines.push(format!("UID:{}@{}", Uuid::new_v4(), UID_DOMAIN));
    lines.push(format!("DTSTART:{}", start.format(DATETIME_FORMAT)));
    lines.push(format!("DTEND:{}", end.format(DATETIME_FORMAT)));
    lines.push(format!(
        "SUMMARY:{}: {}",
        single_line(&options.summary_prefix),
        single_line(&session.primary_topic)
    ));
    lines.push(format!("DESCRIPTION:{}", description(session)));
    lines.push("END:VEVENT".into());
}

/// Event description with literal `\n` escapes between parts
fn description(session: &CalendarSession) -> String {
    let topics: Vec<String> = session
        .topic_allocations
        .iter()
        .map(|a| single_line(&a.topic.title))
        .collect();
    let mut text = format!("Topics: {}", topics.join(", "));

    if !session.tasks.is_empty() {
        text.push_str("\\n\\nTasks:");
        for task in &session.tasks {
            text.push_str("\\n- ");
            text.push_str(&single_line(task));
        }
    }

    text
}

// Raw line breaks would end the content line early.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::generate, ContentOutline, GenerationRequest, Pace, TimeOfDay};
    use chrono::{NaiveDate, Weekday};

    fn schedule() -> Schedule {
        let req = GenerationRequest {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6),
            pace: Pace::Intensive,
            preferred_time: TimeOfDay::Morning,
            ..GenerationRequest::new(
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                vec![Weekday::Mon, Weekday::Wed],
            )
        };
        generate(&ContentOutline::default(), &req).unwrap()
    }

    #[test]
    fn test_calendar_envelope() {
        let ics = to_ical(&schedule(), &IcalOptions::default());
        let lines: Vec<&str> = ics.split("\r\n").collect();

        assert_eq!(lines[0], "BEGIN:VCALENDAR");
        assert_eq!(lines[2], "PRODID:-//RUTA//Study Timetable//EN");
        assert_eq!(lines[5], "X-WR-CALNAME:RUTA Study Plan");
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        // No bare LF anywhere
        assert_eq!(ics.matches('\n').count(), ics.matches("\r\n").count());
    }

    #[test]
    fn test_one_event_per_session() {
        let schedule = schedule();
        let ics = to_ical(&schedule, &IcalOptions::default());

        assert_eq!(schedule.total_sessions, 4);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 4);
        assert_eq!(ics.matches("END:VEVENT").count(), 4);
    }

    #[test]
    fn test_event_times_and_text() {
        let options = IcalOptions {
            calendar_name: "Maths Study Plan".into(),
            summary_prefix: "Maths".into(),
        };
        let ics = to_ical(&schedule(), &options);

        // 08:00 + 90 minutes
        assert!(ics.contains("DTSTART:20250106T080000\r\nDTEND:20250106T093000\r\n"));
        assert!(ics.contains("SUMMARY:Maths: Session 1\r\n"));
        assert!(ics.contains("DESCRIPTION:Topics: Session 1\\n\\nTasks:\\n- Study: Session 1\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Maths Study Plan"));
    }

    #[test]
    fn test_uids_are_unique() {
        let ics = to_ical(&schedule(), &IcalOptions::default());
        let uids: std::collections::HashSet<_> =
            ics.lines().filter(|l| l.starts_with("UID:")).collect();
        assert_eq!(uids.len(), 4);
    }

    #[test]
    fn test_newlines_in_titles_are_flattened() {
        let mut schedule = schedule();
        schedule.sessions.truncate(1);
        schedule.sessions[0].primary_topic = "Line one\nLine two".into();

        let ics = to_ical(&schedule, &IcalOptions::default());
        assert!(ics.contains("SUMMARY:RUTA: Line one Line two\r\n"));
    }
}
