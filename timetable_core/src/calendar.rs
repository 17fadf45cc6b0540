//! Calendar mapping for allocated sessions.
//!
//! Walks calendar dates from the start date, binding the next allocated
//! session to each date that falls on a configured study day, until either
//! every session is placed or the exam date is reached. Sessions that do not
//! fit before the exam are dropped and counted.

use crate::types::weekday_name;
use crate::{AllocatedSession, CalendarSession, Error, Result, TimeOfDay, TopicAllocation};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Maximum number of tasks listed for one session
pub const MAX_TASKS: usize = 6;

/// Number of topic allocations that contribute tasks
const TASK_TOPICS: usize = 2;

/// Number of sections per topic that contribute tasks
const TASK_SECTIONS: usize = 2;

/// Primary topic label for a session without allocations
const FALLBACK_TOPIC: &str = "Study Session";

/// Parameters for binding sessions to dates
#[derive(Clone, Debug)]
pub struct CalendarOptions {
    pub start_date: NaiveDate,
    pub exam_date: NaiveDate,
    pub study_days: Vec<Weekday>,
    pub time_of_day: TimeOfDay,
}

/// Result of the calendar walk
#[derive(Clone, Debug)]
pub struct CalendarMapping {
    pub sessions: Vec<CalendarSession>,
    /// Allocated sessions left over when the exam date was reached
    pub dropped: usize,
}

/// Bind allocated sessions to calendar dates
///
/// The week number starts at 1 and increments each time the walk steps onto
/// a Monday. Fails with `Error::EmptyStudyDays` when no study day is given,
/// since no date could ever match.
pub fn map_to_calendar(
    sessions: &[AllocatedSession],
    options: &CalendarOptions,
) -> Result<CalendarMapping> {
    if options.study_days.is_empty() {
        return Err(Error::EmptyStudyDays);
    }

    let start_time = options.time_of_day.start_time();
    let mut calendar = Vec::with_capacity(sessions.len());
    let mut pending = sessions.iter();
    let mut next = pending.next();
    let mut date = options.start_date;
    let mut week_number = 1;

    while let Some(session) = next {
        if date >= options.exam_date {
            break;
        }

        if options.study_days.contains(&date.weekday()) {
            calendar.push(CalendarSession {
                date,
                weekday_name: weekday_name(date.weekday()).into(),
                week_number,
                time_of_day: start_time,
                duration_minutes: duration_minutes(session.filled_seconds),
                primary_topic: session
                    .allocations
                    .first()
                    .map(|a| a.topic.title.clone())
                    .unwrap_or_else(|| FALLBACK_TOPIC.into()),
                topic_allocations: session.allocations.clone(),
                tasks: session_tasks(&session.allocations),
                completed: false,
            });
            next = pending.next();
        }

        date += Duration::days(1);
        if date.weekday() == Weekday::Mon {
            week_number += 1;
        }
    }

    let dropped = sessions.len() - calendar.len();
    if dropped > 0 {
        tracing::warn!(
            "{} of {} allocated sessions do not fit before the exam on {}",
            dropped,
            sessions.len(),
            options.exam_date
        );
    }

    Ok(CalendarMapping {
        sessions: calendar,
        dropped,
    })
}

/// Number of study-day dates in `[start_date, exam_date)`
///
/// This is how many sessions the calendar walk can place at most.
pub fn study_slots(start_date: NaiveDate, exam_date: NaiveDate, study_days: &[Weekday]) -> usize {
    if exam_date <= start_date {
        return 0;
    }

    let is_study_day = |offset: i64| {
        let date = start_date + Duration::days(offset);
        study_days.contains(&date.weekday())
    };

    let days = (exam_date - start_date).num_days();
    let full_weeks = days / 7;
    let per_week = (0..7).filter(|&d| is_study_day(d)).count();
    let tail = (full_weeks * 7..days).filter(|&d| is_study_day(d)).count();

    full_weeks as usize * per_week + tail
}

/// Session length in whole minutes, rounded to nearest
fn duration_minutes(filled_seconds: u64) -> u32 {
    ((filled_seconds + 30) / 60) as u32
}

/// Generate the task list for a session
///
/// Covers the first two topics: a study task, review tasks for up to two
/// sections (plus worked-example and practice-problem tasks when present),
/// and an exam-tips task. The list is capped at `MAX_TASKS`.
pub fn session_tasks(allocations: &[TopicAllocation]) -> Vec<String> {
    let mut tasks = Vec::new();

    for alloc in allocations.iter().take(TASK_TOPICS) {
        let topic = &alloc.topic;
        tasks.push(format!("Study: {}", topic.title));

        for section in topic.sections.iter().take(TASK_SECTIONS) {
            if !section.title.is_empty() {
                tasks.push(format!("Review: {}", section.title));
            }
            if section.worked_examples > 0 {
                tasks.push(format!("Work through {} examples", section.worked_examples));
            }
            if section.practice_problems > 0 {
                tasks.push("Complete practice problems".into());
            }
        }

        if !topic.exam_tips.is_empty() {
            tasks.push("Review exam tips".into());
        }
    }

    tasks.truncate(MAX_TASKS);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Section, Topic};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn topic(title: &str) -> Topic {
        Topic {
            unit_title: "Unit".into(),
            title: title.into(),
            hours: 1.0,
            sections: vec![],
            difficulty: "core".into(),
            key_formulas: vec![],
            exam_tips: vec![],
        }
    }

    fn session(title: &str, seconds: u64) -> AllocatedSession {
        AllocatedSession {
            allocations: vec![TopicAllocation::new(&topic(title), seconds, false)],
            filled_seconds: seconds,
        }
    }

    fn options(study_days: Vec<Weekday>, start: NaiveDate, exam: NaiveDate) -> CalendarOptions {
        CalendarOptions {
            start_date: start,
            exam_date: exam,
            study_days,
            time_of_day: TimeOfDay::Afternoon,
        }
    }

    #[test]
    fn test_maps_onto_study_days_only() {
        let sessions: Vec<_> = (1..=4).map(|i| session(&format!("T{}", i), 3600)).collect();
        // 2025-01-06 is a Monday
        let opts = options(
            vec![Weekday::Mon, Weekday::Thu],
            date(2025, 1, 6),
            date(2025, 3, 1),
        );

        let mapping = map_to_calendar(&sessions, &opts).unwrap();

        let dates: Vec<_> = mapping.sessions.iter().map(|s| s.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 6),
                date(2025, 1, 9),
                date(2025, 1, 13),
                date(2025, 1, 16)
            ]
        );
        assert_eq!(mapping.sessions[1].weekday_name, "Thursday");
        assert_eq!(mapping.dropped, 0);
    }

    #[test]
    fn test_week_number_increments_on_monday() {
        let sessions: Vec<_> = (1..=3).map(|i| session(&format!("T{}", i), 3600)).collect();
        // Saturday start, study on Saturdays
        let opts = options(vec![Weekday::Sat], date(2025, 1, 11), date(2025, 3, 1));

        let mapping = map_to_calendar(&sessions, &opts).unwrap();

        let weeks: Vec<_> = mapping.sessions.iter().map(|s| s.week_number).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }

    #[test]
    fn test_exam_date_is_exclusive_and_drops_leftovers() {
        let sessions: Vec<_> = (1..=5).map(|i| session(&format!("T{}", i), 3600)).collect();
        let opts = options(vec![Weekday::Mon], date(2025, 1, 6), date(2025, 1, 20));

        let mapping = map_to_calendar(&sessions, &opts).unwrap();

        assert_eq!(mapping.sessions.len(), 2);
        assert_eq!(mapping.dropped, 3);
        assert!(mapping.sessions.iter().all(|s| s.date < date(2025, 1, 20)));
    }

    #[test]
    fn test_rejects_empty_study_days() {
        let sessions = vec![session("T", 3600)];
        let opts = options(vec![], date(2025, 1, 6), date(2025, 2, 6));

        assert!(matches!(
            map_to_calendar(&sessions, &opts),
            Err(Error::EmptyStudyDays)
        ));
    }

    #[test]
    fn test_study_slots_match_calendar_walk() {
        let days = vec![Weekday::Mon, Weekday::Wed];
        // Monday 2025-01-06 to Sunday 2025-06-01: 20 full weeks plus Mon..Sat
        assert_eq!(study_slots(date(2025, 1, 6), date(2025, 6, 1), &days), 42);

        // Same count as sessions the walk places when there are plenty
        let sessions: Vec<_> = (0..60).map(|i| session(&format!("T{}", i), 3600)).collect();
        let opts = options(days.clone(), date(2025, 1, 9), date(2025, 3, 4));
        let placed = map_to_calendar(&sessions, &opts).unwrap().sessions.len();
        assert_eq!(study_slots(opts.start_date, opts.exam_date, &days), placed);

        assert_eq!(study_slots(date(2025, 1, 6), date(2025, 1, 6), &days), 0);
        assert_eq!(study_slots(date(2025, 1, 6), date(2025, 2, 3), &[]), 0);
    }

    #[test]
    fn test_session_fields() {
        let sessions = vec![session("Limits", 4590)];
        let mut opts = options(vec![Weekday::Mon], date(2025, 1, 6), date(2025, 2, 6));
        opts.time_of_day = TimeOfDay::Evening;

        let mapping = map_to_calendar(&sessions, &opts).unwrap();
        let s = &mapping.sessions[0];

        assert_eq!(s.duration_minutes, 77); // 76.5 rounds up
        assert_eq!(s.time_of_day, TimeOfDay::Evening.start_time());
        assert_eq!(s.primary_topic, "Limits");
        assert!(!s.completed);
        assert_eq!(s.tasks, vec!["Study: Limits".to_string()]);
    }

    #[test]
    fn test_task_generation_order_and_cap() {
        let mut rich = topic("Derivatives");
        rich.sections = vec![
            Section {
                title: "Rules".into(),
                worked_examples: 3,
                practice_problems: 10,
            },
            Section {
                title: "Chain rule".into(),
                worked_examples: 0,
                practice_problems: 4,
            },
            Section {
                title: "Ignored third section".into(),
                worked_examples: 1,
                practice_problems: 1,
            },
        ];
        rich.exam_tips = vec!["Show your working".into()];

        let tasks = session_tasks(&[
            TopicAllocation::new(&rich, 3600, true),
            TopicAllocation::new(&topic("Integrals"), 1800, false),
        ]);

        assert_eq!(
            tasks,
            vec![
                "Study: Derivatives",
                "Review: Rules",
                "Work through 3 examples",
                "Complete practice problems",
                "Review: Chain rule",
                "Complete practice problems",
            ]
        );
    }

    #[test]
    fn test_tasks_for_short_topics() {
        let mut tipped = topic("Vectors");
        tipped.exam_tips = vec!["Draw a diagram".into()];

        let tasks = session_tasks(&[
            TopicAllocation::new(&tipped, 1800, false),
            TopicAllocation::new(&topic("Matrices"), 1800, false),
            TopicAllocation::new(&topic("Not listed"), 1800, false),
        ]);

        assert_eq!(
            tasks,
            vec!["Study: Vectors", "Review exam tips", "Study: Matrices"]
        );
    }
}
