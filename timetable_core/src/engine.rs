//! Schedule generation.
//!
//! Runs the full pipeline over plain data:
//! 1. Flatten the outline into topics
//! 2. Allocate topics into sessions
//! 3. Bind sessions to calendar dates
//! 4. Add week-anchored milestones
//! 5. Aggregate totals
//!
//! Generation is pure: no I/O and no shared state, so it is safe to call
//! concurrently for independent requests.

use crate::allocator::{allocate_bounded, AllocatorOptions, DEFAULT_FILL_THRESHOLD};
use crate::calendar::{map_to_calendar, study_slots, CalendarOptions};
use crate::milestones::{build_milestones, weeks_available};
use crate::{flatten_topics, ContentOutline, Pace, Result, Schedule, TimeOfDay};
use chrono::{Local, NaiveDate, Weekday};

/// Default nominal session length in hours
pub const DEFAULT_HOURS_PER_SESSION: f64 = 1.5;

/// Parameters for one generation call
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub exam_date: NaiveDate,
    pub study_days: Vec<Weekday>,
    pub hours_per_session: f64,
    pub preferred_time: TimeOfDay,
    pub pace: Pace,
    /// Defaults to today (local clock) when absent
    pub start_date: Option<NaiveDate>,
    pub fill_threshold: f64,
}

impl GenerationRequest {
    /// Request with default session length, time of day and pace
    pub fn new(exam_date: NaiveDate, study_days: Vec<Weekday>) -> Self {
        Self {
            exam_date,
            study_days,
            hours_per_session: DEFAULT_HOURS_PER_SESSION,
            preferred_time: TimeOfDay::default(),
            pace: Pace::default(),
            start_date: None,
            fill_threshold: DEFAULT_FILL_THRESHOLD,
        }
    }

    pub fn start_date_or_today(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Study days with duplicates removed, first occurrence kept
    pub fn distinct_study_days(&self) -> Vec<Weekday> {
        let mut days = Vec::with_capacity(self.study_days.len());
        for day in &self.study_days {
            if !days.contains(day) {
                days.push(*day);
            }
        }
        days
    }
}

/// Generate a study schedule for an outline
///
/// Fails only on inputs that would make the pipeline non-terminating: an
/// empty study-day set, a topic with non-positive hours, or a non-positive
/// session capacity. Sessions that cannot be placed before the exam are
/// dropped and reported in `Schedule::dropped_sessions`.
pub fn generate(outline: &ContentOutline, request: &GenerationRequest) -> Result<Schedule> {
    let start_date = request.start_date_or_today();
    let study_days = request.distinct_study_days();
    let weeks = weeks_available(start_date, request.exam_date);

    tracing::info!(
        "Generating timetable: {} -> {} ({} weeks, {} study days, {}h sessions, {} pace)",
        start_date,
        request.exam_date,
        weeks,
        study_days.len(),
        request.hours_per_session,
        request.pace.label()
    );

    let placeholder_count = weeks as usize * study_days.len();
    let topics = flatten_topics(outline, placeholder_count, request.hours_per_session);

    let allocator = AllocatorOptions {
        hours_per_session: request.hours_per_session,
        pace: request.pace,
        fill_threshold: request.fill_threshold,
    };
    // Sessions past the last study day before the exam are only counted
    let slots = study_slots(start_date, request.exam_date, &study_days);
    let allocation = allocate_bounded(&topics, &allocator, slots)?;

    let mapping = map_to_calendar(
        &allocation.sessions,
        &CalendarOptions {
            start_date,
            exam_date: request.exam_date,
            study_days,
            time_of_day: request.preferred_time,
        },
    )?;

    let dropped_sessions = allocation.total - mapping.sessions.len();
    if dropped_sessions > 0 {
        tracing::warn!(
            "{} of {} allocated sessions do not fit before the exam on {}",
            dropped_sessions,
            allocation.total,
            request.exam_date
        );
    }

    let total_minutes: u64 = mapping
        .sessions
        .iter()
        .map(|s| u64::from(s.duration_minutes))
        .sum();

    let schedule = Schedule {
        start_date,
        exam_date: request.exam_date,
        total_weeks: weeks,
        total_sessions: mapping.sessions.len(),
        total_hours: total_minutes as f64 / 60.0,
        allocated_sessions: allocation.total,
        dropped_sessions,
        sessions: mapping.sessions,
        milestones: build_milestones(weeks),
    };

    tracing::info!(
        "Generated {} sessions ({:.1}h) and {} milestones",
        schedule.total_sessions,
        schedule.total_hours,
        schedule.milestones.len()
    );

    Ok(schedule)
}
