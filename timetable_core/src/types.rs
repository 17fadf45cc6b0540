//! Core domain types for the study timetable generator.
//!
//! This module defines the fundamental types used throughout the system:
//! - The curriculum outline (units, topics, sections)
//! - Generation preferences (pace, time of day)
//! - Allocated and calendar-bound study sessions
//! - Milestones and the final schedule

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Fixed-point resolution used by the allocator
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Convert an hour estimate to whole seconds (rounded, saturating)
pub fn hours_to_seconds(hours: f64) -> u64 {
    (hours * SECONDS_PER_HOUR).round().max(0.0) as u64
}

/// Convert whole seconds back to fractional hours
pub fn seconds_to_hours(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR
}

// ============================================================================
// Outline Types
// ============================================================================

/// A section inside a topic, used only to generate task text
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub worked_examples: u32,
    #[serde(default)]
    pub practice_problems: u32,
}

/// A topic as it appears inside a unit of the outline
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnitTopic {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_topic_hours")]
    pub hours: f64,
    #[serde(default, rename = "content_sections", alias = "sections")]
    pub sections: Vec<Section>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub key_formulas: Vec<String>,
    #[serde(default)]
    pub exam_tips: Vec<String>,
}

/// A unit of the curriculum
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Unit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topics: Vec<UnitTopic>,
}

/// The nested curriculum outline of a study guide
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentOutline {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl ContentOutline {
    /// Number of topics across all units
    pub fn topic_count(&self) -> usize {
        self.units.iter().map(|u| u.topics.len()).sum()
    }
}

fn default_topic_hours() -> f64 {
    2.0
}

pub(crate) fn default_difficulty() -> String {
    "core".into()
}

/// A flattened study topic, tagged with its unit
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub unit_title: String,
    pub title: String,
    pub hours: f64,
    pub sections: Vec<Section>,
    pub difficulty: String,
    pub key_formulas: Vec<String>,
    pub exam_tips: Vec<String>,
}

// ============================================================================
// Preference Types
// ============================================================================

/// Learning pace; scales nominal session length to effective capacity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Pace {
    Relaxed,
    #[default]
    Normal,
    Intensive,
}

impl Pace {
    /// Parse a pace label; anything unrecognized is treated as `Normal`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "relaxed" => Pace::Relaxed,
            "intensive" => Pace::Intensive,
            _ => Pace::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pace::Relaxed => "relaxed",
            Pace::Normal => "normal",
            Pace::Intensive => "intensive",
        }
    }

    /// Fraction of the nominal session that is usable study time
    pub fn multiplier(self) -> f64 {
        match self {
            Pace::Relaxed => 0.7,
            Pace::Normal => 0.85,
            Pace::Intensive => 1.0,
        }
    }
}

impl From<String> for Pace {
    fn from(label: String) -> Self {
        Pace::from_label(&label)
    }
}

impl From<Pace> for String {
    fn from(pace: Pace) -> Self {
        pace.label().into()
    }
}

/// Preferred time slot for study sessions
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum TimeOfDay {
    Morning,
    #[default]
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Parse a time-of-day label; anything unrecognized is treated as `Afternoon`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "morning" => TimeOfDay::Morning,
            "evening" => TimeOfDay::Evening,
            _ => TimeOfDay::Afternoon,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    /// Session start time for this slot
    pub fn start_time(self) -> NaiveTime {
        let hour = match self {
            TimeOfDay::Morning => 8,
            TimeOfDay::Afternoon => 15,
            TimeOfDay::Evening => 19,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
    }
}

impl From<String> for TimeOfDay {
    fn from(label: String) -> Self {
        TimeOfDay::from_label(&label)
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.label().into()
    }
}

/// Full English name of a weekday ("Monday", ...)
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full weekday name, case-insensitively
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let wanted = name.trim();
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|d| weekday_name(*d).eq_ignore_ascii_case(wanted))
}

// ============================================================================
// Allocation Types
// ============================================================================

/// A slice of a topic placed into one allocated session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TopicAllocation {
    pub topic: Topic,
    pub allocated_seconds: u64,
    pub allocated_hours: f64,
    pub partial: bool,
}

impl TopicAllocation {
    pub fn new(topic: &Topic, allocated_seconds: u64, partial: bool) -> Self {
        Self {
            topic: topic.clone(),
            allocated_seconds,
            allocated_hours: seconds_to_hours(allocated_seconds),
            partial,
        }
    }

    /// Closing slice of a topic, carrying the hours earlier slices left over
    ///
    /// Keeps the slices of a topic summing to its estimate even when the
    /// estimate is not a whole number of seconds.
    pub fn remainder(topic: &Topic, allocated_seconds: u64, hours_before: f64) -> Self {
        Self {
            topic: topic.clone(),
            allocated_seconds,
            allocated_hours: topic.hours - hours_before,
            partial: false,
        }
    }
}

/// An unscheduled bundle of topic work sized to one sitting
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct AllocatedSession {
    pub allocations: Vec<TopicAllocation>,
    pub filled_seconds: u64,
}

impl AllocatedSession {
    pub fn hours(&self) -> f64 {
        seconds_to_hours(self.filled_seconds)
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

// ============================================================================
// Calendar Types
// ============================================================================

/// An allocated session bound to a concrete date and time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalendarSession {
    pub date: NaiveDate,
    pub weekday_name: String,
    pub week_number: u32,
    pub time_of_day: NaiveTime,
    pub duration_minutes: u32,
    pub primary_topic: String,
    pub topic_allocations: Vec<TopicAllocation>,
    pub tasks: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Kind of week-anchored milestone
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    PracticeTest,
    Revision,
    ExamPrep,
}

/// A non-session event anchored to a week number
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub week_number: u32,
    pub kind: MilestoneKind,
    pub title: String,
    pub description: String,
}

/// The generated study schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub start_date: NaiveDate,
    pub exam_date: NaiveDate,
    pub total_weeks: u32,
    pub total_sessions: usize,
    pub total_hours: f64,
    /// Sessions produced by the allocator, before calendar placement
    pub allocated_sessions: usize,
    /// Allocated sessions that did not fit before the exam date
    pub dropped_sessions: usize,
    pub sessions: Vec<CalendarSession>,
    pub milestones: Vec<Milestone>,
}

impl Schedule {
    /// Inclusive date range covered by a week number
    ///
    /// Week 1 runs from `start_date` to the first Sunday; every following
    /// week is Monday..Sunday. The range is clipped to the day before the
    /// exam. Returns `None` for week 0 or a week entirely past the exam.
    pub fn week_span(&self, week: u32) -> Option<(NaiveDate, NaiveDate)> {
        if week == 0 {
            return None;
        }

        let days_to_monday = 7 - i64::from(self.start_date.weekday().num_days_from_monday());
        let first_monday = self.start_date + Duration::days(days_to_monday);

        let (from, to) = if week == 1 {
            (self.start_date, first_monday - Duration::days(1))
        } else {
            let monday = first_monday + Duration::weeks(i64::from(week) - 2);
            (monday, monday + Duration::days(6))
        };

        let last_day = self.exam_date - Duration::days(1);
        let to = to.min(last_day);
        if from > to {
            None
        } else {
            Some((from, to))
        }
    }

    /// Milestones anchored to the given week
    pub fn milestones_in_week(&self, week: u32) -> impl Iterator<Item = &Milestone> {
        self.milestones.iter().filter(move |m| m.week_number == week)
    }
}
