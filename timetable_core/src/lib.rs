#![forbid(unsafe_code)]

//! Core domain model and generation pipeline for RUTA study timetables.
//!
//! This crate provides:
//! - Domain types (outline, topics, allocations, calendar sessions, milestones)
//! - Topic flattening and session allocation
//! - Calendar mapping and milestone injection
//! - Schedule generation (pure, no I/O)
//! - iCalendar and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod outline;
pub mod allocator;
pub mod calendar;
pub mod milestones;
pub mod engine;
pub mod ical;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use outline::flatten_topics;
pub use allocator::{
    allocate_bounded, allocate_sessions, Allocation, AllocatorOptions, DEFAULT_FILL_THRESHOLD,
};
pub use calendar::{map_to_calendar, study_slots, CalendarMapping, CalendarOptions};
pub use milestones::{build_milestones, weeks_available};
pub use engine::{generate, GenerationRequest};
pub use ical::{to_ical, IcalOptions};
pub use csv_export::{to_csv_string, write_csv};
