//! Week-anchored milestones.
//!
//! Milestones are tied to a week number, not a date: a mid-term practice
//! test (4+ weeks), a full revision week (3+ weeks) and the final exam prep
//! week (always).

use crate::{Milestone, MilestoneKind};
use chrono::NaiveDate;

/// Whole weeks between start and exam, never less than one
pub fn weeks_available(start_date: NaiveDate, exam_date: NaiveDate) -> u32 {
    let days = (exam_date - start_date).num_days();
    (days.div_euclid(7)).max(1) as u32
}

/// Build the milestone list for the given number of weeks
///
/// Order is fixed: practice test, revision, exam prep.
pub fn build_milestones(weeks_available: u32) -> Vec<Milestone> {
    let weeks = weeks_available.max(1);
    let mut milestones = Vec::with_capacity(3);

    if weeks >= 4 {
        milestones.push(Milestone {
            week_number: weeks / 2,
            kind: MilestoneKind::PracticeTest,
            title: "Mid-term Practice Test".into(),
            description: "Complete a timed practice test covering topics studied so far".into(),
        });
    }

    if weeks >= 3 {
        milestones.push(Milestone {
            week_number: weeks - 1,
            kind: MilestoneKind::Revision,
            title: "Full Revision".into(),
            description: "Review all topics, focus on weak areas identified during study".into(),
        });
    }

    milestones.push(Milestone {
        week_number: weeks,
        kind: MilestoneKind::ExamPrep,
        title: "Final Exam Prep".into(),
        description: "Past papers, exam techniques, and final review".into(),
    });

    milestones
}
