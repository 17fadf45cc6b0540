//! Greedy session allocation.
//!
//! Packs topics, in curriculum order, into abstract study sessions sized by
//! the effective per-session capacity:
//! - A topic that fits the remaining capacity is added whole
//! - Otherwise the remaining capacity is filled with a partial slice and the
//!   residual carries over into the next session
//! - A session closes once it is filled to the fill threshold
//!
//! Packing decisions are made in whole seconds. The closing slice of each
//! topic carries the hours its earlier slices left, so the slices of a topic
//! sum to its estimate.

use crate::types::{hours_to_seconds, seconds_to_hours};
use crate::{AllocatedSession, Error, Pace, Result, Topic, TopicAllocation};

/// Fraction of capacity at which a session counts as full
pub const DEFAULT_FILL_THRESHOLD: f64 = 0.9;

/// Allocation parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllocatorOptions {
    pub hours_per_session: f64,
    pub pace: Pace,
    pub fill_threshold: f64,
}

impl AllocatorOptions {
    pub fn new(hours_per_session: f64, pace: Pace) -> Self {
        Self {
            hours_per_session,
            pace,
            fill_threshold: DEFAULT_FILL_THRESHOLD,
        }
    }

    /// Usable study hours per session after pacing
    pub fn effective_hours(&self) -> f64 {
        self.hours_per_session * self.pace.multiplier()
    }

    /// Effective capacity in seconds, rejecting non-positive durations
    pub fn capacity_seconds(&self) -> Result<u64> {
        let hours = self.effective_hours();
        if !hours.is_finite() || hours <= 0.0 {
            return Err(Error::InvalidCapacity(hours));
        }
        match hours_to_seconds(hours) {
            0 => Err(Error::InvalidCapacity(hours)),
            seconds => Ok(seconds),
        }
    }
}

/// Check a fill threshold lies in (0, 1]
pub fn validate_fill_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "fill_threshold must be in (0, 1], got {}",
            threshold
        )))
    }
}

/// Packing size of a topic in seconds
///
/// Any positive estimate takes at least one second, so tiny topics are still
/// scheduled. Non-positive or non-finite estimates could never be consumed.
fn topic_seconds(topic: &Topic) -> Result<u64> {
    if !topic.hours.is_finite() || topic.hours <= 0.0 {
        return Err(Error::InvalidTopicHours {
            topic: topic.title.clone(),
            hours: topic.hours,
        });
    }
    Ok(hours_to_seconds(topic.hours).max(1))
}

/// Outcome of a bounded allocation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    /// Sessions built in full, never more than the requested limit
    pub sessions: Vec<AllocatedSession>,
    /// Sessions the packing yields overall, including the ones not built
    pub total: usize,
}

/// Allocate topics into sessions
///
/// Every topic is validated before any packing starts, so a bad estimate
/// fails the whole call instead of producing a partial allocation.
pub fn allocate_sessions(
    topics: &[Topic],
    options: &AllocatorOptions,
) -> Result<Vec<AllocatedSession>> {
    Ok(allocate_bounded(topics, options, usize::MAX)?.sessions)
}

/// Allocate topics, building at most `limit` sessions
///
/// Packing past the limit only counts sessions, one arithmetic step per
/// topic, so the cost stays bounded by the number of topics plus `limit`
/// however large the estimates are. `total` matches what an unbounded
/// allocation would produce.
pub fn allocate_bounded(
    topics: &[Topic],
    options: &AllocatorOptions,
    limit: usize,
) -> Result<Allocation> {
    validate_fill_threshold(options.fill_threshold)?;
    let capacity = options.capacity_seconds()?;
    let estimates: Vec<u64> = topics.iter().map(topic_seconds).collect::<Result<_>>()?;

    let full_at = capacity as f64 * options.fill_threshold;

    let mut sessions = Vec::new();
    let mut current = AllocatedSession::default();
    let mut pending = topics.iter().zip(&estimates);
    // Seconds of the topic being packed when the limit was reached
    let mut carry = 0;

    'build: for (topic, &total) in pending.by_ref() {
        let mut remaining = total;
        let mut hours_before = 0.0;

        while remaining > 0 {
            if sessions.len() >= limit {
                carry = remaining;
                break 'build;
            }

            let space_left = capacity - current.filled_seconds;

            if space_left >= remaining {
                // The last slice takes whatever hours the earlier slices left
                current
                    .allocations
                    .push(TopicAllocation::remainder(topic, remaining, hours_before));
                current.filled_seconds += remaining;
                remaining = 0;
            } else if space_left > 0 {
                let slice = TopicAllocation::new(topic, space_left, true);
                hours_before += slice.allocated_hours;
                current.allocations.push(slice);
                current.filled_seconds += space_left;
                remaining -= space_left;
            }

            if current.filled_seconds as f64 >= full_at {
                sessions.push(std::mem::take(&mut current));
            }
        }
    }

    if !current.is_empty() {
        sessions.push(current);
    }

    // The limit is only ever hit right after a session closed, so counting
    // resumes from an empty session.
    let mut unbuilt = 0usize;
    let mut fill = 0;
    for seconds in std::iter::once(carry).chain(pending.map(|(_, &s)| s)) {
        if seconds == 0 {
            continue;
        }
        let (closed, left) = count_closed(fill, seconds, capacity, full_at);
        unbuilt = unbuilt.saturating_add(closed);
        fill = left;
    }
    if fill > 0 {
        unbuilt = unbuilt.saturating_add(1);
    }

    let allocation = Allocation {
        total: sessions.len().saturating_add(unbuilt),
        sessions,
    };

    tracing::debug!(
        "Allocated {} topics into {} sessions, {} built (capacity {:.3}h, threshold {})",
        topics.len(),
        allocation.total,
        allocation.sessions.len(),
        seconds_to_hours(capacity),
        options.fill_threshold
    );

    Ok(allocation)
}

/// Sessions closed by packing `seconds` of one topic on top of `fill`,
/// and the fill of the session left open afterwards
fn count_closed(fill: u64, seconds: u64, capacity: u64, full_at: f64) -> (usize, u64) {
    let space_left = capacity - fill;
    if seconds <= space_left {
        let fill = fill + seconds;
        return if fill as f64 >= full_at {
            (1, 0)
        } else {
            (0, fill)
        };
    }

    // Top up the open session, then fill whole sessions until a last slice
    // of at most one capacity is left.
    let rest = seconds - space_left;
    let whole = (rest - 1) / capacity;
    let last = rest - whole * capacity;
    let closed = usize::try_from(whole)
        .unwrap_or(usize::MAX)
        .saturating_add(1);

    if last as f64 >= full_at {
        (closed.saturating_add(1), 0)
    } else {
        (closed, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn topic(title: &str, hours: f64) -> Topic {
        Topic {
            unit_title: "Unit".into(),
            title: title.into(),
            hours,
            sections: vec![],
            difficulty: "core".into(),
            key_formulas: vec![],
            exam_tips: vec![],
        }
    }

    fn allocated_per_topic(sessions: &[AllocatedSession]) -> HashMap<String, u64> {
        let mut totals = HashMap::new();
        for session in sessions {
            for alloc in &session.allocations {
                *totals.entry(alloc.topic.title.clone()).or_insert(0) += alloc.allocated_seconds;
            }
        }
        totals
    }

    #[test]
    fn test_exact_fit_intensive() {
        crate::logging::init_test();
        let topics = vec![
            topic("A", 1.5),
            topic("B", 0.75),
            topic("C", 0.75),
            topic("D", 1.5),
        ];
        let options = AllocatorOptions::new(1.5, Pace::Intensive);

        let sessions = allocate_sessions(&topics, &options).unwrap();

        assert_eq!(sessions.len(), 3);
        assert!(sessions
            .iter()
            .flat_map(|s| &s.allocations)
            .all(|a| !a.partial));
        assert_eq!(sessions[1].allocations.len(), 2);
        assert!(sessions.iter().all(|s| s.filled_seconds == 5400));
    }

    #[test]
    fn test_split_topic_normal_pace() {
        let topics = vec![topic("Integration", 3.0)];
        let options = AllocatorOptions::new(1.5, Pace::Normal);

        let sessions = allocate_sessions(&topics, &options).unwrap();

        assert!(sessions.len() >= 3);
        let fragments: Vec<_> = sessions.iter().flat_map(|s| &s.allocations).collect();
        let (last, rest) = fragments.split_last().unwrap();
        assert!(rest.iter().all(|a| a.partial));
        assert!(!last.partial);

        let total: u64 = fragments.iter().map(|a| a.allocated_seconds).sum();
        assert_eq!(total, 3 * 3600);
        let hours: f64 = fragments.iter().map(|a| a.allocated_hours).sum();
        assert!((hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_conservation_across_mixed_topics() {
        let topics = vec![
            topic("A", 0.4),
            topic("B", 2.3),
            topic("C", 0.05),
            topic("D", 5.0),
            topic("E", 1.1),
        ];
        let options = AllocatorOptions::new(1.0, Pace::Relaxed);

        let sessions = allocate_sessions(&topics, &options).unwrap();
        let totals = allocated_per_topic(&sessions);

        for t in &topics {
            assert_eq!(totals[&t.title], hours_to_seconds(t.hours), "topic {}", t.title);
        }

        let capacity = options.capacity_seconds().unwrap();
        assert!(sessions.iter().all(|s| s.filled_seconds <= capacity));
    }

    #[test]
    fn test_small_topics_share_a_session() {
        let topics = vec![topic("A", 0.25), topic("B", 0.25), topic("C", 0.25)];
        let options = AllocatorOptions::new(1.5, Pace::Normal);

        let sessions = allocate_sessions(&topics, &options).unwrap();

        // Under-filled final session is still emitted
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].allocations.len(), 3);
        assert!((sessions[0].hours() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_fill_threshold_closes_nearly_full_session() {
        // 0.9 of 1.0h capacity reached by the first topic
        let topics = vec![topic("A", 0.95), topic("B", 0.5)];
        let options = AllocatorOptions::new(1.0, Pace::Intensive);

        let sessions = allocate_sessions(&topics, &options).unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].allocations.len(), 1);
        assert!(!sessions[1].allocations[0].partial);
    }

    #[test]
    fn test_custom_fill_threshold() {
        let topics = vec![topic("A", 0.5), topic("B", 0.5)];
        let mut options = AllocatorOptions::new(1.0, Pace::Intensive);
        options.fill_threshold = 0.5;

        let sessions = allocate_sessions(&topics, &options).unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_rejects_non_positive_hours() {
        let topics = vec![topic("Fine", 1.0), topic("Broken", 0.0)];
        let options = AllocatorOptions::new(1.5, Pace::Normal);

        let err = allocate_sessions(&topics, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidTopicHours { ref topic, .. } if topic == "Broken"));

        let negative = vec![topic("Negative", -2.0)];
        assert!(allocate_sessions(&negative, &options).is_err());

        let nan = vec![topic("NaN", f64::NAN)];
        assert!(allocate_sessions(&nan, &options).is_err());
    }

    #[test]
    fn test_rejects_invalid_capacity_and_threshold() {
        let topics = vec![topic("A", 1.0)];

        let zero = AllocatorOptions::new(0.0, Pace::Normal);
        assert!(matches!(
            allocate_sessions(&topics, &zero),
            Err(Error::InvalidCapacity(_))
        ));

        let mut options = AllocatorOptions::new(1.0, Pace::Normal);
        options.fill_threshold = 1.5;
        assert!(matches!(
            allocate_sessions(&topics, &options),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_off_grid_hours_are_conserved() {
        let topics = vec![topic("Odd", 1.23456789), topic("Tiny", 0.0001)];
        let options = AllocatorOptions::new(1.0, Pace::Normal);

        let sessions = allocate_sessions(&topics, &options).unwrap();

        for t in &topics {
            let hours: f64 = sessions
                .iter()
                .flat_map(|s| &s.allocations)
                .filter(|a| a.topic.title == t.title)
                .map(|a| a.allocated_hours)
                .sum();
            assert!((hours - t.hours).abs() < 1e-9, "topic {}", t.title);
        }

        // A sub-second estimate still takes a slot
        let tiny = sessions
            .iter()
            .flat_map(|s| &s.allocations)
            .find(|a| a.topic.title == "Tiny")
            .unwrap();
        assert_eq!(tiny.allocated_seconds, 1);
        assert!(!tiny.partial);
    }

    #[test]
    fn test_bounded_matches_unbounded() {
        let topics = vec![
            topic("A", 0.4),
            topic("B", 4.3),
            topic("C", 0.05),
            topic("D", 2.0),
            topic("E", 0.9),
            topic("F", 1.1),
        ];
        let options = AllocatorOptions::new(1.0, Pace::Relaxed);
        let full = allocate_sessions(&topics, &options).unwrap();

        for limit in 0..=full.len() + 1 {
            let bounded = allocate_bounded(&topics, &options, limit).unwrap();
            let built = limit.min(full.len());

            assert_eq!(bounded.total, full.len(), "limit {}", limit);
            assert_eq!(bounded.sessions, full[..built].to_vec(), "limit {}", limit);
        }
    }

    #[test]
    fn test_bounded_counts_huge_topic_without_building() {
        let topics = vec![topic("Everything", 2_000_000.0), topic("After", 0.5)];
        let options = AllocatorOptions::new(1.5, Pace::Normal);

        let allocation = allocate_bounded(&topics, &options, 42).unwrap();

        assert_eq!(allocation.sessions.len(), 42);
        assert!(allocation.sessions.iter().all(|s| s.filled_seconds == 4590));
        // 7_200_000_000 s fill 1_568_627 sessions of 4590 s, leaving 2070 s;
        // "After" (1800 s) joins that session, which then stays under 4131 s
        assert_eq!(allocation.total, 1_568_628);
    }

    #[test]
    fn test_no_topics_no_sessions() {
        let options = AllocatorOptions::new(1.5, Pace::Normal);
        let sessions = allocate_sessions(&[], &options).unwrap();
        assert!(sessions.is_empty());
    }
}
