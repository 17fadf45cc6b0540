//! Topic flattening for curriculum outlines.
//!
//! Turns the nested unit/topic outline into a single ordered list of topics,
//! preserving curriculum order (unit-major, then topic order within a unit).

use crate::types::default_difficulty;
use crate::{ContentOutline, Result, Topic};
use std::path::Path;

/// Unit title used for synthesized placeholder topics
pub const PLACEHOLDER_UNIT: &str = "Study";

/// Flatten an outline into study topics
///
/// When the outline holds no topics at all, `placeholder_count` generic
/// topics titled "Session 1".."Session N" are synthesized instead, each sized
/// at `hours_per_session`. An empty outline is never an error.
pub fn flatten_topics(
    outline: &ContentOutline,
    placeholder_count: usize,
    hours_per_session: f64,
) -> Vec<Topic> {
    let topics: Vec<Topic> = outline
        .units
        .iter()
        .flat_map(|unit| {
            unit.topics.iter().map(move |topic| Topic {
                unit_title: unit.title.clone(),
                title: topic.title.clone(),
                hours: topic.hours,
                sections: topic.sections.clone(),
                difficulty: topic.difficulty.clone(),
                key_formulas: topic.key_formulas.clone(),
                exam_tips: topic.exam_tips.clone(),
            })
        })
        .collect();

    if !topics.is_empty() {
        tracing::debug!(
            "Flattened {} topics from {} units",
            topics.len(),
            outline.units.len()
        );
        return topics;
    }

    tracing::info!(
        "Outline has no topics, synthesizing {} placeholder sessions",
        placeholder_count
    );

    (0..placeholder_count)
        .map(|i| Topic {
            unit_title: PLACEHOLDER_UNIT.into(),
            title: format!("Session {}", i + 1),
            hours: hours_per_session,
            sections: vec![],
            difficulty: default_difficulty(),
            key_formulas: vec![],
            exam_tips: vec![],
        })
        .collect()
}

/// Load a content outline from a JSON file
///
/// Accepts either a bare outline (`{"units": [...]}`) or a product document
/// wrapping it under `content_json`.
pub fn load_outline(path: &Path) -> Result<ContentOutline> {
    let contents = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;

    let outline = match value.get("content_json") {
        Some(inner) => {
            let mut outline: ContentOutline = serde_json::from_value(inner.clone())?;
            if outline.title.is_none() {
                outline.title = value
                    .get("title")
                    .and_then(|t| t.as_str())
                    .map(str::to_string);
            }
            outline
        }
        None => serde_json::from_value(value)?,
    };

    tracing::info!(
        "Loaded outline from {:?}: {} units, {} topics",
        path,
        outline.units.len(),
        outline.topic_count()
    );
    Ok(outline)
}
