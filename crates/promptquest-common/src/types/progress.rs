//! Learner progress state
//!
//! `ProgressState` is plain data. All mutation goes through the progress
//! store, which owns persistence and sync; the helpers here only enforce
//! the collection invariants (unique modules and badges, counts >= 1,
//! append-only history).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::level::{resolve_level, LevelStatus};
use super::score::{Grade, ScoreResult};

/// Normalize a free-text mistake topic.
///
/// The single boundary where topic keys are produced: trim, then lowercase.
/// Returns `None` for blank input.
pub fn normalize_topic(topic: &str) -> Option<String> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// A prompt score submitted for recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPromptScore {
    #[serde(rename = "prompt")]
    pub prompt_text: String,
    pub score: u8,
    pub grade: Grade,
    pub grade_label: String,
}

impl NewPromptScore {
    /// Build a submission from a scorer result
    pub fn from_result(prompt_text: impl Into<String>, result: &ScoreResult) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            score: result.total_score,
            grade: result.grade,
            grade_label: result.grade_label.clone(),
        }
    }
}

/// A recorded prompt score. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptHistoryEntry {
    #[serde(rename = "prompt")]
    pub prompt_text: String,
    pub score: u8,
    pub grade: Grade,
    pub grade_label: String,
    pub timestamp: DateTime<Utc>,
    /// 1-based position at insertion time
    #[serde(rename = "index")]
    pub sequence_index: u32,
}

/// Cumulative progress for one learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub experience_points: u64,
    /// Completed world ids in completion order
    pub completed_modules: Vec<u32>,
    /// Earned badge ids in award order
    pub badges: Vec<String>,
    /// Normalized topic -> count (always >= 1)
    pub mistake_counts: BTreeMap<String, u32>,
    pub prompt_history: Vec<PromptHistoryEntry>,
    pub display_name: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            experience_points: 0,
            completed_modules: Vec::new(),
            badges: Vec::new(),
            mistake_counts: BTreeMap::new(),
            prompt_history: Vec::new(),
            display_name: crate::DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}

impl ProgressState {
    /// Apply a signed XP delta, saturating at zero
    pub fn apply_xp(&mut self, amount: i64) {
        self.experience_points = if amount >= 0 {
            self.experience_points.saturating_add(amount as u64)
        } else {
            self.experience_points.saturating_sub(amount.unsigned_abs())
        };
    }

    /// Insert a module id if absent. Returns whether it was new.
    pub fn insert_module(&mut self, module_id: u32) -> bool {
        if self.completed_modules.contains(&module_id) {
            false
        } else {
            self.completed_modules.push(module_id);
            true
        }
    }

    /// Insert a badge id if absent. Returns whether it was new.
    pub fn insert_badge(&mut self, badge_id: &str) -> bool {
        if self.badges.iter().any(|b| b == badge_id) {
            false
        } else {
            self.badges.push(badge_id.to_string());
            true
        }
    }

    /// Increment an already-normalized topic, returning the new count
    pub fn bump_mistake(&mut self, topic: String) -> u32 {
        let count = self.mistake_counts.entry(topic).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Append a prompt score stamped with `now`.
    ///
    /// The sequence index is computed from the current length immediately
    /// before the push, so it is always `len + 1`.
    pub fn push_prompt_score(&mut self, entry: NewPromptScore, now: DateTime<Utc>) -> &PromptHistoryEntry {
        let sequence_index = self.prompt_history.len() as u32 + 1;
        let prompt_text: String = entry
            .prompt_text
            .chars()
            .take(crate::MAX_PROMPT_HISTORY_CHARS)
            .collect();

        self.prompt_history.push(PromptHistoryEntry {
            prompt_text,
            score: entry.score.min(crate::MAX_PROMPT_SCORE),
            grade: entry.grade,
            grade_label: entry.grade_label,
            timestamp: now,
            sequence_index,
        });

        &self.prompt_history[self.prompt_history.len() - 1]
    }

    /// Restore the collection invariants on state loaded from outside.
    ///
    /// Drops duplicate modules and badges, re-normalizes mistake topics
    /// (merging keys that collide, dropping blank topics and zero counts)
    /// and renumbers prompt history by position. Returns whether anything
    /// changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;

        let mut modules = Vec::with_capacity(self.completed_modules.len());
        for &module_id in &self.completed_modules {
            if !modules.contains(&module_id) {
                modules.push(module_id);
            }
        }
        changed |= modules.len() != self.completed_modules.len();
        self.completed_modules = modules;

        let mut badges: Vec<String> = Vec::with_capacity(self.badges.len());
        for badge in &self.badges {
            let badge = badge.trim();
            if !badge.is_empty() && !badges.iter().any(|b| b == badge) {
                badges.push(badge.to_string());
            }
        }
        changed |= badges != self.badges;
        self.badges = badges;

        let mut counts = BTreeMap::new();
        for (topic, &count) in &self.mistake_counts {
            if count == 0 {
                continue;
            }
            if let Some(topic) = normalize_topic(topic) {
                let total: &mut u32 = counts.entry(topic).or_insert(0);
                *total = total.saturating_add(count);
            }
        }
        changed |= counts != self.mistake_counts;
        self.mistake_counts = counts;

        for (position, entry) in self.prompt_history.iter_mut().enumerate() {
            let sequence_index = position as u32 + 1;
            let score = entry.score.min(crate::MAX_PROMPT_SCORE);
            if entry.sequence_index != sequence_index || entry.score != score {
                entry.sequence_index = sequence_index;
                entry.score = score;
                changed = true;
            }
        }

        changed
    }

    /// Zero everything except the display name
    pub fn clear_progress(&mut self) {
        self.experience_points = 0;
        self.completed_modules.clear();
        self.badges.clear();
        self.mistake_counts.clear();
        self.prompt_history.clear();
    }

    /// Whether there is no progress at all
    pub fn is_empty(&self) -> bool {
        self.experience_points == 0
            && self.completed_modules.is_empty()
            && self.badges.is_empty()
            && self.mistake_counts.is_empty()
            && self.prompt_history.is_empty()
    }

    /// Current position on the level ladder
    pub fn level(&self) -> LevelStatus {
        resolve_level(self.experience_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u8) -> NewPromptScore {
        NewPromptScore {
            prompt_text: "x".to_string(),
            score,
            grade: Grade::from_total(score),
            grade_label: Grade::from_total(score).label().to_string(),
        }
    }

    #[test]
    fn test_normalize_topic() {
        assert_eq!(normalize_topic("Tokenization"), Some("tokenization".to_string()));
        assert_eq!(normalize_topic("  tokenization "), Some("tokenization".to_string()));
        assert_eq!(normalize_topic("   "), None);
    }

    #[test]
    fn test_apply_xp_saturates_at_zero() {
        let mut state = ProgressState::default();
        state.apply_xp(40);
        state.apply_xp(-100);
        assert_eq!(state.experience_points, 0);
    }

    #[test]
    fn test_module_and_badge_idempotent() {
        let mut state = ProgressState::default();
        assert!(state.insert_module(5));
        assert!(!state.insert_module(5));
        assert!(state.insert_badge("badge_x"));
        assert!(!state.insert_badge("badge_x"));
        assert_eq!(state.completed_modules, vec![5]);
        assert_eq!(state.badges, vec!["badge_x".to_string()]);
    }

    #[test]
    fn test_sequence_index_increments() {
        let mut state = ProgressState::default();
        let now = Utc::now();
        assert_eq!(state.push_prompt_score(entry(82), now).sequence_index, 1);
        assert_eq!(state.push_prompt_score(entry(40), now).sequence_index, 2);
        assert_eq!(state.prompt_history.len(), 2);
    }

    #[test]
    fn test_prompt_text_truncated() {
        let mut state = ProgressState::default();
        let mut long = entry(50);
        long.prompt_text = "é".repeat(500);
        let stored = state.push_prompt_score(long, Utc::now());
        assert_eq!(stored.prompt_text.chars().count(), crate::MAX_PROMPT_HISTORY_CHARS);
    }

    #[test]
    fn test_clear_keeps_display_name() {
        let mut state = ProgressState::default();
        state.display_name = "Ada".to_string();
        state.apply_xp(300);
        state.insert_module(1);
        state.bump_mistake("prompt".to_string());
        state.push_prompt_score(entry(10), Utc::now());

        state.clear_progress();

        assert!(state.is_empty());
        assert_eq!(state.display_name, "Ada");
    }

    #[test]
    fn test_repair_restores_invariants() {
        let mut state = ProgressState::default();
        state.completed_modules = vec![3, 1, 3];
        state.badges = vec!["token_master".to_string(), " ".to_string(), "token_master".to_string()];
        state.mistake_counts = BTreeMap::from([
            ("Foo ".to_string(), 0),
            (" Prompt".to_string(), 2),
            ("prompt".to_string(), 1),
            ("   ".to_string(), 4),
        ]);
        let now = Utc::now();
        state.push_prompt_score(entry(40), now);
        state.push_prompt_score(entry(60), now);
        state.prompt_history[0].sequence_index = 7;
        state.prompt_history[1].sequence_index = 7;

        assert!(state.repair());

        assert_eq!(state.completed_modules, vec![3, 1]);
        assert_eq!(state.badges, vec!["token_master".to_string()]);
        assert_eq!(state.mistake_counts, BTreeMap::from([("prompt".to_string(), 3)]));
        let indices: Vec<u32> = state.prompt_history.iter().map(|h| h.sequence_index).collect();
        assert_eq!(indices, vec![1, 2]);

        assert!(!state.repair());
    }

    #[test]
    fn test_history_wire_format() {
        let mut state = ProgressState::default();
        state.push_prompt_score(entry(82), Utc::now());
        let json = serde_json::to_value(&state.prompt_history[0]).unwrap();
        assert_eq!(json["prompt"], "x");
        assert_eq!(json["index"], 1);
        assert_eq!(json["grade"], "A");
    }
}
