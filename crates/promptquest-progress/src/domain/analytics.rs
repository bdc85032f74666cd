//! Learning Analytics
//!
//! Aggregations over a learner's mistakes and prompt history, used by the
//! analytics dashboard and returned by the analytics endpoints.

use promptquest_common::{Grade, PromptHistoryEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many weak topics get a suggestion
const MAX_SUGGESTIONS: usize = 3;

/// Topic -> remediation. Topics outside this table get no suggestion.
const TOPIC_SUGGESTIONS: &[(&str, &str)] = &[
    ("tokenization", "Practice World 3 — Tokenization Lab"),
    ("prediction", "Try World 2 — Prediction Engine again"),
    ("pattern", "Revisit World 1 — Pattern Intelligence"),
    ("prompt", "Head to World 4 or the Prompt Engineering Dashboard"),
    ("hallucination", "Practice World 5 — Hallucination Detective"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub topic: String,
    pub mistakes: u32,
    pub action: String,
}

/// Mistake overview for the analytics dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeSummary {
    pub mistakes: BTreeMap<String, u32>,
    pub total_mistakes: u32,
    /// Topic with the most mistakes; alphabetical first on ties
    pub weakest_topic: Option<String>,
    pub suggestions: Vec<Suggestion>,
}

impl MistakeSummary {
    pub fn from_counts(counts: &BTreeMap<String, u32>) -> Self {
        let total_mistakes = counts.values().sum();

        // stable sort keeps alphabetical order among equal counts
        let mut ranked: Vec<(&String, &u32)> = counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1));

        let weakest_topic = ranked.first().map(|(topic, _)| (*topic).clone());

        let suggestions = ranked
            .iter()
            .take(MAX_SUGGESTIONS)
            .filter(|(_, count)| **count > 0)
            .filter_map(|(topic, count)| {
                TOPIC_SUGGESTIONS
                    .iter()
                    .find(|(known, _)| known == topic)
                    .map(|(_, action)| Suggestion {
                        topic: (*topic).clone(),
                        mistakes: **count,
                        action: action.to_string(),
                    })
            })
            .collect();

        Self {
            mistakes: counts.clone(),
            total_mistakes,
            weakest_topic,
            suggestions,
        }
    }
}

/// Direction of the learner's last few prompt scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Steady,
}

impl Trend {
    /// Compare the newest of the last three scores against the oldest of them
    pub fn from_history(history: &[PromptHistoryEntry]) -> Self {
        if history.len() < 3 {
            return Trend::Steady;
        }
        let recent = &history[history.len() - 3..];
        let first = recent[0].score;
        let last = recent[2].score;
        if last > first {
            Trend::Improving
        } else if last < first {
            Trend::Declining
        } else {
            Trend::Steady
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: u32,
    pub y: u8,
    pub grade: Grade,
}

/// Summary statistics over prompt history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptHistoryStats {
    pub count: usize,
    pub best: u8,
    pub worst: u8,
    /// Mean score, one decimal
    pub average: f64,
    pub trend: Trend,
    pub chart_data: Vec<ChartPoint>,
}

impl PromptHistoryStats {
    /// `None` for an empty history
    pub fn from_history(history: &[PromptHistoryEntry]) -> Option<Self> {
        let best = history.iter().map(|h| h.score).max()?;
        let worst = history.iter().map(|h| h.score).min()?;

        Some(Self {
            count: history.len(),
            best,
            worst,
            average: average_score(history),
            trend: Trend::from_history(history),
            chart_data: history
                .iter()
                .map(|h| ChartPoint {
                    x: h.sequence_index,
                    y: h.score,
                    grade: h.grade,
                })
                .collect(),
        })
    }
}

/// Mean score rounded to one decimal, 0.0 for an empty history
pub fn average_score(history: &[PromptHistoryEntry]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let sum: u32 = history.iter().map(|h| h.score as u32).sum();
    let mean = sum as f64 / history.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Body of `GET /api/analytics/prompt-history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptHistoryResponse {
    pub history: Vec<PromptHistoryEntry>,
    pub stats: Option<PromptHistoryStats>,
}

impl PromptHistoryResponse {
    pub fn from_history(history: &[PromptHistoryEntry]) -> Self {
        Self {
            history: history.to_vec(),
            stats: PromptHistoryStats::from_history(history),
        }
    }
}

/// Body of `POST /api/analytics/prompt-history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptHistorySaved {
    pub saved: bool,
    pub entry: PromptHistoryEntry,
    pub history_count: usize,
    pub best_score: u8,
    pub average_score: f64,
    pub trend: Trend,
}
