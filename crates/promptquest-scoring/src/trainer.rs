//! Mini AI Trainer
//!
//! A toy classifier that "learns" item → category pairs from the learner
//! and predicts by exact lookup, then string similarity, then falling back
//! to the most common category. Each browser session gets its own model.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum similarity for a fuzzy match to be trusted
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.6;

/// Session used when the client does not send one
pub const DEFAULT_SESSION: &str = "default";

/// Errors from trainer operations
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("Training item must not be empty")]
    EmptyItem,

    #[error("Training category must not be empty")]
    EmptyCategory,
}

/// A learned example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub item: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainOutcome {
    pub success: bool,
    pub trained_item: String,
    pub trained_category: String,
    pub total_examples: usize,
    pub message: String,
    pub model_state: Vec<TrainingExample>,
}

/// How a prediction was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    None,
    ExactMatch,
    FuzzyMatch,
    MajorityVote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub success: bool,
    pub prediction: Option<String>,
    /// 0.0-1.0, two decimals
    pub confidence: f64,
    pub method: PredictionMethod,
    pub message: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelState {
    pub total_examples: usize,
    /// Category -> example count, in first-seen order
    pub categories: Vec<(String, usize)>,
    pub examples: Vec<TrainingExample>,
}

/// One session's model: examples in first-trained order
#[derive(Debug, Clone, Default)]
struct TrainerModel {
    examples: Vec<TrainingExample>,
}

impl TrainerModel {
    fn upsert(&mut self, item: String, category: String) {
        match self.examples.iter_mut().find(|e| e.item == item) {
            Some(existing) => existing.category = category,
            None => self.examples.push(TrainingExample { item, category }),
        }
    }

    fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for example in &self.examples {
            match counts.iter_mut().find(|(c, _)| *c == example.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((example.category.clone(), 1)),
            }
        }
        counts
    }

    fn predict(&self, raw_item: &str) -> Prediction {
        let shown = raw_item.trim();
        let item = shown.to_lowercase();

        if self.examples.is_empty() {
            return Prediction {
                success: false,
                prediction: None,
                confidence: 0.0,
                method: PredictionMethod::None,
                message: "❌ No training data yet. Add some examples first!".to_string(),
                explanation: "The model has no knowledge. You must train it first.".to_string(),
            };
        }

        if let Some(hit) = self.examples.iter().find(|e| e.item == item) {
            return Prediction {
                success: true,
                prediction: Some(hit.category.clone()),
                confidence: 1.0,
                method: PredictionMethod::ExactMatch,
                message: format!("✅ '{shown}' → {} (exact match!)", hit.category),
                explanation: "The model found this exact item in its training data.".to_string(),
            };
        }

        let mut best: Option<(&TrainingExample, f64)> = None;
        for example in &self.examples {
            let score = similarity(&item, &example.item);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((example, score));
            }
        }

        if let Some((example, score)) = best.filter(|(_, s)| *s > FUZZY_MATCH_THRESHOLD) {
            let pct = (score * 100.0).round();
            return Prediction {
                success: true,
                prediction: Some(example.category.clone()),
                confidence: round2(score),
                method: PredictionMethod::FuzzyMatch,
                message: format!(
                    "🤔 '{shown}' → {} (similar to '{}', {pct}% match)",
                    example.category, example.item
                ),
                explanation: format!(
                    "The model couldn't find '{shown}' exactly, but it's {pct}% similar to '{}' which belongs to {}.",
                    example.item, example.category
                ),
            };
        }

        let counts = self.category_counts();
        let (category, count) = counts
            .iter()
            .fold(None::<&(String, usize)>, |acc, entry| match acc {
                Some(top) if top.1 >= entry.1 => Some(top),
                _ => Some(entry),
            })
            .cloned()
            .unwrap_or_default();

        Prediction {
            success: true,
            prediction: Some(category.clone()),
            confidence: round2(count as f64 / self.examples.len() as f64),
            method: PredictionMethod::MajorityVote,
            message: format!(
                "❓ Unknown item. Guessing '{category}' (most common category in training data)"
            ),
            explanation: format!(
                "The model doesn't recognize '{shown}'. It falls back to the most common category ({category}) seen in training."
            ),
        }
    }

    fn state(&self) -> ModelState {
        ModelState {
            total_examples: self.examples.len(),
            categories: self.category_counts(),
            examples: self.examples.clone(),
        }
    }
}

/// Per-session trainer models
#[derive(Debug, Default)]
pub struct TrainerRegistry {
    models: DashMap<String, TrainerModel>,
}

impl TrainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Teach `item → category` to a session's model.
    ///
    /// Items are trimmed and lowercased; categories are trimmed and title-cased.
    /// Retraining an item replaces its category.
    pub fn train(&self, session: &str, item: &str, category: &str) -> Result<TrainOutcome, TrainerError> {
        let shown = item.trim();
        if shown.is_empty() {
            return Err(TrainerError::EmptyItem);
        }
        let category = title_case(category.trim());
        if category.is_empty() {
            return Err(TrainerError::EmptyCategory);
        }

        let mut model = self.models.entry(session.to_string()).or_default();
        model.upsert(shown.to_lowercase(), category.clone());
        debug!(session, item = shown, category = %category, "Trained example");

        Ok(TrainOutcome {
            success: true,
            trained_item: shown.to_string(),
            trained_category: category.clone(),
            total_examples: model.examples.len(),
            message: format!("✅ Model learned: {shown} → {category}"),
            model_state: model.examples.clone(),
        })
    }

    pub fn predict(&self, session: &str, item: &str) -> Prediction {
        self.models
            .get(session)
            .map(|model| model.predict(item))
            .unwrap_or_else(|| TrainerModel::default().predict(item))
    }

    pub fn state(&self, session: &str) -> ModelState {
        self.models
            .get(session)
            .map(|model| model.state())
            .unwrap_or_else(|| TrainerModel::default().state())
    }

    /// Forget everything a session's model learned
    pub fn reset(&self, session: &str) {
        self.models.remove(session);
    }

    /// Number of sessions with a model
    pub fn session_count(&self) -> usize {
        self.models.len()
    }
}

/// Ratcliff/Obershelp similarity: `2 * matched / (len_a + len_b)`.
///
/// Matches are found by taking the longest common substring (earliest on
/// ties) and recursing on the pieces to its left and right.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common substring as `(start_a, start_b, len)`
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let k = prev[j] + 1;
                row[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = row;
    }
    best
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
