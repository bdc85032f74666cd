//! # PromptQuest Common
//!
//! Shared types, errors, and level tiers for the PromptQuest learning platform.
//!
//! ## Core Types
//!
//! - [`ProgressState`]: the learner's cumulative progress (XP, worlds, badges, mistakes, prompt history)
//! - [`PromptHistoryEntry`]: one scored prompt in the learner's history
//! - [`LevelTier`]/[`LevelStatus`]: the ten-tier XP ladder and the resolved position on it
//! - [`ScoreResult`]/[`Grade`]: the rubric output of the prompt scorer
//! - [`Badge`]: the fixed achievement catalogue

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{PromptQuestError, Result};
pub use types::{
    badge::{badge_by_id, Badge, BADGES},
    level::{resolve_level, LevelStatus, LevelTier, LEVEL_TIERS},
    progress::{normalize_topic, NewPromptScore, ProgressState, PromptHistoryEntry},
    score::{Grade, ScoreBreakdown, ScoreResult},
};

/// PromptQuest version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder display name for a learner who has not picked one
pub const DEFAULT_DISPLAY_NAME: &str = "Explorer";

/// Maximum characters of prompt text kept in history
pub const MAX_PROMPT_HISTORY_CHARS: usize = 200;

/// Maximum total prompt score
pub const MAX_PROMPT_SCORE: u8 = 100;
