//! Remote Progress Sync
//!
//! The seam between the local progress store and whatever mirrors it
//! remotely. Local state is the source of truth; a sync backend only ever
//! receives deltas and a dedicated reset, never a full-state overwrite.

use async_trait::async_trait;
use promptquest_common::NewPromptScore;
use serde::{Deserialize, Serialize};

/// A single mutation to mirror remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SyncOp {
    /// Signed XP delta as applied locally
    AwardXp { amount: i64 },
    CompleteModule {
        module_id: u32,
        badge_id: Option<String>,
    },
    /// Topic is already normalized
    RecordMistake { topic: String },
    PromptScore(NewPromptScore),
    Reset,
}

impl SyncOp {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SyncOp::AwardXp { .. } => "award_xp",
            SyncOp::CompleteModule { .. } => "complete_module",
            SyncOp::RecordMistake { .. } => "record_mistake",
            SyncOp::PromptScore(_) => "prompt_score",
            SyncOp::Reset => "reset",
        }
    }
}

/// Errors from a sync backend
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Progress snapshot as reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProgress {
    pub xp: u64,
    pub completed_modules: Vec<u32>,
}

/// Trait for remote mirrors of learner progress
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressSync: Send + Sync {
    /// Mirror one mutation. Failures are reported, never retried here.
    async fn push(&self, op: SyncOp) -> Result<(), SyncError>;
}
