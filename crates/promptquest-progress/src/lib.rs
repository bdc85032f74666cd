//! # PromptQuest Progress
//!
//! The learner progress engine: XP, completed worlds, badges, mistake
//! analytics and prompt history, persisted locally and mirrored to the API
//! server on a best-effort basis.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                ProgressStore                 │
//! │   mutate in memory → persist → spawn sync    │
//! │        │                        │            │
//! │  ┌─────┴──────┐         ┌───────┴───────┐    │
//! │  │  KvStore   │         │ ProgressSync  │    │
//! │  │ memory/file│         │  (ApiClient)  │    │
//! │  └────────────┘         └───────────────┘    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Local state is the source of truth. Sync failures are logged and the
//! local copy kept.

pub mod config;
pub mod domain;
pub mod infra;

use promptquest_common::PromptQuestError;
use std::sync::Arc;
use tracing::info;

pub use config::ProgressConfig;
pub use domain::analytics::{
    average_score, ChartPoint, MistakeSummary, PromptHistoryResponse, PromptHistorySaved,
    PromptHistoryStats, Suggestion, Trend,
};
pub use domain::store::{keys, MistakeRecorded, ModuleCompletion, ProgressStore};
pub use infra::api_client::ApiClient;
pub use infra::kv_store::{FileKv, InMemoryKv, KvStore, StoreError};
pub use infra::remote::{ProgressSync, RemoteProgress, SyncError, SyncOp};

/// Default directory for persisted progress
pub const DEFAULT_DATA_DIR: &str = ".promptquest";

/// Default API server address
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

impl From<StoreError> for PromptQuestError {
    fn from(err: StoreError) -> Self {
        PromptQuestError::Storage(err.to_string())
    }
}

impl From<SyncError> for PromptQuestError {
    fn from(err: SyncError) -> Self {
        PromptQuestError::Network(err.to_string())
    }
}

/// Open a client-side file-backed store per `cfg`, with an API mirror when enabled
pub fn open_configured(cfg: &ProgressConfig) -> Result<ProgressStore, PromptQuestError> {
    let kv = FileKv::open(&cfg.data_dir)?;

    let sync: Option<Arc<dyn ProgressSync>> = if cfg.sync_enabled {
        let client = ApiClient::new(&cfg.api_base_url, cfg.request_timeout())?;
        info!(url = %client.base_url(), "Remote progress sync enabled");
        Some(Arc::new(client))
    } else {
        None
    };

    Ok(ProgressStore::open(Arc::new(kv), sync))
}
