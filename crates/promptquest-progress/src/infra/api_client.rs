//! PromptQuest API Client
//!
//! Typed HTTP client for the PromptQuest API server. Implements
//! [`ProgressSync`] so a progress store can mirror its mutations remotely.

use async_trait::async_trait;
use promptquest_common::{NewPromptScore, ScoreResult};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::remote::{ProgressSync, RemoteProgress, SyncError, SyncOp};
use crate::domain::analytics::{MistakeSummary, PromptHistoryResponse};

/// HTTP client for the PromptQuest API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, SyncError> {
        let url = self.url(path);
        debug!(%method, %url, "API request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        self.send(Method::GET, path, None)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let body = serde_json::to_value(body).map_err(|e| SyncError::Decode(e.to_string()))?;
        self.send(Method::POST, path, Some(body))
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }

    /// Server-side progress snapshot, for [`crate::ProgressStore::reconcile`]
    pub async fn fetch_progress(&self) -> Result<RemoteProgress, SyncError> {
        self.get_json("/api/progress").await
    }

    pub async fn fetch_summary(&self) -> Result<MistakeSummary, SyncError> {
        self.get_json("/api/analytics/summary").await
    }

    pub async fn fetch_prompt_history(&self) -> Result<PromptHistoryResponse, SyncError> {
        self.get_json("/api/analytics/prompt-history").await
    }

    /// Score a prompt server-side
    pub async fn score_prompt(&self, prompt: &str) -> Result<ScoreResult, SyncError> {
        self.post_json("/api/worlds/4/score", &json!({ "prompt": prompt }))
            .await
    }

    /// Liveness probe
    pub async fn is_healthy(&self) -> bool {
        matches!(
            self.http.get(self.url("/health")).send().await,
            Ok(resp) if resp.status() == StatusCode::OK
        )
    }
}

/// Method, path and body for a sync operation.
///
/// A reset touches two resources, so it maps to two requests.
pub(crate) fn requests_for(op: &SyncOp) -> Vec<(Method, &'static str, Option<serde_json::Value>)> {
    match op {
        SyncOp::AwardXp { amount } => vec![(
            Method::POST,
            "/api/progress/xp",
            Some(json!({ "amount": amount })),
        )],
        SyncOp::CompleteModule {
            module_id,
            badge_id,
        } => vec![(
            Method::POST,
            "/api/progress/complete",
            Some(json!({ "module_id": module_id, "badge_id": badge_id })),
        )],
        SyncOp::RecordMistake { topic } => vec![(
            Method::POST,
            "/api/analytics/mistake",
            Some(json!({ "topic": topic })),
        )],
        SyncOp::PromptScore(entry) => vec![(
            Method::POST,
            "/api/analytics/prompt-history",
            Some(prompt_score_body(entry)),
        )],
        SyncOp::Reset => vec![
            (Method::DELETE, "/api/progress/reset", None),
            (Method::DELETE, "/api/analytics/reset", None),
        ],
    }
}

fn prompt_score_body(entry: &NewPromptScore) -> serde_json::Value {
    serde_json::to_value(entry).unwrap_or_else(|_| json!({}))
}

#[async_trait]
impl ProgressSync for ApiClient {
    async fn push(&self, op: SyncOp) -> Result<(), SyncError> {
        for (method, path, body) in requests_for(&op) {
            self.send(method, path, body).await?;
        }
        Ok(())
    }
}
