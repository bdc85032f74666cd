//! Progress Store
//!
//! Single owner of a learner's [`ProgressState`]. Every mutation is applied
//! to memory first, persisted to the key/value backend, and then mirrored
//! to the sync backend by a detached task. Persistence and sync failures
//! are logged, never returned: local state stays authoritative.

use chrono::Utc;
use promptquest_common::{
    normalize_topic, LevelStatus, NewPromptScore, ProgressState, PromptHistoryEntry,
    DEFAULT_DISPLAY_NAME,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::analytics::{MistakeSummary, PromptHistoryStats};
use crate::infra::kv_store::KvStore;
use crate::infra::remote::{ProgressSync, RemoteProgress, SyncOp};

/// Persisted key names
pub mod keys {
    pub const XP: &str = "pq_xp";
    pub const WORLDS: &str = "pq_worlds";
    pub const BADGES: &str = "pq_badges";
    pub const NAME: &str = "pq_name";
    pub const MISTAKES: &str = "pq_mistakes";
    pub const PROMPT_HISTORY: &str = "pq_prompt_history";

    /// Every key the store owns
    pub const ALL: [&str; 6] = [XP, WORLDS, BADGES, NAME, MISTAKES, PROMPT_HISTORY];
}

/// What a module completion changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleCompletion {
    pub newly_completed: bool,
    pub badge_awarded: bool,
}

/// A counted mistake, keyed by its normalized topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistakeRecorded {
    pub topic: String,
    pub count: u32,
}

/// Learner progress store
pub struct ProgressStore {
    state: ProgressState,
    kv: Arc<dyn KvStore>,
    sync: Option<Arc<dyn ProgressSync>>,
    pending: Vec<JoinHandle<()>>,
}

impl ProgressStore {
    /// Load persisted state. Each key falls back to its default on its own
    /// when missing or unreadable.
    pub fn open(kv: Arc<dyn KvStore>, sync: Option<Arc<dyn ProgressSync>>) -> Self {
        let defaults = ProgressState::default();
        let mut state = ProgressState {
            experience_points: load_key(kv.as_ref(), keys::XP)
                .unwrap_or(defaults.experience_points),
            completed_modules: load_key(kv.as_ref(), keys::WORLDS)
                .unwrap_or(defaults.completed_modules),
            badges: load_key(kv.as_ref(), keys::BADGES).unwrap_or(defaults.badges),
            mistake_counts: load_key(kv.as_ref(), keys::MISTAKES)
                .unwrap_or(defaults.mistake_counts),
            prompt_history: load_key(kv.as_ref(), keys::PROMPT_HISTORY)
                .unwrap_or(defaults.prompt_history),
            display_name: load_key(kv.as_ref(), keys::NAME).unwrap_or(defaults.display_name),
        };
        let repaired = state.repair();

        info!(
            xp = state.experience_points,
            modules = state.completed_modules.len(),
            history = state.prompt_history.len(),
            sync = sync.is_some(),
            "Progress store opened"
        );

        let store = Self {
            state,
            kv,
            sync,
            pending: Vec::new(),
        };
        if repaired {
            warn!("Persisted progress broke collection invariants; repaired");
            store.persist(keys::WORLDS, &store.state.completed_modules);
            store.persist(keys::BADGES, &store.state.badges);
            store.persist(keys::MISTAKES, &store.state.mistake_counts);
            store.persist(keys::PROMPT_HISTORY, &store.state.prompt_history);
        }
        store
    }

    /// Store with no remote mirror
    pub fn local(kv: Arc<dyn KvStore>) -> Self {
        Self::open(kv, None)
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn xp(&self) -> u64 {
        self.state.experience_points
    }

    pub fn level(&self) -> LevelStatus {
        self.state.level()
    }

    pub fn mistake_summary(&self) -> MistakeSummary {
        MistakeSummary::from_counts(&self.state.mistake_counts)
    }

    pub fn prompt_history_stats(&self) -> Option<PromptHistoryStats> {
        PromptHistoryStats::from_history(&self.state.prompt_history)
    }

    /// Add (or subtract) XP, saturating at zero. Returns the new total.
    pub fn award_xp(&mut self, amount: i64) -> u64 {
        let before = self.state.experience_points;
        self.state.apply_xp(amount);
        let after = self.state.experience_points;

        if after == before {
            return after;
        }
        debug!(amount, xp = after, "XP awarded");
        self.persist(keys::XP, &after);

        let applied = if after > before {
            i64::try_from(after - before).unwrap_or(i64::MAX)
        } else {
            i64::try_from(before - after).map(|d| -d).unwrap_or(i64::MIN)
        };
        self.spawn_sync(SyncOp::AwardXp { amount: applied });
        after
    }

    /// Mark a module complete, optionally awarding a badge. Idempotent.
    ///
    /// The remote mirror is told about every completion, repeated ones
    /// included, so a missed earlier sync gets repaired.
    pub fn complete_module(&mut self, module_id: u32, badge_id: Option<&str>) -> ModuleCompletion {
        let newly_completed = self.state.insert_module(module_id);
        let badge_awarded = badge_id
            .map(|badge| self.state.insert_badge(badge))
            .unwrap_or(false);

        if newly_completed {
            debug!(module_id, "Module completed");
            self.persist(keys::WORLDS, &self.state.completed_modules);
        }
        if badge_awarded {
            debug!(badge = ?badge_id, "Badge awarded");
            self.persist(keys::BADGES, &self.state.badges);
        }

        self.spawn_sync(SyncOp::CompleteModule {
            module_id,
            badge_id: badge_id.map(str::to_string),
        });

        ModuleCompletion {
            newly_completed,
            badge_awarded,
        }
    }

    /// Count a mistake against a topic. Blank topics are ignored.
    ///
    /// Returns the normalized topic and its new count.
    pub fn record_mistake(&mut self, topic: &str) -> Option<MistakeRecorded> {
        let Some(topic) = normalize_topic(topic) else {
            debug!("Ignoring mistake with blank topic");
            return None;
        };

        let count = self.state.bump_mistake(topic.clone());
        debug!(%topic, count, "Mistake recorded");
        self.persist(keys::MISTAKES, &self.state.mistake_counts);
        self.spawn_sync(SyncOp::RecordMistake {
            topic: topic.clone(),
        });
        Some(MistakeRecorded { topic, count })
    }

    /// Append a scored prompt to history, stamped now
    pub fn append_prompt_score(&mut self, entry: NewPromptScore) -> PromptHistoryEntry {
        let stored = self
            .state
            .push_prompt_score(entry.clone(), Utc::now())
            .clone();

        debug!(
            index = stored.sequence_index,
            score = stored.score,
            "Prompt score recorded"
        );
        self.persist(keys::PROMPT_HISTORY, &self.state.prompt_history);
        self.spawn_sync(SyncOp::PromptScore(entry));
        stored
    }

    /// Zero all progress and clear persisted keys. The display name stays
    /// in memory but its key is cleared like the rest.
    pub fn reset_progress(&mut self) {
        self.state.clear_progress();

        for key in keys::ALL {
            if let Err(e) = self.kv.remove(key) {
                warn!(key, error = %e, "Failed to clear persisted key");
            }
        }

        info!("Progress reset");
        self.spawn_sync(SyncOp::Reset);
    }

    /// Clear mistakes and prompt history only. Local to this store.
    pub fn reset_analytics(&mut self) {
        self.state.mistake_counts.clear();
        self.state.prompt_history.clear();

        for key in [keys::MISTAKES, keys::PROMPT_HISTORY] {
            if let Err(e) = self.kv.remove(key) {
                warn!(key, error = %e, "Failed to clear persisted key");
            }
        }
        info!("Analytics reset");
    }

    /// Set the display name; blank input restores the default
    pub fn set_display_name(&mut self, name: &str) {
        let name = name.trim();
        self.state.display_name = if name.is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            name.to_string()
        };
        self.persist(keys::NAME, &self.state.display_name);
    }

    /// Merge a remote snapshot: XP takes the maximum, modules are unioned.
    ///
    /// Never lowers local state and never syncs back. Returns whether
    /// anything changed.
    pub fn reconcile(&mut self, remote: &RemoteProgress) -> bool {
        let mut changed = false;

        if remote.xp > self.state.experience_points {
            self.state.experience_points = remote.xp;
            self.persist(keys::XP, &remote.xp);
            changed = true;
        }

        let mut modules_changed = false;
        for &module_id in &remote.completed_modules {
            modules_changed |= self.state.insert_module(module_id);
        }
        if modules_changed {
            self.persist(keys::WORLDS, &self.state.completed_modules);
            changed = true;
        }

        if changed {
            info!(
                xp = self.state.experience_points,
                modules = self.state.completed_modules.len(),
                "Reconciled with remote progress"
            );
        }
        changed
    }

    /// Wait for every in-flight sync task
    pub async fn flush_pending(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Sync task aborted");
            }
        }
    }

    /// Number of sync tasks not yet finished
    pub fn pending_syncs(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|json| self.kv.set(key, &json).map_err(|e| e.to_string()));

        if let Err(error) = result {
            warn!(key, %error, "Failed to persist progress");
        }
    }

    fn spawn_sync(&mut self, op: SyncOp) {
        let Some(sync) = self.sync.clone() else {
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(op = op.kind(), "No async runtime; skipping remote sync");
            return;
        };

        self.pending.retain(|h| !h.is_finished());

        let kind = op.kind();
        self.pending.push(runtime.spawn(async move {
            match sync.push(op).await {
                Ok(()) => debug!(op = kind, "Remote sync complete"),
                Err(e) => warn!(op = kind, error = %e, "Remote sync failed; keeping local state"),
            }
        }));
    }
}

/// Read and decode one key; `None` (with a warning for bad data) on failure
fn load_key<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted key; using default");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Corrupt persisted value; using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::kv_store::InMemoryKv;
    use crate::infra::remote::{MockProgressSync, SyncError};
    use promptquest_common::Grade;

    fn new_store() -> (ProgressStore, Arc<InMemoryKv>) {
        let kv = Arc::new(InMemoryKv::new());
        (ProgressStore::local(kv.clone()), kv)
    }

    fn with_sync(kv: Arc<InMemoryKv>, mock: MockProgressSync) -> ProgressStore {
        let sync: Arc<dyn ProgressSync> = Arc::new(mock);
        ProgressStore::open(kv, Some(sync))
    }

    fn scored(prompt: &str, score: u8) -> NewPromptScore {
        NewPromptScore {
            prompt_text: prompt.to_string(),
            score,
            grade: Grade::from_total(score),
            grade_label: Grade::from_total(score).label().to_string(),
        }
    }

    #[test]
    fn test_award_xp_walks_levels() {
        let (mut store, kv) = new_store();

        store.award_xp(100);
        let level = store.level();
        assert_eq!(level.tier.level, 2);
        assert_eq!(level.tier.title, "Explorer");
        assert_eq!(level.progress, 0);

        store.award_xp(150);
        let level = store.level();
        assert_eq!(level.tier.level, 3);
        assert_eq!(level.tier.title, "Learner");
        assert_eq!(level.progress, 0);

        assert_eq!(kv.get(keys::XP).unwrap().as_deref(), Some("250"));
    }

    #[test]
    fn test_negative_xp_floors_at_zero() {
        let (mut store, _) = new_store();
        store.award_xp(30);
        assert_eq!(store.award_xp(-500), 0);
    }

    #[test]
    fn test_complete_module_idempotent() {
        let (mut store, _) = new_store();

        let first = store.complete_module(5, Some("badge_x"));
        assert!(first.newly_completed && first.badge_awarded);

        let second = store.complete_module(5, Some("badge_x"));
        assert!(!second.newly_completed && !second.badge_awarded);

        assert_eq!(store.state().completed_modules, vec![5]);
        assert_eq!(store.state().badges, vec!["badge_x".to_string()]);
    }

    #[test]
    fn test_mistake_topics_normalized() {
        let (mut store, _) = new_store();
        let first = store.record_mistake("Tokenization").unwrap();
        assert_eq!(first.topic, "tokenization");
        assert_eq!(first.count, 1);
        assert_eq!(store.record_mistake("tokenization ").map(|m| m.count), Some(2));
        assert_eq!(store.record_mistake("   "), None);

        assert_eq!(store.state().mistake_counts.len(), 1);
        assert_eq!(store.state().mistake_counts["tokenization"], 2);
    }

    #[test]
    fn test_prompt_history_indices() {
        let (mut store, _) = new_store();
        store.append_prompt_score(scored("Explain AI", 36));
        let second = store.append_prompt_score(scored("You are a tutor...", 82));

        assert_eq!(store.state().prompt_history.len(), 2);
        assert_eq!(second.sequence_index, 2);
        assert_eq!(store.prompt_history_stats().unwrap().best, 82);
    }

    #[test]
    fn test_reset_clears_state_and_keys() {
        let (mut store, kv) = new_store();
        store.set_display_name("Ada");
        store.award_xp(300);
        store.complete_module(1, Some("ai_explorer"));
        store.record_mistake("prompt");
        store.append_prompt_score(scored("x", 10));
        assert!(!kv.is_empty());

        store.reset_progress();

        assert!(store.state().is_empty());
        assert_eq!(store.state().display_name, "Ada");
        assert!(kv.is_empty());
        for key in keys::ALL {
            assert_eq!(kv.get(key).unwrap(), None);
        }
    }

    #[test]
    fn test_reset_analytics_keeps_progress() {
        let (mut store, kv) = new_store();
        store.award_xp(40);
        store.record_mistake("prompt");
        store.append_prompt_score(scored("x", 10));

        store.reset_analytics();

        assert_eq!(store.xp(), 40);
        assert!(store.state().mistake_counts.is_empty());
        assert!(store.state().prompt_history.is_empty());
        assert_eq!(kv.get(keys::MISTAKES).unwrap(), None);
        assert!(kv.get(keys::XP).unwrap().is_some());
    }

    #[test]
    fn test_reload_from_kv() {
        let kv = Arc::new(InMemoryKv::new());
        {
            let mut store = ProgressStore::local(kv.clone());
            store.award_xp(120);
            store.complete_module(2, Some("prediction_pro"));
            store.record_mistake("pattern");
            store.set_display_name("  Grace ");
        }

        let store = ProgressStore::local(kv);
        assert_eq!(store.xp(), 120);
        assert_eq!(store.state().completed_modules, vec![2]);
        assert_eq!(store.state().badges, vec!["prediction_pro".to_string()]);
        assert_eq!(store.state().mistake_counts["pattern"], 1);
        assert_eq!(store.state().display_name, "Grace");
    }

    #[test]
    fn test_corrupt_key_falls_back_alone() {
        let kv = Arc::new(InMemoryKv::new());
        kv.set(keys::XP, "not a number").unwrap();
        kv.set(keys::WORLDS, "[1,3]").unwrap();

        let store = ProgressStore::local(kv);
        assert_eq!(store.xp(), 0);
        assert_eq!(store.state().completed_modules, vec![1, 3]);
        assert_eq!(store.state().display_name, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn test_open_repairs_invariants() {
        let kv = Arc::new(InMemoryKv::new());
        kv.set(keys::MISTAKES, r#"{"Foo ": 0, "Prompt ": 2, "prompt": 1}"#).unwrap();
        kv.set(keys::WORLDS, "[2,2,5]").unwrap();
        {
            let mut store = ProgressStore::local(kv.clone());
            store.append_prompt_score(scored("a", 40));
            store.append_prompt_score(scored("b", 60));
        }
        let raw = kv.get(keys::PROMPT_HISTORY).unwrap().unwrap();
        kv.set(keys::PROMPT_HISTORY, &raw.replace(r#""index":2"#, r#""index":1"#)).unwrap();

        let mut store = ProgressStore::local(kv.clone());
        assert_eq!(store.state().mistake_counts.len(), 1);
        assert_eq!(store.state().mistake_counts["prompt"], 3);
        assert_eq!(store.mistake_summary().total_mistakes, 3);
        assert_eq!(store.state().completed_modules, vec![2, 5]);
        let indices: Vec<u32> = store.state().prompt_history.iter().map(|h| h.sequence_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(store.append_prompt_score(scored("c", 70)).sequence_index, 3);

        // the repaired form is what got persisted
        assert_eq!(kv.get(keys::MISTAKES).unwrap().as_deref(), Some(r#"{"prompt":3}"#));
    }

    #[test]
    fn test_reconcile_never_lowers() {
        let (mut store, _) = new_store();
        store.award_xp(500);
        store.complete_module(1, None);

        let changed = store.reconcile(&RemoteProgress {
            xp: 200,
            completed_modules: vec![1, 4],
        });
        assert!(changed);
        assert_eq!(store.xp(), 500);
        assert_eq!(store.state().completed_modules, vec![1, 4]);

        assert!(!store.reconcile(&RemoteProgress {
            xp: 100,
            completed_modules: vec![4],
        }));
    }

    #[test]
    fn test_sync_skipped_without_runtime() {
        let mut mock = MockProgressSync::new();
        mock.expect_push().never();

        let mut store = with_sync(Arc::new(InMemoryKv::new()), mock);
        store.award_xp(10);
        assert_eq!(store.xp(), 10);
        assert_eq!(store.pending_syncs(), 0);
    }

    #[tokio::test]
    async fn test_sync_receives_applied_deltas() {
        let mut mock = MockProgressSync::new();
        mock.expect_push()
            .withf(|op| *op == SyncOp::AwardXp { amount: 30 })
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_push()
            .withf(|op| *op == SyncOp::AwardXp { amount: -30 })
            .times(1)
            .returning(|_| Ok(()));

        let mut store = with_sync(Arc::new(InMemoryKv::new()), mock);
        store.award_xp(30);
        store.award_xp(-100);
        // already at zero: nothing to mirror
        store.award_xp(-5);
        store.flush_pending().await;

        assert_eq!(store.xp(), 0);
    }

    #[tokio::test]
    async fn test_reset_sends_dedicated_op() {
        let mut mock = MockProgressSync::new();
        mock.expect_push()
            .withf(|op| matches!(op, SyncOp::AwardXp { .. }))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_push()
            .withf(|op| *op == SyncOp::Reset)
            .times(1)
            .returning(|_| Ok(()));

        let mut store = with_sync(Arc::new(InMemoryKv::new()), mock);
        store.award_xp(250);
        store.reset_progress();
        store.flush_pending().await;
    }

    #[tokio::test]
    async fn test_sync_failure_keeps_local_state() {
        let mut mock = MockProgressSync::new();
        mock.expect_push()
            .returning(|_| Err(SyncError::Transport("connection refused".to_string())));

        let kv = Arc::new(InMemoryKv::new());
        let mut store = with_sync(kv.clone(), mock);
        store.complete_module(3, Some("token_master"));
        store.record_mistake("tokenization");
        store.flush_pending().await;

        assert_eq!(store.state().completed_modules, vec![3]);
        assert_eq!(kv.get(keys::BADGES).unwrap().as_deref(), Some(r#"["token_master"]"#));
        assert_eq!(store.pending_syncs(), 0);
    }

    #[tokio::test]
    async fn test_repeat_completion_still_syncs() {
        let mut mock = MockProgressSync::new();
        mock.expect_push()
            .withf(|op| {
                *op == SyncOp::CompleteModule {
                    module_id: 2,
                    badge_id: None,
                }
            })
            .times(2)
            .returning(|_| Ok(()));

        let mut store = with_sync(Arc::new(InMemoryKv::new()), mock);
        store.complete_module(2, None);
        store.complete_module(2, None);
        store.flush_pending().await;
    }
}
