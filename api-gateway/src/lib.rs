//! PromptQuest API Gateway
//!
//! REST + WebSocket surface for the PromptQuest learning platform:
//! - Progress: XP, world completion, reset
//! - Analytics: mistake tracking and prompt-history statistics
//! - Worlds: pattern, prediction and hallucination quizzes, prompt scoring,
//!   tokenizer, context window, Mini AI Trainer
//! - Playground and gamification catalogues
//! - `/ws`: live feed of progress events

pub mod config;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use futures::{sink::SinkExt, stream::StreamExt};
use promptquest_common::{
    resolve_level, LevelStatus, NewPromptScore, PromptQuestError, ScoreResult, BADGES,
    LEVEL_TIERS, VERSION,
};
use promptquest_progress::{
    average_score, FileKv, MistakeRecorded, MistakeSummary, ProgressConfig, ProgressStore, PromptHistoryResponse,
    PromptHistorySaved, Trend,
};
use promptquest_scoring::{
    analyze, check_hallucination_answer, check_pattern_answer, check_prediction_answer,
    hallucination_question, pattern_question, prediction_question, score_prompt,
    simulate_context_window, tokenize, ChatMessage, ContextWindow, Difficulty,
    HallucinationCheck, HallucinationQuestion, ModelState, PatternCheck, PatternQuestion,
    PlaygroundAnalysis, Prediction, PredictionCheck, PredictionQuestion, QuizError,
    Tokenization, TrainOutcome, TrainerError, TrainerRegistry, DEFAULT_MAX_TOKENS,
    DEFAULT_SESSION,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

// ============ STATE ============

/// Open the gateway's own file-backed progress store.
///
/// Clients mirror their progress to this server, so its store never syncs
/// anywhere itself; `sync_enabled` is ignored here.
pub fn open_store(cfg: &ProgressConfig) -> Result<ProgressStore, PromptQuestError> {
    if cfg.sync_enabled {
        warn!(
            url = %cfg.api_base_url,
            "Remote sync is a client setting; the gateway store stays local"
        );
    }
    let kv = FileKv::open(&cfg.data_dir)?;
    Ok(ProgressStore::local(Arc::new(kv)))
}

#[derive(Clone)]
pub struct AppState {
    pub progress: Arc<RwLock<ProgressStore>>,
    pub trainers: Arc<TrainerRegistry>,
    pub events_tx: broadcast::Sender<Event>,
}

impl AppState {
    pub fn new(store: ProgressStore, event_buffer: usize) -> Self {
        let (events_tx, _) = broadcast::channel(event_buffer.max(1));
        Self {
            progress: Arc::new(RwLock::new(store)),
            trainers: Arc::new(TrainerRegistry::new()),
            events_tx,
        }
    }

    fn publish(&self, event_type: &'static str, data: serde_json::Value) {
        // No subscribers is not an error
        let _ = self.events_tx.send(Event {
            event_type,
            data,
            timestamp: Utc::now(),
        });
    }
}

// ============ MODELS ============

/// Progress event pushed to WebSocket clients
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub xp: u64,
    pub completed_modules: Vec<u32>,
    pub badges: Vec<String>,
    pub display_name: String,
    pub level: LevelStatus,
}

impl ProgressResponse {
    fn from_store(store: &ProgressStore) -> Self {
        let state = store.state();
        Self {
            xp: state.experience_points,
            completed_modules: state.completed_modules.clone(),
            badges: state.badges.clone(),
            display_name: state.display_name.clone(),
            level: store.level(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteResponse {
    pub module_id: u32,
    pub newly_completed: bool,
    pub badge_awarded: bool,
    pub completed_modules: Vec<u32>,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MistakeResponse {
    pub topic: String,
    pub total_mistakes: u32,
    pub message: String,
}

// ============ REQUEST TYPES ============

#[derive(Debug, Deserialize)]
pub struct XpRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub module_id: u32,
    #[serde(default)]
    pub badge_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MistakeRequest {
    pub topic: String,
    #[serde(default)]
    pub question_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyQuery {
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatternAnswer {
    pub question_item: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictionAnswer {
    pub prompt: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct HallucinationAnswer {
    pub question_id: usize,
    pub answer: bool,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub item: String,
    pub category: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub item: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

fn session_or_default(session_id: &Option<String>) -> &str {
    session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION)
}

// ============ ERRORS ============

/// Handler errors, rendered as `{"error": ...}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl From<TrainerError> for ApiError {
    fn from(err: TrainerError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============ HANDLERS ============

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": VERSION,
        "services": {
            "progress": true,
            "scoring": true,
            "trainer": true
        }
    }))
}

// Progress

async fn get_progress(State(state): State<AppState>) -> Json<ProgressResponse> {
    let store = state.progress.read().await;
    Json(ProgressResponse::from_store(&store))
}

async fn award_xp(
    State(state): State<AppState>,
    Json(req): Json<XpRequest>,
) -> Json<ProgressResponse> {
    let (before, snapshot) = {
        let mut store = state.progress.write().await;
        let before = store.xp();
        store.award_xp(req.amount);
        (before, ProgressResponse::from_store(&store))
    };

    // Saturation at zero can make the applied change smaller than requested
    let applied = if snapshot.xp >= before {
        i64::try_from(snapshot.xp - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - snapshot.xp).map_or(i64::MIN, |d| -d)
    };
    state.publish(
        "xp_update",
        json!({
            "amount": applied,
            "xp": snapshot.xp,
            "level": snapshot.level.tier.level,
        }),
    );
    info!(requested = req.amount, "XP {:+} -> {}", applied, snapshot.xp);
    Json(snapshot)
}

async fn complete_module(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Json<CompleteResponse> {
    let badge_id = req
        .badge_id
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let response = {
        let mut store = state.progress.write().await;
        let outcome = store.complete_module(req.module_id, badge_id);
        CompleteResponse {
            module_id: req.module_id,
            newly_completed: outcome.newly_completed,
            badge_awarded: outcome.badge_awarded,
            completed_modules: store.state().completed_modules.clone(),
            badges: store.state().badges.clone(),
        }
    };

    if response.newly_completed || response.badge_awarded {
        state.publish(
            "module_completed",
            json!({ "module_id": req.module_id, "badge_id": badge_id }),
        );
        info!("Completed module {}", req.module_id);
    }
    Json(response)
}

async fn reset_progress(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.progress.write().await.reset_progress();
    state.publish("progress_reset", json!({}));
    Json(json!({ "reset": true, "message": "Progress cleared." }))
}

// Analytics

async fn record_mistake(
    State(state): State<AppState>,
    Json(req): Json<MistakeRequest>,
) -> Result<Json<MistakeResponse>, ApiError> {
    let recorded = state.progress.write().await.record_mistake(&req.topic);
    let Some(MistakeRecorded {
        topic,
        count: total_mistakes,
    }) = recorded
    else {
        return Err(ApiError::BadRequest("Topic must not be blank".to_string()));
    };

    debug!(topic = %topic, question_id = ?req.question_id, "Mistake recorded");
    state.publish(
        "mistake_recorded",
        json!({ "topic": topic, "count": total_mistakes }),
    );

    Ok(Json(MistakeResponse {
        message: format!("Mistake recorded in {topic}."),
        topic,
        total_mistakes,
    }))
}

async fn get_summary(State(state): State<AppState>) -> Json<MistakeSummary> {
    Json(state.progress.read().await.mistake_summary())
}

async fn get_prompt_history(State(state): State<AppState>) -> Json<PromptHistoryResponse> {
    let store = state.progress.read().await;
    Json(PromptHistoryResponse::from_history(
        &store.state().prompt_history,
    ))
}

async fn save_prompt_history(
    State(state): State<AppState>,
    Json(req): Json<NewPromptScore>,
) -> Json<PromptHistorySaved> {
    let saved = {
        let mut store = state.progress.write().await;
        let entry = store.append_prompt_score(req);
        let history = &store.state().prompt_history;
        PromptHistorySaved {
            saved: true,
            history_count: history.len(),
            best_score: history.iter().map(|h| h.score).max().unwrap_or(entry.score),
            average_score: average_score(history),
            trend: Trend::from_history(history),
            entry,
        }
    };

    state.publish(
        "prompt_scored",
        json!({ "index": saved.entry.sequence_index, "score": saved.entry.score }),
    );
    Json(saved)
}

async fn reset_analytics(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.progress.write().await.reset_analytics();
    state.publish("analytics_reset", json!({}));
    Json(json!({ "reset": true, "message": "Analytics cleared." }))
}

// Worlds

async fn pattern_next(Query(query): Query<DifficultyQuery>) -> Json<PatternQuestion> {
    let difficulty = query
        .difficulty
        .as_deref()
        .map(Difficulty::parse)
        .unwrap_or_default();
    Json(pattern_question(difficulty, &mut rand::thread_rng()))
}

async fn pattern_answer(Json(req): Json<PatternAnswer>) -> Result<Json<PatternCheck>, ApiError> {
    Ok(Json(check_pattern_answer(&req.question_item, &req.answer)?))
}

async fn prediction_next() -> Json<PredictionQuestion> {
    Json(prediction_question(&mut rand::thread_rng()))
}

async fn prediction_answer(
    Json(req): Json<PredictionAnswer>,
) -> Result<Json<PredictionCheck>, ApiError> {
    Ok(Json(check_prediction_answer(&req.prompt, &req.answer)?))
}

async fn hallucination_next() -> Json<HallucinationQuestion> {
    Json(hallucination_question(&mut rand::thread_rng()))
}

async fn hallucination_answer(
    Json(req): Json<HallucinationAnswer>,
) -> Result<Json<HallucinationCheck>, ApiError> {
    Ok(Json(check_hallucination_answer(req.question_id, req.answer)?))
}

async fn score(Json(req): Json<PromptRequest>) -> Json<ScoreResult> {
    Json(score_prompt(&req.prompt))
}

async fn tokenize_text(Json(req): Json<TokenizeRequest>) -> Json<Tokenization> {
    Json(tokenize(&req.text))
}

async fn context_window(Json(req): Json<ContextRequest>) -> Json<ContextWindow> {
    let max_tokens = req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    Json(simulate_context_window(&req.messages, max_tokens))
}

async fn trainer_train(
    State(state): State<AppState>,
    Json(req): Json<TrainRequest>,
) -> Result<Json<TrainOutcome>, ApiError> {
    let session = session_or_default(&req.session_id);
    let outcome = state.trainers.train(session, &req.item, &req.category)?;
    Ok(Json(outcome))
}

async fn trainer_predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Json<Prediction> {
    let session = session_or_default(&req.session_id);
    Json(state.trainers.predict(session, &req.item))
}

async fn trainer_state(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<ModelState> {
    Json(state.trainers.state(session_or_default(&query.session_id)))
}

async fn trainer_reset(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<serde_json::Value> {
    let session = session_or_default(&query.session_id);
    state.trainers.reset(session);
    info!("Trainer session {} reset", session);
    Json(json!({ "success": true, "message": "🔄 Model reset. Start training again!" }))
}

// Playground

async fn playground_analyze(Json(req): Json<PromptRequest>) -> Json<PlaygroundAnalysis> {
    Json(analyze(&req.prompt))
}

// Gamification

async fn list_levels() -> impl IntoResponse {
    Json(LEVEL_TIERS)
}

async fn list_badges() -> impl IntoResponse {
    Json(BADGES)
}

async fn level_for_xp(Path(xp): Path<u64>) -> Json<LevelStatus> {
    Json(resolve_level(xp))
}

// WebSocket handler
async fn websocket_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.events_tx.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Ok(msg) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

// ============ ROUTER ============

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))
        // Progress
        .route("/api/progress", get(get_progress))
        .route("/api/progress/xp", post(award_xp))
        .route("/api/progress/complete", post(complete_module))
        .route("/api/progress/reset", delete(reset_progress))
        // Analytics
        .route("/api/analytics/mistake", post(record_mistake))
        .route("/api/analytics/summary", get(get_summary))
        .route(
            "/api/analytics/prompt-history",
            get(get_prompt_history).post(save_prompt_history),
        )
        .route("/api/analytics/reset", delete(reset_analytics))
        // Worlds
        .route("/api/worlds/1/question", get(pattern_next))
        .route("/api/worlds/1/answer", post(pattern_answer))
        .route("/api/worlds/2/question", get(prediction_next))
        .route("/api/worlds/2/answer", post(prediction_answer))
        .route("/api/worlds/3/tokenize", post(tokenize_text))
        .route("/api/worlds/4/score", post(score))
        .route("/api/worlds/5/question", get(hallucination_next))
        .route("/api/worlds/5/answer", post(hallucination_answer))
        .route("/api/worlds/context", post(context_window))
        .route("/api/worlds/6/train", post(trainer_train))
        .route("/api/worlds/6/predict", post(trainer_predict))
        .route("/api/worlds/6/state", get(trainer_state))
        .route("/api/worlds/6/reset", delete(trainer_reset))
        // Playground
        .route("/api/playground/analyze", post(playground_analyze))
        // Gamification
        .route("/api/gamification/levels", get(list_levels))
        .route("/api/gamification/badges", get(list_badges))
        .route("/api/gamification/level/:xp", get(level_for_xp))
        // WebSocket
        .route("/ws", get(websocket_handler))
        .route("/ws/leaderboard", get(websocket_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
