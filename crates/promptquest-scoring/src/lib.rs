//! # PromptQuest Scoring
//!
//! Deterministic, stateless teaching logic served by the API gateway.
//!
//! - [`prompt`]: the five-category prompt rubric
//! - [`tokenizer`]: toy subword tokenizer for the tokenization lab
//! - [`context`]: context-window forgetting simulation
//! - [`trainer`]: the Mini AI Trainer (per-session nearest-match classifier)
//! - [`playground`]: tokenize + score + canned output in one call
//! - [`quiz`]: pattern, next-word prediction and hallucination quizzes

pub mod context;
pub mod playground;
pub mod prompt;
pub mod quiz;
pub mod tokenizer;
pub mod trainer;

pub use context::{simulate_context_window, ChatMessage, ContextWindow, DEFAULT_MAX_TOKENS};
pub use playground::{analyze, PlaygroundAnalysis};
pub use prompt::{score_prompt, xp_for_score};
pub use quiz::hallucination::{
    check_hallucination_answer, hallucination_question, HallucinationCheck, HallucinationQuestion,
};
pub use quiz::pattern::{
    check_pattern_answer, pattern_question, Difficulty, PatternCheck, PatternQuestion,
};
pub use quiz::prediction::{
    check_prediction_answer, prediction_question, PredictionCheck, PredictionQuestion,
};
pub use quiz::QuizError;
pub use tokenizer::{tokenize, Token, Tokenization};
pub use trainer::{
    ModelState, Prediction, PredictionMethod, TrainOutcome, TrainerError, TrainerRegistry,
    TrainingExample, DEFAULT_SESSION,
};
