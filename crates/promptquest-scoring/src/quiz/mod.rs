//! Quiz worlds
//!
//! Question banks for the pattern, prediction and hallucination worlds.
//! Question selection is random; answer checking is deterministic and
//! needs nothing but the identifier the question carried.

pub mod hallucination;
pub mod pattern;
pub mod prediction;

/// Errors from answer checking
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("Unknown pattern item: {0}")]
    UnknownItem(String),

    #[error("Malformed number sequence: {0}")]
    MalformedSequence(String),

    #[error("Question not found")]
    UnknownPrompt,

    #[error("Invalid question id: {0}")]
    InvalidQuestion(usize),
}
