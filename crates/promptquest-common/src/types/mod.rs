//! Core data types for PromptQuest

pub mod badge;
pub mod level;
pub mod progress;
pub mod score;
