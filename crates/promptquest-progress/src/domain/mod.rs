//! Progress domain logic
//!
//! The progress store and the analytics derived from its state.

pub mod analytics;
pub mod store;
