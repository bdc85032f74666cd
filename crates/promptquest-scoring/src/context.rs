//! Context window simulation
//!
//! Shows why a model "forgets" early conversation turns: messages are
//! costed at roughly 1.3 tokens per word and retained newest-first until
//! the window is full.

use serde::{Deserialize, Serialize};

/// Default window size used by the context lab
pub const DEFAULT_MAX_TOKENS: u32 = 50;

/// A chat message submitted to the simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Retained,
    Forgotten,
}

/// A message with its estimated cost and fate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostedMessage {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub tokens: u32,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Kept messages, oldest first
    pub retained: Vec<CostedMessage>,
    /// Dropped messages, oldest first
    pub forgotten: Vec<CostedMessage>,
    pub total_tokens_used: u32,
    pub max_capacity: u32,
    pub utilization_percent: u32,
}

/// Estimated token cost of a message: `ceil(words * 1.3)`
pub fn estimate_tokens(text: &str) -> u32 {
    let words = text.split_whitespace().count() as u32;
    (words * 13).div_ceil(10)
}

/// Fit `messages` into a window of `max_tokens`, keeping the newest.
///
/// A message that does not fit is forgotten but does not stop older,
/// smaller messages from being retained.
pub fn simulate_context_window(messages: &[ChatMessage], max_tokens: u32) -> ContextWindow {
    let mut total = 0u32;
    let mut retained = Vec::new();
    let mut forgotten = Vec::new();

    for message in messages.iter().rev() {
        let tokens = estimate_tokens(&message.text);
        let status = if total + tokens <= max_tokens {
            total += tokens;
            MessageStatus::Retained
        } else {
            MessageStatus::Forgotten
        };

        let costed = CostedMessage {
            message: message.clone(),
            tokens,
            status,
        };
        match status {
            MessageStatus::Retained => retained.push(costed),
            MessageStatus::Forgotten => forgotten.push(costed),
        }
    }

    retained.reverse();
    forgotten.reverse();

    let utilization_percent = if max_tokens == 0 {
        0
    } else {
        ((total as f64 / max_tokens as f64) * 100.0).round() as u32
    };

    ContextWindow {
        retained,
        forgotten,
        total_tokens_used: total,
        max_capacity: max_tokens,
        utilization_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> ChatMessage {
        ChatMessage {
            role: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("one"), 2);
        assert_eq!(estimate_tokens("one two three four five six seven eight nine ten"), 13);
    }

    #[test]
    fn test_everything_fits() {
        let window = simulate_context_window(&[msg("hello there"), msg("hi")], 50);
        assert_eq!(window.retained.len(), 2);
        assert!(window.forgotten.is_empty());
        assert_eq!(window.total_tokens_used, 5);
        assert_eq!(window.utilization_percent, 10);
    }

    #[test]
    fn test_oldest_messages_forgotten_first() {
        let long = "word ".repeat(30);
        let messages = vec![msg(&long), msg("recent one"), msg("newest")];
        let window = simulate_context_window(&messages, 10);

        assert_eq!(window.forgotten.len(), 1);
        assert_eq!(window.forgotten[0].message.text, long);
        assert_eq!(window.retained[0].message.text, "recent one");
        assert_eq!(window.retained[1].message.text, "newest");
        assert!(window.total_tokens_used <= 10);
    }

    #[test]
    fn test_zero_capacity() {
        let window = simulate_context_window(&[msg("anything")], 0);
        assert_eq!(window.utilization_percent, 0);
        assert_eq!(window.forgotten.len(), 1);
    }
}
