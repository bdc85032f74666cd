//! Teaching tokenizer
//!
//! A toy imitation of subword tokenization. Words, digit runs, and
//! punctuation become tokens; long words are split in half with a `##`
//! continuation marker so learners can see how BPE-style tokenizers
//! break up rare words.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Words longer than this are split into two subwords
const SUBWORD_SPLIT_LEN: usize = 8;

/// Marker prefixed to a continuation subword
pub const SUBWORD_PREFIX: &str = "##";

const TOKEN_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9",
];

lazy_static! {
    static ref RAW_TOKEN: Regex =
        Regex::new(r"[A-Za-z]+|[0-9]+|[^\s\w]").expect("token regex is valid");
}

/// One token as shown in the tokenization lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub id: usize,
    pub color: String,
    pub is_subword: bool,
}

/// Result of tokenizing a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tokenization {
    pub tokens: Vec<Token>,
    pub token_count: usize,
    pub char_count: usize,
    /// Characters per token, two decimals
    pub compression_ratio: f64,
}

/// Tokenize `text`. Blank input yields an empty result.
pub fn tokenize(text: &str) -> Tokenization {
    if text.trim().is_empty() {
        return Tokenization {
            tokens: Vec::new(),
            token_count: 0,
            char_count: 0,
            compression_ratio: 0.0,
        };
    }

    let mut pieces: Vec<String> = Vec::new();
    for m in RAW_TOKEN.find_iter(text) {
        let raw = m.as_str();
        if raw.len() > SUBWORD_SPLIT_LEN && raw.bytes().all(|b| b.is_ascii_alphabetic()) {
            let (head, tail) = raw.split_at(raw.len() / 2);
            pieces.push(head.to_string());
            pieces.push(format!("{SUBWORD_PREFIX}{tail}"));
        } else {
            pieces.push(raw.to_string());
        }
    }

    let tokens: Vec<Token> = pieces
        .into_iter()
        .enumerate()
        .map(|(id, text)| Token {
            is_subword: text.starts_with(SUBWORD_PREFIX),
            color: TOKEN_COLORS[id % TOKEN_COLORS.len()].to_string(),
            id,
            text,
        })
        .collect();

    let char_count = text.chars().count();
    let token_count = tokens.len();
    let ratio = char_count as f64 / token_count.max(1) as f64;

    Tokenization {
        tokens,
        token_count,
        char_count,
        compression_ratio: (ratio * 100.0).round() / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(result: &Tokenization) -> Vec<&str> {
        result.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_blank_input() {
        let result = tokenize("   ");
        assert_eq!(result.token_count, 0);
        assert!(result.tokens.is_empty());
    }

    #[test]
    fn test_words_digits_punctuation() {
        let result = tokenize("Hello, world 42!");
        assert_eq!(texts(&result), vec!["Hello", ",", "world", "42", "!"]);
        assert_eq!(result.token_count, 5);
        assert_eq!(result.char_count, 16);
        assert!((result.compression_ratio - 3.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_long_word_splits_into_subwords() {
        let result = tokenize("unbelievable");
        assert_eq!(texts(&result), vec!["unbeli", "##evable"]);
        assert!(!result.tokens[0].is_subword);
        assert!(result.tokens[1].is_subword);
    }

    #[test]
    fn test_eight_letter_word_is_not_split() {
        let result = tokenize("tokenize");
        assert_eq!(texts(&result), vec!["tokenize"]);
    }

    #[test]
    fn test_colors_cycle() {
        let result = tokenize("a b c d e f g h i j k");
        assert_eq!(result.tokens[0].color, result.tokens[10].color);
        assert_ne!(result.tokens[0].color, result.tokens[1].color);
    }
}
