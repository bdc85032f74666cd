//! Prompt scoring rubric
//!
//! Grades free-text prompts against five independent categories:
//!
//! | Category     | Max | Signal                                   |
//! |--------------|-----|------------------------------------------|
//! | length       | 20  | word-count band                          |
//! | clarity      | 25  | action verb or question mark             |
//! | instructions | 25  | formatting / style instruction patterns  |
//! | examples     | 15  | example markers ("for example", "e.g.")  |
//! | context      | 15  | role setting ("you are", "act as")       |
//!
//! Scoring is pure and deterministic: no randomness, no I/O.

use lazy_static::lazy_static;
use promptquest_common::{Grade, ScoreBreakdown, ScoreResult, MAX_PROMPT_SCORE};
use regex::RegexSet;

const CLARITY_KEYWORDS: &[&str] = &[
    "explain", "describe", "list", "summarize", "write", "create", "generate", "analyze",
    "compare", "define", "what", "how", "why", "give me", "tell me",
];

const EXAMPLE_KEYWORDS: &[&str] = &[
    "for example", "e.g.", "such as", "like:", "example:", "for instance", "as in",
];

const ROLE_KEYWORDS: &[&str] = &[
    "you are", "act as", "as a", "assume you", "your role", "pretend", "imagine you",
];

lazy_static! {
    static ref INSTRUCTION_PATTERNS: RegexSet = RegexSet::new([
        r"step[- ]by[- ]step",
        r"in \d+ words",
        r"bullet point",
        r"format",
        r"don't include",
        r"avoid",
        r"make sure",
        r"must",
        r"should",
        r"use simple language",
        r"for a beginner",
        r"for an expert",
        r"in the style of",
        r"tone:",
        r"output:",
    ])
    .expect("instruction patterns are valid regexes");
}

/// Score a prompt against the rubric.
///
/// Blank input short-circuits to a zero score with a single feedback line.
pub fn score_prompt(prompt: &str) -> ScoreResult {
    if prompt.trim().is_empty() {
        return empty_result();
    }

    let lower = prompt.to_lowercase();
    let word_count = prompt.split_whitespace().count();
    let mut feedback = Vec::with_capacity(5);

    let length = match word_count {
        0..=4 => {
            feedback.push("❌ Too short — add more detail (5+ words needed)".to_string());
            5
        }
        5..=14 => {
            feedback.push("⚠️ Moderate length — try to be more descriptive".to_string());
            12
        }
        15..=39 => {
            feedback.push("✅ Good length".to_string());
            18
        }
        _ => {
            feedback.push("✅ Excellent length — detailed and thorough".to_string());
            ScoreBreakdown::LENGTH_MAX
        }
    };

    let has_action = CLARITY_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let clarity = if has_action || prompt.contains('?') {
        feedback.push("✅ Clear instruction detected".to_string());
        if word_count > 10 {
            22
        } else {
            15
        }
    } else {
        feedback.push("❌ Add a clear action verb (e.g., 'Explain', 'List', 'Write')".to_string());
        8
    };

    let instructions = if INSTRUCTION_PATTERNS.is_match(&lower) {
        feedback.push("✅ Contains formatting/style instructions".to_string());
        ScoreBreakdown::INSTRUCTIONS_MAX
    } else {
        feedback.push(
            "💡 Add instructions: e.g., 'in bullet points', 'step-by-step', 'in simple language'"
                .to_string(),
        );
        8
    };

    let examples = if EXAMPLE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        feedback.push("✅ Includes examples — great for guiding the model!".to_string());
        ScoreBreakdown::EXAMPLES_MAX
    } else {
        feedback.push("💡 Add examples to guide the model (e.g., 'for example, ...')".to_string());
        3
    };

    let context = if ROLE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        feedback.push("✅ Role/context specified — excellent!".to_string());
        ScoreBreakdown::CONTEXT_MAX
    } else {
        feedback.push("💡 Set context/role: e.g., 'You are an expert teacher...'".to_string());
        5
    };

    let breakdown = ScoreBreakdown {
        length,
        clarity,
        instructions,
        examples,
        context,
    };
    let total = breakdown.total();
    let grade = Grade::from_total(total);

    ScoreResult {
        total_score: total,
        max_score: MAX_PROMPT_SCORE,
        grade,
        grade_label: grade.label().to_string(),
        breakdown,
        feedback,
        xp_earned: xp_for_score(total),
    }
}

/// XP awarded for a scored prompt: a fifth of the score, at least 5
pub fn xp_for_score(total: u8) -> u32 {
    (total as u32 / 5).max(5)
}

fn empty_result() -> ScoreResult {
    let grade = Grade::from_total(0);
    ScoreResult {
        total_score: 0,
        max_score: MAX_PROMPT_SCORE,
        grade,
        grade_label: grade.label().to_string(),
        breakdown: ScoreBreakdown::default(),
        feedback: vec!["❌ No prompt provided — write something to get a score".to_string()],
        xp_earned: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RICH_PROMPT: &str = "You are a patient computer science teacher. Explain how \
        tokenization works in large language models for a beginner, in bullet points, \
        step-by-step. For example, show how the word 'unbelievable' might be split into \
        subword tokens, and make sure to avoid heavy jargon throughout the answer.";

    #[test]
    fn test_empty_prompt_scores_zero() {
        for input in ["", "   ", "\n\t"] {
            let result = score_prompt(input);
            assert_eq!(result.total_score, 0);
            assert_eq!(result.breakdown, ScoreBreakdown::default());
            assert_eq!(result.grade, Grade::D);
            assert_eq!(result.xp_earned, 0);
            assert_eq!(result.feedback.len(), 1);
        }
    }

    #[test]
    fn test_bare_prompt() {
        let result = score_prompt("Explain AI");
        assert_eq!(result.breakdown.length, 5);
        assert_eq!(result.breakdown.clarity, 15);
        assert_eq!(result.breakdown.instructions, 8);
        assert_eq!(result.breakdown.examples, 3);
        assert_eq!(result.breakdown.context, 5);
        assert_eq!(result.total_score, 36);
        assert_eq!(result.grade, Grade::D);
        assert_eq!(result.xp_earned, 7);
    }

    #[test]
    fn test_rich_prompt_beats_bare_prompt() {
        let bare = score_prompt("Explain AI");
        let rich = score_prompt(RICH_PROMPT);

        assert!(rich.breakdown.context > bare.breakdown.context);
        assert!(rich.breakdown.instructions > bare.breakdown.instructions);
        assert!(rich.breakdown.examples > bare.breakdown.examples);
        // clarity tops out at 22 from the action verb alone
        assert_eq!(rich.total_score, 97);
        assert_eq!(rich.grade, Grade::S);
        assert_eq!(rich.grade_label, "Prompt Master");
        assert_eq!(rich.xp_earned, 19);
    }

    #[test]
    fn test_question_mark_counts_as_clarity() {
        let result = score_prompt("Tokens vs words?");
        assert_eq!(result.breakdown.clarity, 15);
    }

    #[test]
    fn test_feedback_one_line_per_category() {
        let result = score_prompt("Write a haiku about the sea");
        assert_eq!(result.feedback.len(), 5);
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded_and_consistent(prompt in ".{0,300}") {
            let result = score_prompt(&prompt);
            let b = result.breakdown;
            prop_assert!(b.length <= ScoreBreakdown::LENGTH_MAX);
            prop_assert!(b.clarity <= ScoreBreakdown::CLARITY_MAX);
            prop_assert!(b.instructions <= ScoreBreakdown::INSTRUCTIONS_MAX);
            prop_assert!(b.examples <= ScoreBreakdown::EXAMPLES_MAX);
            prop_assert!(b.context <= ScoreBreakdown::CONTEXT_MAX);
            prop_assert_eq!(result.total_score, b.total());
            prop_assert!(result.total_score <= 100);
            prop_assert_eq!(result.grade, Grade::from_total(result.total_score));
            prop_assert!(!result.feedback.is_empty());
        }

        #[test]
        fn prop_scoring_is_deterministic(prompt in ".{0,200}") {
            prop_assert_eq!(score_prompt(&prompt), score_prompt(&prompt));
        }
    }
}
