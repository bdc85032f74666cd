//! Prompt score types
//!
//! The output shape of the prompt scorer. Kept here so the progress store,
//! the API client, and the gateway agree on one wire format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade for a 0-100 prompt score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Map a total score to its grade.
    ///
    /// Cutoffs: 85 S, 70 A, 55 B, 40 C, below that D.
    pub fn from_total(total: u8) -> Self {
        match total {
            85..=u8::MAX => Grade::S,
            70..=84 => Grade::A,
            55..=69 => Grade::B,
            40..=54 => Grade::C,
            _ => Grade::D,
        }
    }

    /// Human-readable label shown next to the letter
    pub fn label(&self) -> &'static str {
        match self {
            Grade::S => "Prompt Master",
            Grade::A => "Expert",
            Grade::B => "Proficient",
            Grade::C => "Developing",
            Grade::D => "Needs Work",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Word-count band (0-20)
    pub length: u8,
    /// Action verb / question present (0-25)
    pub clarity: u8,
    /// Formatting or style instructions (0-25)
    pub instructions: u8,
    /// Worked examples (0-15)
    pub examples: u8,
    /// Role or context setting (0-15)
    pub context: u8,
}

impl ScoreBreakdown {
    pub const LENGTH_MAX: u8 = 20;
    pub const CLARITY_MAX: u8 = 25;
    pub const INSTRUCTIONS_MAX: u8 = 25;
    pub const EXAMPLES_MAX: u8 = 15;
    pub const CONTEXT_MAX: u8 = 15;

    /// Sum of all categories, capped at 100
    pub fn total(&self) -> u8 {
        let sum = self.length as u16
            + self.clarity as u16
            + self.instructions as u16
            + self.examples as u16
            + self.context as u16;
        sum.min(crate::MAX_PROMPT_SCORE as u16) as u8
    }
}

/// Full scorer output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u8,
    pub max_score: u8,
    pub grade: Grade,
    pub grade_label: String,
    pub breakdown: ScoreBreakdown,
    /// One or more short explanations, in rubric order
    pub feedback: Vec<String>,
    /// XP the learner earns for submitting this prompt
    pub xp_earned: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_cutoffs() {
        assert_eq!(Grade::from_total(100), Grade::S);
        assert_eq!(Grade::from_total(85), Grade::S);
        assert_eq!(Grade::from_total(84), Grade::A);
        assert_eq!(Grade::from_total(70), Grade::A);
        assert_eq!(Grade::from_total(69), Grade::B);
        assert_eq!(Grade::from_total(55), Grade::B);
        assert_eq!(Grade::from_total(54), Grade::C);
        assert_eq!(Grade::from_total(40), Grade::C);
        assert_eq!(Grade::from_total(39), Grade::D);
        assert_eq!(Grade::from_total(0), Grade::D);
    }

    #[test]
    fn test_grade_is_monotonic() {
        // Grade derives Ord with S first, so a higher score never yields a "greater" grade
        let mut prev = Grade::from_total(0);
        for total in 1..=100 {
            let grade = Grade::from_total(total);
            assert!(grade <= prev);
            prev = grade;
        }
    }

    #[test]
    fn test_breakdown_total_caps() {
        let breakdown = ScoreBreakdown {
            length: 20,
            clarity: 25,
            instructions: 25,
            examples: 15,
            context: 15,
        };
        assert_eq!(breakdown.total(), 100);
    }

    #[test]
    fn test_grade_wire_format() {
        assert_eq!(serde_json::to_string(&Grade::S).unwrap(), "\"S\"");
        let grade: Grade = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(grade, Grade::B);
    }
}
