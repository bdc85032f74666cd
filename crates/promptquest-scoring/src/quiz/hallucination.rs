//! World 5: hallucination detection
//!
//! The learner sees a claim an AI made and decides whether it is true.
//! Questions are identified by their position in the bank.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::QuizError;

/// XP for a correct verdict
pub const HALLUCINATION_XP: u32 = 30;

struct Claim {
    statement: &'static str,
    is_true: bool,
    explanation: &'static str,
}

static CLAIMS: [Claim; 12] = [
    Claim {
        statement: "An AI says: 'Albert Einstein won the Nobel Prize for the Theory of Relativity.'",
        is_true: false,
        explanation: "Einstein won the 1921 Nobel Prize in Physics for the photoelectric effect, NOT relativity.",
    },
    Claim {
        statement: "An AI says: 'The Great Wall of China is visible from space.'",
        is_true: false,
        explanation: "The Great Wall is too narrow to be seen from space with the naked eye. This is a common myth.",
    },
    Claim {
        statement: "An AI says: 'Python was created by Guido van Rossum.'",
        is_true: true,
        explanation: "Correct! Guido van Rossum created Python, first released in 1991.",
    },
    Claim {
        statement: "An AI says: 'The chemical formula for water is H3O.'",
        is_true: false,
        explanation: "The correct formula is H₂O (two hydrogen atoms + one oxygen atom). H₃O⁺ is the hydronium ion.",
    },
    Claim {
        statement: "An AI says: 'Mount Everest is the tallest mountain on Earth measured from sea level.'",
        is_true: true,
        explanation: "Correct! Mount Everest at 8,848.86m is the highest above sea level.",
    },
    Claim {
        statement: "An AI says: 'Shakespeare wrote Romeo and Juliet in 1623.'",
        is_true: false,
        explanation: "Romeo and Juliet was written around 1594 to 1596. 1623 is when Shakespeare's First Folio was published.",
    },
    Claim {
        statement: "An AI says: 'Humans use only 10% of their brain.'",
        is_true: false,
        explanation: "This is a myth! Humans use virtually all of their brain; different areas are active at different times.",
    },
    Claim {
        statement: "An AI says: 'DNA stands for Deoxyribonucleic Acid.'",
        is_true: true,
        explanation: "Correct! DNA = Deoxyribonucleic Acid, the molecule carrying genetic information.",
    },
    Claim {
        statement: "An AI says: 'Napoleon Bonaparte was very short, around 5 feet tall.'",
        is_true: false,
        explanation: "Napoleon was about 5 feet 7 inches (170cm), average for his era. The 'short' myth came from unit confusion.",
    },
    Claim {
        statement: "An AI says: 'The first computer programmer was Ada Lovelace.'",
        is_true: true,
        explanation: "Correct! Ada Lovelace is credited as writing the first algorithm for Charles Babbage's Analytical Engine.",
    },
    Claim {
        statement: "An AI says: 'Light travels faster in water than in a vacuum.'",
        is_true: false,
        explanation: "Light travels fastest in a vacuum (~300,000 km/s). It slows down in water.",
    },
    Claim {
        statement: "An AI says: 'The Amazon River is the longest river in the world.'",
        is_true: false,
        explanation: "The Nile River is traditionally considered the longest. The Amazon is the largest by volume.",
    },
];

/// A claim to judge. The verdict stays server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallucinationQuestion {
    pub question: String,
    #[serde(rename = "_id")]
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallucinationCheck {
    pub is_correct: bool,
    /// Whether the claim was true
    pub correct_answer: bool,
    pub explanation: String,
    pub xp_earned: u32,
    pub feedback: String,
}

/// Number of claims in the bank
pub fn claim_count() -> usize {
    CLAIMS.len()
}

pub fn hallucination_question<R: Rng + ?Sized>(rng: &mut R) -> HallucinationQuestion {
    let id = rng.gen_range(0..CLAIMS.len());
    HallucinationQuestion {
        question: CLAIMS[id].statement.to_string(),
        id,
    }
}

/// Check a true/false verdict for claim `id`
pub fn check_hallucination_answer(id: usize, answer: bool) -> Result<HallucinationCheck, QuizError> {
    let claim = CLAIMS.get(id).ok_or(QuizError::InvalidQuestion(id))?;
    let is_correct = answer == claim.is_true;

    Ok(HallucinationCheck {
        is_correct,
        correct_answer: claim.is_true,
        explanation: claim.explanation.to_string(),
        xp_earned: if is_correct { HALLUCINATION_XP } else { 0 },
        feedback: if is_correct {
            format!("✅ Correct! {}", claim.explanation)
        } else {
            format!("❌ Wrong! {}", claim.explanation)
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spotting_a_myth() {
        // Great Wall from space
        let check = check_hallucination_answer(1, false).unwrap();
        assert!(check.is_correct);
        assert!(!check.correct_answer);
        assert_eq!(check.xp_earned, HALLUCINATION_XP);
        assert!(check.feedback.starts_with("✅"));
    }

    #[test]
    fn test_doubting_a_fact() {
        // Guido van Rossum
        let check = check_hallucination_answer(2, false).unwrap();
        assert!(!check.is_correct);
        assert!(check.correct_answer);
        assert_eq!(check.xp_earned, 0);
        assert!(check.feedback.contains("1991"));
    }

    #[test]
    fn test_out_of_range_id() {
        assert_eq!(
            check_hallucination_answer(claim_count(), true),
            Err(QuizError::InvalidQuestion(claim_count()))
        );
    }

    #[test]
    fn test_question_ids_resolve() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let question = hallucination_question(&mut rng);
            assert!(question.id < claim_count());
            assert_eq!(question.question, CLAIMS[question.id].statement);

            let right = check_hallucination_answer(question.id, true).unwrap().is_correct;
            let wrong = check_hallucination_answer(question.id, false).unwrap().is_correct;
            assert_ne!(right, wrong);
        }
    }

    #[test]
    fn test_question_hides_verdict() {
        let json = serde_json::to_value(hallucination_question(&mut StdRng::seed_from_u64(1))).unwrap();
        assert!(json.get("_id").is_some());
        assert!(json.get("correct_answer").is_none());
    }
}
