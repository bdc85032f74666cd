//! World 2: next-word prediction
//!
//! Each prompt carries a fixed next-word distribution. The learner guesses
//! which word a language model would pick; the right answer is always the
//! most probable one.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::QuizError;

/// XP for picking the most probable word
pub const PREDICTION_XP: u32 = 25;

/// XP for a wrong pick; the distribution is still shown
pub const PREDICTION_CONSOLATION_XP: u32 = 5;

struct PredictionPrompt {
    prompt: &'static str,
    /// Word and probability in percent
    predictions: [(&'static str, u8); 4],
}

impl PredictionPrompt {
    /// The most probable word; the first listed wins a tie
    fn correct(&self) -> &'static str {
        let mut best = self.predictions[0];
        for &(word, probability) in &self.predictions[1..] {
            if probability > best.1 {
                best = (word, probability);
            }
        }
        best.0
    }

    /// Predictions, most probable first
    fn ranked(&self) -> Vec<WordProbability> {
        let mut ranked: Vec<WordProbability> = self
            .predictions
            .iter()
            .map(|(word, probability)| WordProbability {
                word: word.to_string(),
                probability: *probability,
            })
            .collect();
        ranked.sort_by(|a, b| b.probability.cmp(&a.probability));
        ranked
    }
}

static PREDICTION_PROMPTS: [PredictionPrompt; 8] = [
    PredictionPrompt {
        prompt: "The capital of France is",
        predictions: [("Paris", 91), ("London", 5), ("Rome", 2), ("Berlin", 2)],
    },
    PredictionPrompt {
        prompt: "The sun rises in the",
        predictions: [("east", 88), ("west", 7), ("north", 3), ("south", 2)],
    },
    PredictionPrompt {
        prompt: "Water boils at 100 degrees",
        predictions: [("Celsius", 85), ("Fahrenheit", 10), ("Kelvin", 4), ("Centigrade", 1)],
    },
    PredictionPrompt {
        prompt: "The largest planet in our solar system is",
        predictions: [("Jupiter", 90), ("Saturn", 7), ("Neptune", 2), ("Mars", 1)],
    },
    PredictionPrompt {
        prompt: "Python is a programming",
        predictions: [("language", 93), ("framework", 4), ("tool", 2), ("library", 1)],
    },
    PredictionPrompt {
        prompt: "The speed of light is approximately 300,000 kilometers per",
        predictions: [("second", 89), ("hour", 7), ("minute", 3), ("day", 1)],
    },
    PredictionPrompt {
        prompt: "Albert Einstein developed the theory of",
        predictions: [("relativity", 92), ("gravity", 4), ("evolution", 2), ("quantum", 2)],
    },
    PredictionPrompt {
        prompt: "The human body has how many bones?",
        predictions: [("206", 78), ("212", 10), ("198", 7), ("220", 5)],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProbability {
    pub word: String,
    /// Percent
    pub probability: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionQuestion {
    pub prompt: String,
    /// Most probable first
    pub predictions: Vec<WordProbability>,
    /// The same words, shuffled
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionCheck {
    pub is_correct: bool,
    pub correct_answer: String,
    pub predictions: Vec<WordProbability>,
    pub xp_earned: u32,
    pub feedback: String,
}

/// Draw a random prompt
pub fn prediction_question<R: Rng + ?Sized>(rng: &mut R) -> PredictionQuestion {
    let entry = &PREDICTION_PROMPTS[rng.gen_range(0..PREDICTION_PROMPTS.len())];

    let mut options: Vec<String> = entry.predictions.iter().map(|(w, _)| w.to_string()).collect();
    options.shuffle(rng);

    PredictionQuestion {
        prompt: entry.prompt.to_string(),
        predictions: entry.ranked(),
        options,
    }
}

/// Check a guess for the prompt it was asked about
pub fn check_prediction_answer(prompt: &str, answer: &str) -> Result<PredictionCheck, QuizError> {
    let prompt = prompt.trim();
    let entry = PREDICTION_PROMPTS
        .iter()
        .find(|p| p.prompt == prompt)
        .ok_or(QuizError::UnknownPrompt)?;

    let correct = entry.correct();
    let is_correct = answer.trim() == correct;
    let feedback = if is_correct {
        format!("✅ The model predicted '{correct}' with highest probability!")
    } else {
        format!("❌ The model would predict '{correct}', the word with the highest probability!")
    };

    Ok(PredictionCheck {
        is_correct,
        correct_answer: correct.to_string(),
        predictions: entry.ranked(),
        xp_earned: if is_correct {
            PREDICTION_XP
        } else {
            PREDICTION_CONSOLATION_XP
        },
        feedback,
    })
}
