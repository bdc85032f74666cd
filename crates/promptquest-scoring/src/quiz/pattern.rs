//! World 1: pattern recognition
//!
//! Two kinds of question. Word questions show a few labelled items and ask
//! for the category of a new one; number questions show arithmetic
//! progressions and ask for the next term.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::QuizError;

/// XP for a correct answer
pub const PATTERN_XP: u32 = 20;

/// Chance that a generated question is a number sequence
const NUMBER_PATTERN_ODDS: f64 = 0.4;

/// Terms shown in a number sequence
const SEQUENCE_LEN: i64 = 4;

/// Number questions always show this many worked examples
const NUMBER_EXAMPLES: usize = 3;

pub static CATEGORIES: [(&str, &[&str]); 6] = [
    (
        "Animal",
        &[
            "Dog", "Cat", "Elephant", "Lion", "Tiger", "Rabbit", "Horse", "Bear", "Fox", "Wolf",
            "Deer", "Monkey",
        ],
    ),
    (
        "Vehicle",
        &[
            "Car", "Truck", "Bus", "Motorcycle", "Bicycle", "Train", "Airplane", "Boat",
            "Scooter", "Van",
        ],
    ),
    (
        "Fruit",
        &[
            "Apple", "Banana", "Mango", "Orange", "Grape", "Strawberry", "Watermelon",
            "Pineapple", "Cherry", "Pear",
        ],
    ),
    (
        "Country",
        &[
            "India", "France", "Japan", "Brazil", "Australia", "Germany", "Canada", "Italy",
            "China", "Mexico",
        ],
    ),
    (
        "Planet",
        &["Earth", "Mars", "Jupiter", "Saturn", "Venus", "Mercury", "Neptune", "Uranus"],
    ),
    (
        "Vegetable",
        &["Carrot", "Broccoli", "Spinach", "Tomato", "Potato", "Onion", "Cucumber", "Pepper"],
    ),
];

/// Question difficulty. Fewer examples and more options as it rises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Unrecognized names select the hardest setting
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    fn example_count(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 2,
            Difficulty::Hard => 1,
        }
    }

    fn option_count(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium | Difficulty::Hard => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Word,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternExample {
    pub item: String,
    pub category: String,
}

/// A question as sent to the learner. The answer is not included; the
/// `question_item` is enough to check one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternQuestion {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub examples: Vec<PatternExample>,
    pub question_item: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCheck {
    pub is_correct: bool,
    pub correct_answer: String,
    pub xp_earned: u32,
    pub feedback: String,
}

/// Draw a random pattern question
pub fn pattern_question<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> PatternQuestion {
    if rng.gen_bool(NUMBER_PATTERN_ODDS) {
        number_question(rng)
    } else {
        word_question(difficulty, rng)
    }
}

fn word_question<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> PatternQuestion {
    let examples: Vec<PatternExample> = (0..difficulty.example_count())
        .map(|_| {
            let (category, items) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            PatternExample {
                item: items[rng.gen_range(0..items.len())].to_string(),
                category: category.to_string(),
            }
        })
        .collect();

    let (target, target_items) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
    let unseen: Vec<&str> = target_items
        .iter()
        .copied()
        .filter(|item| !examples.iter().any(|e| e.item == *item))
        .collect();
    let question_item = unseen.choose(rng).copied().unwrap_or(target_items[0]);

    let others: Vec<&str> = CATEGORIES
        .iter()
        .map(|(category, _)| *category)
        .filter(|category| *category != target)
        .collect();
    let mut options: Vec<String> = others
        .choose_multiple(rng, difficulty.option_count() - 1)
        .map(|c| c.to_string())
        .collect();
    options.push(target.to_string());
    options.shuffle(rng);

    PatternQuestion {
        kind: PatternKind::Word,
        examples,
        question_item: question_item.to_string(),
        options,
    }
}

fn number_question<R: Rng + ?Sized>(rng: &mut R) -> PatternQuestion {
    let examples = (0..NUMBER_EXAMPLES)
        .map(|_| {
            let start = rng.gen_range(1..=10);
            let step = rng.gen_range(1..=5);
            PatternExample {
                item: sequence(start, step),
                category: (start + SEQUENCE_LEN * step).to_string(),
            }
        })
        .collect();

    let start: i64 = rng.gen_range(2..=15);
    let step: i64 = rng.gen_range(2..=6);
    let correct = start + SEQUENCE_LEN * step;

    // start >= 2, so even correct - 2 * step stays positive
    let mut offsets = [-2i64, -1, 1, 2];
    offsets.shuffle(rng);
    let mut options: Vec<String> = std::iter::once(correct)
        .chain(offsets.iter().take(3).map(|k| correct + k * step))
        .map(|n| n.to_string())
        .collect();
    options.shuffle(rng);

    PatternQuestion {
        kind: PatternKind::Number,
        examples,
        question_item: sequence(start, step),
        options,
    }
}

fn sequence(start: i64, step: i64) -> String {
    (0..SEQUENCE_LEN)
        .map(|i| (start + i * step).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Category of a known item, case-insensitively
pub fn category_of(item: &str) -> Option<&'static str> {
    let item = item.trim();
    CATEGORIES
        .iter()
        .find(|(_, items)| items.iter().any(|i| i.eq_ignore_ascii_case(item)))
        .map(|(category, _)| *category)
}

fn is_sequence(item: &str) -> bool {
    item.trim().contains(char::is_whitespace) && item.chars().any(|c| c.is_ascii_digit())
}

/// Check an answer against the question it was given for
pub fn check_pattern_answer(question_item: &str, answer: &str) -> Result<PatternCheck, QuizError> {
    let answer = answer.trim();

    if is_sequence(question_item) {
        let terms = question_item
            .split_whitespace()
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| QuizError::MalformedSequence(question_item.to_string()))?;
        let (Some(first), Some(second), Some(last)) = (terms.first(), terms.get(1), terms.last())
        else {
            return Err(QuizError::MalformedSequence(question_item.to_string()));
        };

        let step = second - first;
        let correct = (last + step).to_string();
        let is_correct = answer == correct;
        let feedback = if is_correct {
            format!("✅ Correct! The pattern increases by {step}.")
        } else {
            format!("❌ Not quite. The next number is {correct}.")
        };
        return Ok(PatternCheck {
            is_correct,
            xp_earned: if is_correct { PATTERN_XP } else { 0 },
            correct_answer: correct,
            feedback,
        });
    }

    let item = question_item.trim();
    let correct = category_of(item).ok_or_else(|| QuizError::UnknownItem(item.to_string()))?;
    let is_correct = answer.eq_ignore_ascii_case(correct);
    let feedback = if is_correct {
        format!("✅ Correct! {item} is a {correct}.")
    } else {
        format!("❌ Not quite. {item} is a {correct}, not {answer}.")
    };

    Ok(PatternCheck {
        is_correct,
        correct_answer: correct.to_string(),
        xp_earned: if is_correct { PATTERN_XP } else { 0 },
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_word_answer() {
        let check = check_pattern_answer("Elephant", "Animal").unwrap();
        assert!(check.is_correct);
        assert_eq!(check.xp_earned, PATTERN_XP);

        let check = check_pattern_answer("Mango", "Vegetable").unwrap();
        assert!(!check.is_correct);
        assert_eq!(check.correct_answer, "Fruit");
        assert_eq!(check.xp_earned, 0);
        assert!(check.feedback.contains("not Vegetable"));
    }

    #[test]
    fn test_word_answer_ignores_case() {
        assert!(check_pattern_answer(" jupiter ", "planet").unwrap().is_correct);
    }

    #[test]
    fn test_number_answer() {
        let check = check_pattern_answer("3 7 11 15", "19").unwrap();
        assert!(check.is_correct);
        assert!(check.feedback.contains("increases by 4"));

        let check = check_pattern_answer("3 7 11 15", "17").unwrap();
        assert!(!check.is_correct);
        assert_eq!(check.correct_answer, "19");
    }

    #[test]
    fn test_unanswerable_items() {
        assert_eq!(
            check_pattern_answer("Xylophone", "Animal"),
            Err(QuizError::UnknownItem("Xylophone".to_string()))
        );
        assert!(matches!(
            check_pattern_answer("1 two 3", "4"),
            Err(QuizError::MalformedSequence(_))
        ));
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("Easy"), Difficulty::Easy);
        assert_eq!(Difficulty::parse("medium"), Difficulty::Medium);
        assert_eq!(Difficulty::parse("expert"), Difficulty::Hard);
    }

    #[test]
    fn test_generated_questions_have_one_right_option() {
        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for _ in 0..200 {
                let question = pattern_question(difficulty, &mut rng);
                let right = question
                    .options
                    .iter()
                    .filter(|option| {
                        check_pattern_answer(&question.question_item, option)
                            .unwrap()
                            .is_correct
                    })
                    .count();
                assert_eq!(right, 1, "{question:?}");

                match question.kind {
                    PatternKind::Word => {
                        assert_eq!(question.examples.len(), difficulty.example_count());
                        assert_eq!(question.options.len(), difficulty.option_count());
                        assert!(question.examples.iter().all(|e| e.item != question.question_item));
                    }
                    PatternKind::Number => {
                        assert_eq!(question.examples.len(), NUMBER_EXAMPLES);
                        assert_eq!(question.options.len(), 4);
                    }
                }
            }
        }
    }

    #[test]
    fn test_number_examples_are_consistent() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            for example in number_question(&mut rng).examples {
                let check = check_pattern_answer(&example.item, &example.category).unwrap();
                assert!(check.is_correct);
            }
        }
    }
}
