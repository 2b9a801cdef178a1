use serde::{Deserialize, Serialize};

use crate::error::{FocusError, FocusResult};
use crate::random::SharedRng;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Below 50 is easy, below 80 medium, anything higher hard.
    pub fn for_attention(attention: f64) -> Self {
        if attention < 50.0 {
            Difficulty::Easy
        } else if attention < 80.0 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub difficulty: Difficulty,
}

impl QuizQuestion {
    fn new(id: u32, text: &str, options: [&str; 4], correct_option: usize, difficulty: Difficulty) -> Self {
        Self {
            id,
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option,
            difficulty,
        }
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

/// Read-only question catalog. Never empty.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    pub fn new(questions: Vec<QuizQuestion>) -> FocusResult<Self> {
        if questions.is_empty() {
            return Err(FocusError::Validation("question bank is empty".into()));
        }
        for question in &questions {
            if question.correct_option >= question.options.len() {
                return Err(FocusError::Validation(format!(
                    "question {} marks option {} correct but has {} options",
                    question.id,
                    question.correct_option,
                    question.options.len()
                )));
            }
        }
        Ok(Self { questions })
    }

    /// Uniform pick among questions tagged `difficulty`; the first catalog
    /// entry when none match.
    pub fn pick(&self, difficulty: Difficulty, rng: &SharedRng) -> &QuizQuestion {
        let matching: Vec<&QuizQuestion> = self
            .questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect();

        rng.index(matching.len())
            .map(|i| matching[i])
            .unwrap_or(&self.questions[0])
    }

    /// Uniform pick among every question except `previous`. A single-entry
    /// catalog falls back to `pick`.
    pub fn pick_next(&self, previous: u32, difficulty: Difficulty, rng: &SharedRng) -> &QuizQuestion {
        let others: Vec<&QuizQuestion> = self
            .questions
            .iter()
            .filter(|q| q.id != previous)
            .collect();

        match rng.index(others.len()) {
            Some(i) => others[i],
            None => self.pick(difficulty, rng),
        }
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        use Difficulty::*;
        Self {
            questions: vec![
                QuizQuestion::new(1, "What is 5 + 3?", ["7", "8", "9", "10"], 1, Easy),
                QuizQuestion::new(2, "Which animal can fly?", ["Dog", "Cat", "Bird", "Fish"], 2, Easy),
                QuizQuestion::new(3, "What is 7 × 6?", ["42", "36", "48", "54"], 0, Medium),
                QuizQuestion::new(
                    4,
                    "Which is NOT a primary color?",
                    ["Red", "Blue", "Green", "Yellow"],
                    3,
                    Medium,
                ),
                QuizQuestion::new(
                    5,
                    "How many sides does a hexagon have?",
                    ["4", "5", "6", "8"],
                    2,
                    Hard,
                ),
            ],
        }
    }
}
