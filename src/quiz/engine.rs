//! Pure quiz state machine. Delays between phases are driven by the session
//! controller; this type only answers "what happens next".
//!
//! Idle -> QuestionShown -> Answered -> (QuestionShown | Closed)

use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::random::SharedRng;

use super::catalog::{Difficulty, QuestionBank, QuizQuestion};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum QuizPhase {
    #[default]
    Idle,
    QuestionShown,
    Answered,
    Closed,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub question_id: u32,
    pub selected_option: usize,
    pub correct: bool,
    pub score: u32,
    pub attempted: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: u32,
    pub attempted: u32,
    /// False when the quiz was dismissed before the last question.
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub phase: QuizPhase,
    pub question: Option<QuizQuestion>,
    pub selected_option: Option<usize>,
    pub correct: Option<bool>,
    pub score: u32,
    /// 1-based number of the question on screen.
    pub question_number: u32,
    pub questions_per_quiz: u32,
}

pub struct QuizEngine {
    bank: Arc<QuestionBank>,
    questions_per_quiz: u32,
    phase: QuizPhase,
    difficulty: Difficulty,
    current: Option<QuizQuestion>,
    selected: Option<usize>,
    correct: Option<bool>,
    score: u32,
    attempted: u32,
}

impl QuizEngine {
    pub fn new(bank: Arc<QuestionBank>, questions_per_quiz: u32) -> Self {
        Self {
            bank,
            questions_per_quiz: questions_per_quiz.max(1),
            phase: QuizPhase::Idle,
            difficulty: Difficulty::Easy,
            current: None,
            selected: None,
            correct: None,
            score: 0,
            attempted: 0,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, QuizPhase::QuestionShown | QuizPhase::Answered)
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.current.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    /// True once the configured number of questions has been answered.
    pub fn is_complete(&self) -> bool {
        self.attempted >= self.questions_per_quiz
    }

    /// Opens a fresh quiz sized to the current attention. Returns `None` if a
    /// quiz is already open.
    pub fn open(&mut self, attention: f64, rng: &SharedRng) -> Option<QuizQuestion> {
        if self.is_open() {
            return None;
        }
        self.difficulty = Difficulty::for_attention(attention);
        let question = self.bank.pick(self.difficulty, rng).clone();
        debug!(
            "Quiz opened at attention {:.1}: {:?} question {}",
            attention, self.difficulty, question.id
        );

        self.phase = QuizPhase::QuestionShown;
        self.current = Some(question.clone());
        self.selected = None;
        self.correct = None;
        self.score = 0;
        self.attempted = 0;
        Some(question)
    }

    /// Only the first selection on a shown question counts; anything else is
    /// a no-op returning `None`.
    pub fn select_option(&mut self, option: usize) -> Option<AnswerOutcome> {
        if self.phase != QuizPhase::QuestionShown {
            return None;
        }
        let question = self.current.as_ref()?;
        if option >= question.options.len() {
            warn!(
                "Ignoring option {} for question {} with {} options",
                option,
                question.id,
                question.options.len()
            );
            return None;
        }

        let correct = question.is_correct(option);
        let question_id = question.id;
        if correct {
            self.score += 1;
        }
        self.attempted += 1;
        self.selected = Some(option);
        self.correct = Some(correct);
        self.phase = QuizPhase::Answered;

        Some(AnswerOutcome {
            question_id,
            selected_option: option,
            correct,
            score: self.score,
            attempted: self.attempted,
        })
    }

    /// Moves from feedback to the next question, excluding the one just
    /// answered. `None` unless answered and questions remain.
    pub fn next_question(&mut self, rng: &SharedRng) -> Option<QuizQuestion> {
        if self.phase != QuizPhase::Answered || self.is_complete() {
            return None;
        }
        let previous = self.current.as_ref().map(|q| q.id)?;
        let question = self.bank.pick_next(previous, self.difficulty, rng).clone();

        self.phase = QuizPhase::QuestionShown;
        self.current = Some(question.clone());
        self.selected = None;
        self.correct = None;
        Some(question)
    }

    /// Closes an open quiz, discarding any in-progress question.
    pub fn close(&mut self) -> Option<QuizResult> {
        if !self.is_open() {
            return None;
        }
        let result = QuizResult {
            score: self.score,
            attempted: self.attempted,
            completed: self.is_complete(),
        };
        self.phase = QuizPhase::Closed;
        self.current = None;
        self.selected = None;
        self.correct = None;
        Some(result)
    }

    pub fn view(&self) -> QuizView {
        QuizView {
            phase: self.phase,
            question: self.current.clone(),
            selected_option: self.selected,
            correct: self.correct,
            score: self.score,
            question_number: match self.phase {
                QuizPhase::Answered => self.attempted,
                _ => (self.attempted + 1).min(self.questions_per_quiz),
            },
            questions_per_quiz: self.questions_per_quiz,
        }
    }
}
