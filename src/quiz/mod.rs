pub mod catalog;
pub mod engine;

pub use catalog::{Difficulty, QuestionBank, QuizQuestion};
pub use engine::{AnswerOutcome, QuizEngine, QuizPhase, QuizResult, QuizView};
