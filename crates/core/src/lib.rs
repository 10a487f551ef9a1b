//! Arithmetic quiz domain: question generation, answer judging, and the
//! session state machine. Pure and synchronous; randomness and time are injected.

#![forbid(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod generator;
pub mod machine;
pub mod model;
pub mod time;

pub use error::{InvalidInput, QuizError};
pub use evaluator::{AnswerEvaluator, Submission};
pub use generator::{DistractorSynthesizer, QuestionGenerator, difficulty_ceiling};
pub use machine::{AdvanceOutcome, AnswerOutcome, SessionMachine};
pub use time::Clock;
