//! The session state machine: create, answer, advance.
//!
//! Every operation validates the current phase before touching the session,
//! so a rejected call leaves it exactly as it was.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::evaluator::{AnswerEvaluator, Submission};
use crate::generator::QuestionGenerator;
use crate::model::{GamePhase, GameSession, PlayerName, Question, Round, RoundRecord};
use crate::time::Clock;

/// What the caller learns after submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: i64,
    pub score: u8,
    pub current_round: Round,
    pub is_completed: bool,
    pub is_boss_round: bool,
    pub phase: GamePhase,
}

/// What the caller learns after requesting the next round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub phase: GamePhase,
    pub next_question: Option<Question>,
}

/// Drives `GameSession` transitions using an injected RNG and clock.
#[derive(Debug, Clone)]
pub struct SessionMachine<R = StdRng> {
    generator: QuestionGenerator,
    rng: R,
    clock: Clock,
}

impl SessionMachine<StdRng> {
    /// Machine seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Machine with a reproducible question stream.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SessionMachine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SessionMachine<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            generator: QuestionGenerator::new(),
            rng,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start a session at round 1 in `Playing`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidInput` for an empty or whitespace-only name.
    pub fn create_session(&mut self, player_name: &str) -> Result<GameSession, QuizError> {
        let name = PlayerName::new(player_name)?;
        let question = self.generator.generate(Round::FIRST, &mut self.rng);
        Ok(GameSession::start(name, question, self.clock.now()))
    }

    /// Judge an answer to the current question.
    ///
    /// A correct answer scores a point and moves to `Won`; a wrong one moves
    /// to `Lost`, which ends the run.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the session is `Playing`, and
    /// `QuizError::InvalidInput` for a negative or non-finite elapsed time.
    pub fn submit_answer(
        &mut self,
        session: &mut GameSession,
        submitted: i64,
        elapsed_secs: f64,
    ) -> Result<AnswerOutcome, QuizError> {
        if session.phase() != GamePhase::Playing {
            return Err(QuizError::InvalidState {
                operation: "submit an answer",
                phase: session.phase(),
            });
        }
        let submission = Submission::new(submitted, elapsed_secs)?;

        let question = session.current_question();
        let correct = AnswerEvaluator::judge(question, &submission);
        let record = RoundRecord {
            round: session.current_round(),
            expression: question.expression(),
            correct_answer: question.correct_answer(),
            player_answer: submission.value(),
            is_correct: correct,
            time_taken_secs: submission.elapsed_secs(),
        };
        session.resolve_round(record, self.clock.now())?;

        Ok(AnswerOutcome {
            correct,
            correct_answer: session.current_question().correct_answer(),
            score: session.score(),
            current_round: session.current_round(),
            is_completed: session.is_completed(),
            is_boss_round: session.current_round().is_boss(),
            phase: session.phase(),
        })
    }

    /// Move on after a resolved round.
    ///
    /// - `Won` below the boss round: next round, fresh question, `Playing`.
    /// - `Won` on the boss round: `Completed`, no question.
    /// - `Lost` or `Completed`: discarded back to `Setup`, no question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` from `Playing` or `Setup`.
    pub fn advance_round(&mut self, session: &mut GameSession) -> Result<AdvanceOutcome, QuizError> {
        match session.phase() {
            GamePhase::Won => match session.current_round().next() {
                Some(next) => {
                    let question = self.generator.generate(next, &mut self.rng);
                    session.begin_round(next, question.clone())?;
                    Ok(AdvanceOutcome {
                        phase: session.phase(),
                        next_question: Some(question),
                    })
                }
                None => {
                    session.complete()?;
                    Ok(AdvanceOutcome {
                        phase: session.phase(),
                        next_question: None,
                    })
                }
            },
            GamePhase::Lost | GamePhase::Completed => {
                session.discard()?;
                Ok(AdvanceOutcome {
                    phase: session.phase(),
                    next_question: None,
                })
            }
            phase @ (GamePhase::Playing | GamePhase::Setup) => Err(QuizError::InvalidState {
                operation: "advance the round",
                phase,
            }),
        }
    }
}
