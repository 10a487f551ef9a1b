//! Question generation: difficulty curve, operand selection, distractors.
//!
//! Randomness is always passed in, so a seeded RNG reproduces the same
//! question stream.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::QuizError;
use crate::model::{Expression, Operator, Question, Round};

/// Number of wrong answers shown alongside the correct one.
pub const DISTRACTOR_COUNT: usize = 2;

/// Sampling attempts before distractor synthesis falls back to fixed offsets.
pub const MAX_DISTRACTOR_ATTEMPTS: u32 = 20;

/// Upper operand bound for add/subtract/divide in a normal round:
/// `min(5 + floor(round * 1.5), 12)`.
#[must_use]
pub fn difficulty_ceiling(round: Round) -> i64 {
    let r = i64::from(round.value());
    (5 + (r * 3) / 2).min(12)
}

//
// ─── DISTRACTORS ───────────────────────────────────────────────────────────────
//

/// Produces plausible wrong answers near the correct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistractorSynthesizer {
    max_attempts: u32,
}

impl Default for DistractorSynthesizer {
    fn default() -> Self {
        Self {
            max_attempts: MAX_DISTRACTOR_ATTEMPTS,
        }
    }
}

impl DistractorSynthesizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Maximum distance of a sampled distractor from the correct answer.
    #[must_use]
    pub fn spread(operator: Operator) -> i64 {
        match operator {
            Operator::Multiply => 10,
            Operator::Divide => 4,
            Operator::Add | Operator::Subtract => 5,
        }
    }

    /// Rejection-sample two distractors within the bounded attempt budget.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::GenerationExhausted` when the budget runs out
    /// before two valid distractors are found.
    pub fn try_synthesize<R: Rng + ?Sized>(
        &self,
        correct: i64,
        operator: Operator,
        rng: &mut R,
    ) -> Result<[i64; DISTRACTOR_COUNT], QuizError> {
        let accepted = self.sample(correct, operator, rng);
        match accepted.as_slice() {
            [a, b] => Ok([*a, *b]),
            _ => Err(QuizError::GenerationExhausted {
                attempts: self.max_attempts,
            }),
        }
    }

    /// Like [`try_synthesize`](Self::try_synthesize), but tops up any shortfall
    /// with `correct + 1`, `correct + 2`, … so it always succeeds.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        correct: i64,
        operator: Operator,
        rng: &mut R,
    ) -> [i64; DISTRACTOR_COUNT] {
        let mut accepted = self.sample(correct, operator, rng);
        let mut offset = 1;
        while accepted.len() < DISTRACTOR_COUNT {
            let candidate = correct.max(0) + offset;
            if candidate != correct && !accepted.contains(&candidate) {
                accepted.push(candidate);
            }
            offset += 1;
        }
        [accepted[0], accepted[1]]
    }

    fn sample<R: Rng + ?Sized>(&self, correct: i64, operator: Operator, rng: &mut R) -> Vec<i64> {
        let spread = Self::spread(operator);
        let mut accepted = Vec::with_capacity(DISTRACTOR_COUNT);
        for _ in 0..self.max_attempts {
            if accepted.len() == DISTRACTOR_COUNT {
                break;
            }
            let candidate = correct + rng.random_range(-spread..=spread);
            if candidate != correct && candidate > 0 && !accepted.contains(&candidate) {
                accepted.push(candidate);
            }
        }
        accepted
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// Builds a `Question` for a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionGenerator {
    distractors: DistractorSynthesizer,
}

impl QuestionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a question with a uniformly chosen operator.
    pub fn generate<R: Rng + ?Sized>(&self, round: Round, rng: &mut R) -> Question {
        let operator = Operator::ALL[rng.random_range(0..Operator::ALL.len())];
        self.generate_with(round, operator, rng)
    }

    /// Generate a question for a fixed operator.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        round: Round,
        operator: Operator,
        rng: &mut R,
    ) -> Question {
        let (expression, correct) = build_expression(round, operator, rng);
        let [first, second] = self.distractors.synthesize(correct, operator, rng);
        let mut options = [correct, first, second];
        options.shuffle(rng);
        Question::assemble(expression, correct, options, round.is_boss())
    }
}

/// Picks operands for the round's difficulty and returns the expression with its answer.
fn build_expression<R: Rng + ?Sized>(
    round: Round,
    operator: Operator,
    rng: &mut R,
) -> (Expression, i64) {
    let boss = round.is_boss();
    let r = i64::from(round.value());
    let ceiling = difficulty_ceiling(round);

    match operator {
        Operator::Add | Operator::Subtract => {
            let (lo, hi) = if boss { (10, 24) } else { (1, ceiling) };
            let mut left = rng.random_range(lo..=hi);
            let mut right = rng.random_range(lo..=hi);
            if operator == Operator::Add {
                return (Expression::new(left, operator, right), left + right);
            }
            if left < right {
                std::mem::swap(&mut left, &mut right);
            }
            (Expression::new(left, operator, right), left - right)
        }
        Operator::Multiply => {
            let (lo, hi) = if boss { (5, 12) } else { (1, (r + 2).min(10)) };
            let left = rng.random_range(lo..=hi);
            let right = rng.random_range(lo..=hi);
            (Expression::new(left, operator, right), left * right)
        }
        Operator::Divide => {
            // Quotient first, then dividend = quotient * divisor, so it divides evenly.
            let (quotient, divisor) = if boss {
                (rng.random_range(2..=10), rng.random_range(2..=9))
            } else {
                (
                    rng.random_range(1..=ceiling),
                    rng.random_range(1..=(r + 1).min(8)),
                )
            };
            (
                Expression::new(quotient * divisor, operator, divisor),
                quotient,
            )
        }
    }
}
