use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::model::Question;

/// A player's answer plus how long they took.
///
/// The elapsed time is telemetry only; it never affects judging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    value: i64,
    elapsed_secs: f64,
}

impl Submission {
    /// # Errors
    ///
    /// Returns `InvalidInput::ElapsedSeconds` for negative, NaN, or infinite durations.
    pub fn new(value: i64, elapsed_secs: f64) -> Result<Self, InvalidInput> {
        if !elapsed_secs.is_finite() || elapsed_secs < 0.0 {
            return Err(InvalidInput::ElapsedSeconds(elapsed_secs));
        }
        Ok(Self {
            value,
            elapsed_secs,
        })
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }
}

/// Judges submitted answers. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerEvaluator;

impl AnswerEvaluator {
    #[must_use]
    pub fn evaluate(question: &Question, submitted: i64) -> bool {
        submitted == question.correct_answer()
    }

    #[must_use]
    pub fn judge(question: &Question, submission: &Submission) -> bool {
        Self::evaluate(question, submission.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::QuestionGenerator;
    use crate::model::Round;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn only_the_correct_option_is_accepted() {
        let generator = QuestionGenerator::new();
        let mut rng = StdRng::seed_from_u64(99);
        for value in 1..=10 {
            let q = generator.generate(Round::new(value).unwrap(), &mut rng);
            assert!(AnswerEvaluator::evaluate(&q, q.correct_answer()));
            for &option in q.options() {
                if option != q.correct_answer() {
                    assert!(!AnswerEvaluator::evaluate(&q, option));
                }
            }
        }
    }

    #[test]
    fn elapsed_time_does_not_change_the_verdict() {
        let q = QuestionGenerator::new().generate(Round::FIRST, &mut StdRng::seed_from_u64(1));
        let fast = Submission::new(q.correct_answer(), 0.0).unwrap();
        let slow = Submission::new(q.correct_answer(), 3_600.0).unwrap();
        assert!(AnswerEvaluator::judge(&q, &fast));
        assert!(AnswerEvaluator::judge(&q, &slow));
    }

    #[test]
    fn rejects_bad_elapsed_seconds() {
        assert!(Submission::new(1, -0.5).is_err());
        assert!(Submission::new(1, f64::NAN).is_err());
        assert!(Submission::new(1, f64::INFINITY).is_err());
    }
}
