use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expression {0} does not evaluate to a whole number")]
    InexactExpression(String),

    #[error("options must contain the correct answer {0} exactly once")]
    MissingCorrectAnswer(i64),

    #[error("options must be distinct, {0} appears more than once")]
    DuplicateOption(i64),
}

//
// ─── OPERATOR ──────────────────────────────────────────────────────────────────
//

/// The four arithmetic operators a question can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Symbol shown to the player.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//
// ─── EXPRESSION ────────────────────────────────────────────────────────────────
//

/// An ordered pair of operands joined by one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub left: i64,
    pub operator: Operator,
    pub right: i64,
}

impl Expression {
    #[must_use]
    pub fn new(left: i64, operator: Operator, right: i64) -> Self {
        Self {
            left,
            operator,
            right,
        }
    }

    /// Exact integer result, or `None` when division would leave a remainder
    /// (or divide by zero) or the result overflows.
    #[must_use]
    pub fn evaluate(&self) -> Option<i64> {
        match self.operator {
            Operator::Add => self.left.checked_add(self.right),
            Operator::Subtract => self.left.checked_sub(self.right),
            Operator::Multiply => self.left.checked_mul(self.right),
            Operator::Divide => {
                if self.right == 0 || self.left % self.right != 0 {
                    None
                } else {
                    self.left.checked_div(self.right)
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Number of answer options shown for each question.
pub const OPTION_COUNT: usize = 3;

/// A generated question: the expression, its answer, and the shuffled options.
///
/// Immutable once built. The correct answer always appears in `options`
/// exactly once and every option is distinct.
///
/// Deserializing goes through [`Question::from_parts`]; the stored answer is
/// recomputed from the expression rather than trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionParts")]
pub struct Question {
    expression: Expression,
    correct_answer: i64,
    options: [i64; OPTION_COUNT],
    is_boss_round: bool,
}

#[derive(Deserialize)]
struct QuestionParts {
    expression: Expression,
    options: [i64; OPTION_COUNT],
    is_boss_round: bool,
}

impl TryFrom<QuestionParts> for Question {
    type Error = QuestionError;

    fn try_from(parts: QuestionParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.expression, parts.options, parts.is_boss_round)
    }
}

impl Question {
    /// Rebuild a question from its parts, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the expression is not exact, the options are
    /// not distinct, or the options do not contain the answer.
    pub fn from_parts(
        expression: Expression,
        options: [i64; OPTION_COUNT],
        is_boss_round: bool,
    ) -> Result<Self, QuestionError> {
        let correct_answer = expression
            .evaluate()
            .ok_or_else(|| QuestionError::InexactExpression(expression.to_string()))?;

        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption(*option));
            }
        }
        if !options.contains(&correct_answer) {
            return Err(QuestionError::MissingCorrectAnswer(correct_answer));
        }

        Ok(Self::assemble(
            expression,
            correct_answer,
            options,
            is_boss_round,
        ))
    }

    /// Generator-side constructor; callers guarantee the invariants.
    pub(crate) fn assemble(
        expression: Expression,
        correct_answer: i64,
        options: [i64; OPTION_COUNT],
        is_boss_round: bool,
    ) -> Self {
        Self {
            expression,
            correct_answer,
            options,
            is_boss_round,
        }
    }

    #[must_use]
    pub fn expression(&self) -> Expression {
        self.expression
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.expression.operator
    }

    #[must_use]
    pub fn correct_answer(&self) -> i64 {
        self.correct_answer
    }

    #[must_use]
    pub fn options(&self) -> &[i64; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn is_boss_round(&self) -> bool {
        self.is_boss_round
    }

    /// Position of the correct answer within `options`.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|&o| o == self.correct_answer)
    }

    /// Prompt text such as `"12 ÷ 3"`.
    #[must_use]
    pub fn text(&self) -> String {
        self.expression.to_string()
    }
}
