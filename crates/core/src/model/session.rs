use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QuizError;
use crate::model::{Expression, GameResult, PlayerName, Question, Round, SessionId};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// No live game; the session has been discarded.
    Setup,
    /// A question is waiting for an answer.
    Playing,
    /// The last answer was correct.
    Won,
    /// The last answer was wrong. Terminal.
    Lost,
    /// The boss round was won. Terminal.
    Completed,
}

impl GamePhase {
    /// Every transition the session state machine allows.
    pub const TRANSITIONS: [(GamePhase, GamePhase); 7] = [
        (GamePhase::Setup, GamePhase::Playing),
        (GamePhase::Playing, GamePhase::Won),
        (GamePhase::Playing, GamePhase::Lost),
        (GamePhase::Won, GamePhase::Playing),
        (GamePhase::Won, GamePhase::Completed),
        (GamePhase::Lost, GamePhase::Setup),
        (GamePhase::Completed, GamePhase::Setup),
    ];

    #[must_use]
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        Self::TRANSITIONS.contains(&(self, next))
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Setup => "setup",
            GamePhase::Playing => "playing",
            GamePhase::Won => "won",
            GamePhase::Lost => "lost",
            GamePhase::Completed => "completed",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ROUND RECORD ──────────────────────────────────────────────────────────────
//

/// One resolved round: what was asked and how the player answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: Round,
    pub expression: Expression,
    pub correct_answer: i64,
    pub player_answer: i64,
    pub is_correct: bool,
    pub time_taken_secs: f64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One player playthrough. Mutated only through `SessionMachine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    id: SessionId,
    player_name: PlayerName,
    score: u8,
    current_round: Round,
    current_question: Question,
    phase: GamePhase,
    rounds: Vec<RoundRecord>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub(crate) fn start(
        player_name: PlayerName,
        first_question: Question,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            player_name,
            score: 0,
            current_round: Round::FIRST,
            current_question: first_question,
            phase: GamePhase::Playing,
            rounds: Vec::new(),
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn player_name(&self) -> &PlayerName {
        &self.player_name
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn current_round(&self) -> Round {
        self.current_round
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.current_question
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// True once no further rounds will be offered: after a wrong answer,
    /// after winning the boss round, or once discarded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        match self.phase {
            GamePhase::Lost | GamePhase::Completed | GamePhase::Setup => true,
            GamePhase::Won => self.current_round.is_boss(),
            GamePhase::Playing => false,
        }
    }

    /// Final result once the outcome is decided, for statistics.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        if self.completed_at.is_none() {
            return None;
        }
        let boss_played = self.rounds.iter().any(|r| r.round.is_boss());
        Some(GameResult {
            score: self.score,
            boss_played,
        })
    }

    fn transition(&mut self, next: GamePhase, operation: &'static str) -> Result<(), QuizError> {
        if !self.phase.can_transition_to(next) {
            return Err(QuizError::InvalidState {
                operation,
                phase: self.phase,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Apply a judged answer: record it, bump score on success, and move to
    /// Won or Lost. All checks happen before any field changes.
    pub(crate) fn resolve_round(
        &mut self,
        record: RoundRecord,
        resolved_at: DateTime<Utc>,
    ) -> Result<(), QuizError> {
        let next = if record.is_correct {
            GamePhase::Won
        } else {
            GamePhase::Lost
        };
        self.transition(next, "submit an answer")?;
        if record.is_correct {
            self.score = self.score.saturating_add(1);
        }
        if next == GamePhase::Lost || self.current_round.is_boss() {
            self.completed_at = Some(resolved_at);
        }
        self.rounds.push(record);
        Ok(())
    }

    pub(crate) fn begin_round(&mut self, round: Round, question: Question) -> Result<(), QuizError> {
        self.transition(GamePhase::Playing, "advance the round")?;
        self.current_round = round;
        self.current_question = question;
        Ok(())
    }

    pub(crate) fn complete(&mut self) -> Result<(), QuizError> {
        self.transition(GamePhase::Completed, "advance the round")
    }

    pub(crate) fn discard(&mut self) -> Result<(), QuizError> {
        self.transition(GamePhase::Setup, "advance the round")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_exactly_the_listed_edges() {
        let phases = [
            GamePhase::Setup,
            GamePhase::Playing,
            GamePhase::Won,
            GamePhase::Lost,
            GamePhase::Completed,
        ];
        let allowed = phases
            .iter()
            .flat_map(|a| phases.iter().map(move |b| (*a, *b)))
            .filter(|(a, b)| a.can_transition_to(*b))
            .count();
        assert_eq!(allowed, GamePhase::TRANSITIONS.len());

        assert!(GamePhase::Playing.can_transition_to(GamePhase::Lost));
        assert!(!GamePhase::Lost.can_transition_to(GamePhase::Playing));
        assert!(!GamePhase::Completed.can_transition_to(GamePhase::Playing));
        assert!(!GamePhase::Won.can_transition_to(GamePhase::Won));
        assert!(!GamePhase::Setup.can_transition_to(GamePhase::Won));
    }

    #[test]
    fn phase_displays_snake_case() {
        assert_eq!(GamePhase::Completed.to_string(), "completed");
        assert_eq!(GamePhase::Playing.as_str(), "playing");
    }
}
