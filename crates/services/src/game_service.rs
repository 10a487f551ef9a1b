//! Session registry on top of the quiz state machine.
//!
//! Every submission is judged on a copy of the session. The copy replaces the
//! stored session only after the optional score authority agreed and, for a
//! finished game, the player's statistics were written.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use quiz_core::model::{GamePhase, GameSession, PlayerId, SessionId};
use quiz_core::{AdvanceOutcome, AnswerOutcome, SessionMachine};

use crate::error::{GameServiceError, ScoringError};
use crate::player_service::PlayerService;
use crate::scoring::{ScoreAuthority, ScoreReport, ScoreVerdict};

#[derive(Debug, Clone)]
struct LiveSession {
    session: GameSession,
    player_id: PlayerId,
    remote_session_id: Option<String>,
}

type Registry = HashMap<SessionId, LiveSession>;

#[derive(Clone)]
pub struct GameService {
    machine: Arc<Mutex<SessionMachine>>,
    sessions: Arc<Mutex<Registry>>,
    players: PlayerService,
    authority: Option<Arc<dyn ScoreAuthority>>,
}

impl GameService {
    #[must_use]
    pub fn new(machine: SessionMachine, players: PlayerService) -> Self {
        Self {
            machine: Arc::new(Mutex::new(machine)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            players,
            authority: None,
        }
    }

    /// Require every judged answer to be confirmed by `authority`.
    #[must_use]
    pub fn with_authority(mut self, authority: Arc<dyn ScoreAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    #[must_use]
    pub fn players(&self) -> &PlayerService {
        &self.players
    }

    /// Start a new game for `player_name`, registering the player if needed.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::Quiz` for a blank name,
    /// `GameServiceError::Player` if the player cannot be loaded or stored,
    /// and `GameServiceError::Scoring` if the authority cannot open the game.
    pub async fn start_game(&self, player_name: &str) -> Result<GameSession, GameServiceError> {
        let session = self.lock_machine()?.create_session(player_name)?;
        let player = self.players.ensure_player(player_name).await?;
        let remote_session_id = match &self.authority {
            Some(authority) => Some(
                authority
                    .open_session(session.player_name())
                    .await
                    .inspect_err(|err| {
                        warn!(error = %err, "score authority could not open a game");
                    })?,
            ),
            None => None,
        };

        self.lock_sessions()?.insert(
            session.id(),
            LiveSession {
                session: session.clone(),
                player_id: player.id(),
                remote_session_id,
            },
        );
        info!(
            session_id = %session.id(),
            player = %session.player_name(),
            "game session created"
        );
        Ok(session)
    }

    /// Judge an answer for the session's current question.
    ///
    /// On any error the stored session is left untouched.
    ///
    /// # Errors
    ///
    /// - `GameServiceError::SessionNotFound` for an unknown id.
    /// - `GameServiceError::Quiz` when the session is not `Playing` or the
    ///   elapsed time is invalid.
    /// - `GameServiceError::Scoring` when the authority cannot be reached.
    /// - `GameServiceError::ScoreMismatch` when the authority disagrees.
    /// - `GameServiceError::Player` when statistics cannot be recorded.
    pub async fn submit_answer(
        &self,
        session_id: SessionId,
        submitted: i64,
        elapsed_secs: f64,
    ) -> Result<AnswerOutcome, GameServiceError> {
        let LiveSession {
            session: mut working,
            player_id,
            remote_session_id,
        } = self.snapshot(session_id)?;
        let round = working.current_round();
        let question = working.current_question().clone();

        let outcome = self
            .lock_machine()?
            .submit_answer(&mut working, submitted, elapsed_secs)?;
        debug!(
            session_id = %session_id,
            round = round.value(),
            correct = outcome.correct,
            score = outcome.score,
            "answer judged"
        );

        if let Some(authority) = &self.authority {
            let report = ScoreReport {
                session_id,
                remote_session_id: remote_session_id.ok_or(ScoringError::Disabled)?,
                round: round.value(),
                submitted,
                elapsed_secs,
                question: question.text(),
                correct_answer: question.correct_answer(),
            };
            let remote = authority.confirm(&report).await.inspect_err(|err| {
                warn!(session_id = %session_id, error = %err, "score authority unavailable");
            })?;
            remote
                .confirm(&ScoreVerdict::from_outcome(&outcome))
                .inspect_err(|err| {
                    warn!(session_id = %session_id, error = %err, "remote verdict rejected");
                })?;
        }

        if let Some(result) = working.result() {
            self.players.record_result(player_id, result).await?;
            info!(
                session_id = %session_id,
                score = result.score,
                phase = %outcome.phase,
                "game finished"
            );
        }

        self.commit(session_id, working)?;
        Ok(outcome)
    }

    /// Move a resolved session on: next question, completion, or reset.
    ///
    /// A session reset to `Setup` is dropped from the registry.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::SessionNotFound` for an unknown id and
    /// `GameServiceError::Quiz` when called from `Playing`.
    pub fn advance_round(&self, session_id: SessionId) -> Result<AdvanceOutcome, GameServiceError> {
        let mut sessions = self.lock_sessions()?;
        let live = sessions
            .get_mut(&session_id)
            .ok_or(GameServiceError::SessionNotFound(session_id))?;
        let outcome = self.lock_machine()?.advance_round(&mut live.session)?;
        let round = live.session.current_round().value();

        if outcome.phase == GamePhase::Setup {
            sessions.remove(&session_id);
            info!(session_id = %session_id, "game session discarded");
        } else {
            info!(
                session_id = %session_id,
                round,
                phase = %outcome.phase,
                "round advanced"
            );
        }
        Ok(outcome)
    }

    /// Current state of a live session.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::SessionNotFound` for an unknown id.
    pub fn session(&self, session_id: SessionId) -> Result<GameSession, GameServiceError> {
        Ok(self.snapshot(session_id)?.session)
    }

    /// Drop a session in any phase. Statistics already recorded are kept.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::SessionNotFound` for an unknown id.
    pub fn abandon(&self, session_id: SessionId) -> Result<(), GameServiceError> {
        self.lock_sessions()?
            .remove(&session_id)
            .ok_or(GameServiceError::SessionNotFound(session_id))?;
        info!(session_id = %session_id, "game session abandoned");
        Ok(())
    }

    /// Number of sessions currently held.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::LockPoisoned` if the registry is unusable.
    pub fn live_sessions(&self) -> Result<usize, GameServiceError> {
        Ok(self.lock_sessions()?.len())
    }

    fn snapshot(&self, session_id: SessionId) -> Result<LiveSession, GameServiceError> {
        self.lock_sessions()?
            .get(&session_id)
            .cloned()
            .ok_or(GameServiceError::SessionNotFound(session_id))
    }

    fn commit(&self, session_id: SessionId, session: GameSession) -> Result<(), GameServiceError> {
        let mut sessions = self.lock_sessions()?;
        let live = sessions
            .get_mut(&session_id)
            .ok_or(GameServiceError::SessionNotFound(session_id))?;
        live.session = session;
        Ok(())
    }

    fn lock_sessions(&self) -> Result<MutexGuard<'_, Registry>, GameServiceError> {
        self.sessions
            .lock()
            .map_err(|_| GameServiceError::LockPoisoned)
    }

    fn lock_machine(&self) -> Result<MutexGuard<'_, SessionMachine>, GameServiceError> {
        self.machine
            .lock()
            .map_err(|_| GameServiceError::LockPoisoned)
    }
}
