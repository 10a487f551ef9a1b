//! Remote confirmation of locally judged answers.
//!
//! The local session machine decides every outcome. An authority only gets to
//! agree or disagree before the result is committed.
//!
//! On the wire both sides speak in round-progress terms: `current_round` is
//! the round the next question belongs to (it stays at 10 after the boss
//! round) and `is_game_completed` means the boss round has been answered.
//! A lost run is carried by `is_correct`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use quiz_core::AnswerOutcome;
use quiz_core::model::{PlayerName, SessionId};

use crate::config::ScoringConfig;
use crate::error::{GameServiceError, ScoringError};

/// One judged submission, sent before the session is committed.
///
/// Carries the question so the authority judges the same arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    #[serde(skip)]
    pub session_id: SessionId,
    #[serde(skip)]
    pub remote_session_id: String,
    pub round: u8,
    #[serde(rename = "player_answer")]
    pub submitted: i64,
    #[serde(rename = "time_taken")]
    pub elapsed_secs: f64,
    pub question: String,
    pub correct_answer: i64,
}

/// Either side's view of a submission, in round-progress terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreVerdict {
    #[serde(rename = "is_correct")]
    pub correct: bool,
    pub score: u8,
    pub current_round: u8,
    #[serde(rename = "is_game_completed")]
    pub is_completed: bool,
}

impl ScoreVerdict {
    /// Translate a local outcome into round-progress terms.
    ///
    /// `outcome.current_round` is still the answered round at this point.
    #[must_use]
    pub fn from_outcome(outcome: &AnswerOutcome) -> Self {
        let answered = outcome.current_round;
        Self {
            correct: outcome.correct,
            score: outcome.score,
            current_round: answered.next().unwrap_or(answered).value(),
            is_completed: answered.is_boss(),
        }
    }

    /// Compare against the local verdict, field by field.
    ///
    /// # Errors
    ///
    /// Returns `GameServiceError::ScoreMismatch` naming the first field that differs.
    pub fn confirm(&self, local: &ScoreVerdict) -> Result<(), GameServiceError> {
        fn check<T: PartialEq + ToString>(
            field: &'static str,
            local: &T,
            remote: &T,
        ) -> Result<(), GameServiceError> {
            if local == remote {
                return Ok(());
            }
            Err(GameServiceError::ScoreMismatch {
                field,
                local: local.to_string(),
                remote: remote.to_string(),
            })
        }
        check("correct", &local.correct, &self.correct)?;
        check("score", &local.score, &self.score)?;
        check("current_round", &local.current_round, &self.current_round)?;
        check("is_completed", &local.is_completed, &self.is_completed)
    }
}

#[async_trait]
pub trait ScoreAuthority: Send + Sync {
    /// Open the authority's side of a new game; returns its session id.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError` when the authority cannot be reached or refuses.
    async fn open_session(&self, player_name: &PlayerName) -> Result<String, ScoringError>;

    /// Ask the authority to judge the reported submission.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError` when the authority cannot be reached or refuses.
    async fn confirm(&self, report: &ScoreReport) -> Result<ScoreVerdict, ScoringError>;
}

#[derive(Debug, Serialize)]
struct OpenGameRequest<'a> {
    player_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenGameResponse {
    session_id: String,
}

/// `ScoreAuthority` over HTTP: `POST /api/games` to open a game and
/// `POST /api/games/{id}/answer` per submission.
#[derive(Clone)]
pub struct HttpScoreAuthority {
    client: Client,
    config: Option<ScoringConfig>,
}

impl HttpScoreAuthority {
    #[must_use]
    pub fn new(config: Option<ScoringConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn games_url(config: &ScoringConfig) -> String {
        format!("{}/api/games", config.base_url.trim_end_matches('/'))
    }

    fn answer_url(config: &ScoringConfig, remote_session_id: &str) -> String {
        format!("{}/{remote_session_id}/answer", Self::games_url(config))
    }

    async fn post<B, T>(&self, url: String, body: &B) -> Result<T, ScoringError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let config = self.config.as_ref().ok_or(ScoringError::Disabled)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ScoringError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ScoreAuthority for HttpScoreAuthority {
    async fn open_session(&self, player_name: &PlayerName) -> Result<String, ScoringError> {
        let config = self.config.as_ref().ok_or(ScoringError::Disabled)?;
        let body = OpenGameRequest {
            player_name: player_name.as_str(),
        };
        let opened: OpenGameResponse = self.post(Self::games_url(config), &body).await?;
        Ok(opened.session_id)
    }

    async fn confirm(&self, report: &ScoreReport) -> Result<ScoreVerdict, ScoringError> {
        let config = self.config.as_ref().ok_or(ScoringError::Disabled)?;
        self.post(Self::answer_url(config, &report.remote_session_id), report)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{GamePhase, Round};

    fn report() -> ScoreReport {
        ScoreReport {
            session_id: SessionId::generate(),
            remote_session_id: "abc".into(),
            round: 3,
            submitted: 12,
            elapsed_secs: 1.5,
            question: "4 × 3".into(),
            correct_answer: 12,
        }
    }

    fn verdict() -> ScoreVerdict {
        ScoreVerdict {
            correct: true,
            score: 3,
            current_round: 3,
            is_completed: false,
        }
    }

    #[test]
    fn verdict_reads_answer_response_fields() {
        let parsed: ScoreVerdict = serde_json::from_str(
            r#"{"is_correct":true,"correct_answer":12,"current_round":3,"score":3,"is_game_completed":false,"is_boss_level":false}"#,
        )
        .unwrap();
        assert_eq!(parsed, verdict());
    }

    #[test]
    fn report_uses_answer_request_names() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["player_answer"], 12);
        assert_eq!(json["time_taken"], 1.5);
        assert_eq!(json["question"], "4 × 3");
        assert_eq!(json["correct_answer"], 12);
        assert!(json.get("session_id").is_none());
        assert!(json.get("remote_session_id").is_none());
    }

    #[test]
    fn confirm_names_the_first_differing_field() {
        let local = verdict();
        assert!(verdict().confirm(&local).is_ok());

        let remote = ScoreVerdict {
            score: 4,
            ..verdict()
        };
        let err = remote.confirm(&local).unwrap_err();
        assert!(matches!(
            err,
            GameServiceError::ScoreMismatch { field: "score", .. }
        ));
    }

    fn outcome(round: u8, correct: bool, score: u8, phase: GamePhase) -> AnswerOutcome {
        AnswerOutcome {
            correct,
            correct_answer: 7,
            score,
            current_round: Round::new(round).unwrap(),
            is_completed: phase == GamePhase::Lost || round == 10,
            is_boss_round: round == 10,
            phase,
        }
    }

    #[test]
    fn local_verdict_reports_the_next_round() {
        assert_eq!(
            ScoreVerdict::from_outcome(&outcome(3, true, 3, GamePhase::Won)),
            ScoreVerdict {
                correct: true,
                score: 3,
                current_round: 4,
                is_completed: false,
            }
        );
    }

    #[test]
    fn lost_run_is_carried_by_correctness_alone() {
        assert_eq!(
            ScoreVerdict::from_outcome(&outcome(3, false, 2, GamePhase::Lost)),
            ScoreVerdict {
                correct: false,
                score: 2,
                current_round: 4,
                is_completed: false,
            }
        );
    }

    #[test]
    fn boss_round_stays_at_ten_and_completes() {
        for (correct, score, phase) in [(true, 10, GamePhase::Won), (false, 9, GamePhase::Lost)] {
            let verdict = ScoreVerdict::from_outcome(&outcome(10, correct, score, phase));
            assert_eq!(verdict.current_round, 10);
            assert!(verdict.is_completed);
        }
    }

    #[test]
    fn urls_join_base_url() {
        let config = ScoringConfig {
            base_url: "http://scores.local/".into(),
            api_token: None,
        };
        assert_eq!(
            HttpScoreAuthority::games_url(&config),
            "http://scores.local/api/games"
        );
        assert_eq!(
            HttpScoreAuthority::answer_url(&config, "abc"),
            "http://scores.local/api/games/abc/answer"
        );
    }

    #[tokio::test]
    async fn unconfigured_authority_is_disabled() {
        let authority = HttpScoreAuthority::new(None);
        assert!(!authority.enabled());
        let err = authority.confirm(&report()).await.unwrap_err();
        assert!(matches!(err, ScoringError::Disabled));
        let err = authority
            .open_session(&PlayerName::new("Ann").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Disabled));
    }
}
