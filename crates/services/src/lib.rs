#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod game_service;
pub mod player_service;
pub mod scoring;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::{DatabaseTarget, GameConfig, ScoringConfig};
pub use error::{
    AppServicesError, ConfigError, GameServiceError, PlayerServiceError, ScoringError,
};
pub use game_service::GameService;
pub use player_service::{PlayerService, PlayerStatsView};
pub use scoring::{HttpScoreAuthority, ScoreAuthority, ScoreReport, ScoreVerdict};
