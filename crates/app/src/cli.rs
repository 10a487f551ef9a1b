//! Command-line interface for the quiz.

use clap::{Args, Parser, Subcommand};

use services::config::{DatabaseTarget, GameConfig, ScoringConfig};

/// Ten-round arithmetic quiz with a boss round at the end
#[derive(Parser, Debug)]
#[command(name = "quiz")]
#[command(about = "Ten-round arithmetic quiz", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that take precedence over `QUIZ_*` environment variables.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// SQLite URL or file path; `memory` keeps stats in memory only
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Base URL of a score authority that must confirm every answer
    #[arg(long, global = true)]
    pub scoring_url: Option<String>,

    /// Seed for a reproducible question stream
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(db) = &self.db {
            config.database = DatabaseTarget::parse(db);
        }
        if let Some(url) = &self.scoring_url {
            let api_token = config.scoring.take().and_then(|s| s.api_token);
            config.scoring = Some(ScoringConfig {
                base_url: url.clone(),
                api_token,
            });
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one game in the terminal
    Play {
        /// Player name; asked interactively when omitted
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show lifetime statistics for a player
    Stats {
        /// Player name
        #[arg(short, long)]
        player: String,
    },
}
