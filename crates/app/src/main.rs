use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quiz_core::model::{GamePhase, GameSession, Question, Round};
use services::{AppServices, Clock, GameConfig, PlayerStatsView};

mod cli;

use cli::{Cli, Command};

const OPTION_KEYS: [char; 3] = ['a', 'b', 'c'];

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli
        .overrides
        .apply(GameConfig::from_env().context("reading QUIZ_* environment")?);
    info!(database = ?config.database, remote_scoring = config.scoring.is_some(), "starting");

    let services = AppServices::from_config(&config, Clock::default())
        .await
        .context("opening storage")?;

    match cli.command {
        Command::Play { name } => play(&services, name).await,
        Command::Stats { player } => {
            let stats = services.players().stats_by_name(&player).await?;
            match stats {
                Some(view) => print_stats(&view),
                None => println!("No games recorded for {player}."),
            }
            Ok(())
        }
    }
}

async fn play(services: &AppServices, name: Option<String>) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let name = match name {
        Some(name) => name,
        None => prompt(&mut input, "Your name: ")
            .await?
            .context("no player name given")?,
    };

    let games = services.games();
    let session = games.start_game(&name).await?;
    let id = session.id();
    println!(
        "{total} rounds. One wrong answer ends the game. Round {total} is the boss.",
        total = Round::TOTAL
    );
    let mut question = session.current_question().clone();

    loop {
        let current = games.session(id)?;
        show_question(&current, &question);

        let started = Instant::now();
        let Some(answer) = read_answer(&mut input, &question).await? else {
            games.abandon(id)?;
            println!("\nGame abandoned.");
            return Ok(());
        };
        let elapsed = started.elapsed().as_secs_f64();

        let outcome = games.submit_answer(id, answer, elapsed).await?;
        if outcome.correct {
            println!("Correct! Score: {}", outcome.score);
        } else {
            println!(
                "Wrong, the answer was {}. Final score: {}",
                outcome.correct_answer, outcome.score
            );
        }

        let advance = games.advance_round(id)?;
        match (advance.phase, advance.next_question) {
            (GamePhase::Playing, Some(next)) => question = next,
            (GamePhase::Completed, _) => {
                println!("Boss defeated! You cleared all ten rounds.");
                games.advance_round(id)?;
                break;
            }
            (GamePhase::Setup, _) => break,
            (phase, _) => bail!("unexpected phase after advancing: {phase}"),
        }
    }

    if let Some(view) = services.players().stats_by_name(&name).await? {
        print_stats(&view);
    }
    Ok(())
}

fn show_question(session: &GameSession, question: &Question) {
    let banner = if question.is_boss_round() {
        " BOSS ROUND"
    } else {
        ""
    };
    println!();
    println!(
        "Round {}/{}{banner}  (score {})",
        session.current_round(),
        Round::TOTAL,
        session.score()
    );
    println!("  {} = ?", question.text());
    for (key, option) in OPTION_KEYS.iter().zip(question.options()) {
        println!("  {key}) {option}");
    }
}

/// `None` on end of input. Accepts an option letter or the number itself.
async fn read_answer(input: &mut Input, question: &Question) -> Result<Option<i64>> {
    loop {
        let Some(line) = prompt(input, "> ").await? else {
            return Ok(None);
        };
        let line = line.trim().to_ascii_lowercase();
        if let Some(idx) = OPTION_KEYS
            .iter()
            .position(|k| line.len() == 1 && line.starts_with(*k))
        {
            return Ok(Some(question.options()[idx]));
        }
        match line.parse::<i64>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => println!("Type a, b, c or the number."),
        }
    }
}

async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?)
}

fn print_stats(view: &PlayerStatsView) {
    println!();
    println!("Stats for {}", view.name);
    println!("  games played:     {}", view.games_played);
    println!("  best score:       {}", view.best_score);
    println!("  average score:    {:.2}", view.average_score);
    println!("  perfect games:    {}", view.perfect_games);
    println!("  bosses defeated:  {}", view.boss_levels_completed);
}
