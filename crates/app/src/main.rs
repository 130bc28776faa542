use std::fmt;
use std::io;
use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use flash_core::BlindLadder;
use flash_core::model::DeckId;
use services::{AppServices, Clock};

mod cli;
mod play;

use cli::{Cli, Command};

#[derive(Debug)]
enum AppError {
    InvalidDbUrl { raw: String },
    InvalidDeckId { raw: String },
    InvalidLadder { path: String, reason: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            AppError::InvalidDeckId { raw } => write!(f, "invalid --deck value: {raw:?}"),
            AppError::InvalidLadder { path, reason } => {
                write!(f, "invalid ladder file {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for AppError {}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| AppError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(AppError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn load_ladder(path: Option<&Path>) -> Result<BlindLadder, AppError> {
    let Some(path) = path else {
        return Ok(BlindLadder::standard());
    };
    let invalid = |reason: String| AppError::InvalidLadder {
        path: path.display().to_string(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.db_url.trim().is_empty() {
        return Err(AppError::InvalidDbUrl { raw: cli.db_url }.into());
    }
    let db_url = normalize_sqlite_url(&cli.db_url);
    let ladder = load_ladder(cli.ladder.as_deref())?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    let app = AppServices::new_sqlite(&db_url, cli.decks.clone(), Clock::default(), ladder).await?;
    info!(db = %db_url, decks = %cli.decks.display(), scope = %cli.scope, "storage ready");

    match cli.command {
        Command::Unit { deck } => {
            let deck_id: DeckId = deck
                .parse()
                .map_err(|_| AppError::InvalidDeckId { raw: deck.clone() })?;
            let game = app.game_loop();
            let mut session = game.start_unit(&cli.scope, &deck_id).await?;
            play::play(&game, &mut session, &mut io::stdin().lock(), &mut io::stdout()).await
        }
        Command::Blind => {
            let game = app.game_loop();
            let mut session = game.start_random(&cli.scope).await?;
            play::play(&game, &mut session, &mut io::stdin().lock(), &mut io::stdout()).await
        }
        Command::Overview => {
            let report = app.deck_service().load_scope(&cli.scope).await?;
            let stats = app.stats_service();
            for deck in &report.decks {
                let o = stats.deck_overview(deck).await?;
                let next = o
                    .next_due
                    .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string());
                let title = match deck.unit() {
                    Some(unit) => format!("{} ({unit})", deck.title()),
                    None => deck.title().to_string(),
                };
                println!(
                    "{:<20} {:<40} {:>4} cards  {:>4} new  {:>4} due  {:>4} later  next {next}",
                    deck.id().as_str(),
                    title,
                    o.total,
                    o.unseen,
                    o.due,
                    o.scheduled
                );
            }
            for rejected in &report.rejected {
                println!("skipped {}: {}", rejected.path, rejected.reason);
            }
            Ok(())
        }
        Command::ImportStats { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let count = app.stats_service().import_json(&raw).await?;
            println!("imported stats for {count} card(s)");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // Parse first so --help and --version print without log noise.
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
