use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version, about = "Flashcard drills with spaced review and blind ladders", long_about = None)]
pub struct Cli {
    /// SQLite database holding card stats.
    #[arg(long = "db", env = "FLASH_DB_URL", default_value = "sqlite:flash.sqlite3")]
    pub db_url: String,

    /// Directory of JSON deck files.
    #[arg(long, env = "FLASH_DECKS_DIR", default_value = "decks")]
    pub decks: PathBuf,

    /// Sub-folder of the deck directory to play from.
    #[arg(long, default_value = "")]
    pub scope: String,

    /// JSON file replacing the shipped blind ladder.
    #[arg(long)]
    pub ladder: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Play one deck, due cards first.
    Unit {
        /// Deck id.
        #[arg(long)]
        deck: String,
    },
    /// Climb the blind ladder with cards from every deck in scope.
    Blind,
    /// Show unseen, due and scheduled counts per deck.
    Overview,
    /// Store a stats blob (card id -> stats JSON object).
    ImportStats { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_unit_with_defaults() {
        let cli = Cli::try_parse_from(["flash", "unit", "--deck", "net"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Unit {
                deck: "net".into()
            }
        );
        assert_eq!(cli.scope, "");
        assert!(cli.ladder.is_none());
    }

    #[test]
    fn global_flags_and_import_path() {
        let cli = Cli::try_parse_from([
            "flash",
            "--db",
            "sqlite::memory:",
            "--scope",
            "unit-1",
            "import-stats",
            "stats.json",
        ])
        .unwrap();
        assert_eq!(cli.db_url, "sqlite::memory:");
        assert_eq!(cli.scope, "unit-1");
        assert_eq!(
            cli.command,
            Command::ImportStats {
                file: PathBuf::from("stats.json")
            }
        );
    }

    #[test]
    fn unit_requires_deck() {
        assert!(Cli::try_parse_from(["flash", "unit"]).is_err());
    }
}
