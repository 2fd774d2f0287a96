use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catchbot")]
#[command(version, about = "Summon characters, spend coins, back up the ledger")]
pub struct Cli {
    /// SQLite ledger path (overrides DB_PATH)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to Telegram and serve commands until killed
    Run,

    /// Snapshot the ledger database
    Backup {
        /// Directory for the snapshot (overrides BACKUPS_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Add (or, with a negative amount, remove) coins for a user
    Grant {
        user_id: i64,

        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Show a user's balance and characters
    Inspect { user_id: i64 },

    /// Validate and print both catalogs
    Catalog,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
