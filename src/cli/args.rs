//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Database migration tool
#[derive(Parser, Debug)]
#[command(name = "mite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory to start project discovery from (default: cwd)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show migration status
    Status,

    /// Init the project config and migrations directory
    Init,

    /// Run all unexecuted migrations
    Up,

    /// Run the first unexecuted migration
    Stepup,

    /// Run all the down migrations
    Down {
        /// Confirm potentially dangerous operation
        #[arg(short = 'C', long)]
        confirm: bool,
    },

    /// Step down one migration from the current head
    Stepdown {
        /// Confirm potentially dangerous operation
        #[arg(short = 'C', long)]
        confirm: bool,
    },

    /// Create a new (empty) migration file
    Create {
        /// Open the new migration after creating it
        #[arg(short = 'O', long)]
        open: bool,
    },

    /// Determine what's wrong with your migrations
    Audit,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
