//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Randomized rename actions and stress runs against hierarchical content stores
#[derive(Parser, Debug)]
#[command(name = "repostress")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (layered over the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a fixture as a tree
    Tree {
        /// Listing file or directory
        #[arg(value_hint = ValueHint::AnyPath)]
        fixture: PathBuf,
    },

    /// Rename one node to a free random-suffixed name
    Rename {
        /// Listing file or directory
        #[arg(value_hint = ValueHint::AnyPath)]
        fixture: PathBuf,
        /// Slash path of the node to rename, starting at the root
        path: String,
        /// Seed for the suffix generator
        #[arg(long)]
        seed: Option<u64>,
        /// Print the resulting tree
        #[arg(long)]
        show_tree: bool,
    },

    /// Run randomized rename actions against a fixture
    Run {
        /// Listing file or directory
        #[arg(value_hint = ValueHint::AnyPath)]
        fixture: PathBuf,
        /// Number of rename actions
        #[arg(short = 'n', long)]
        iterations: Option<usize>,
        /// Worker threads
        #[arg(short = 'j', long)]
        threads: Option<usize>,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective configuration as TOML
    Show,
    /// Print a commented config template
    Template,
    /// Print the global config file location
    Path,
}
