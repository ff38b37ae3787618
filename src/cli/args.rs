//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Concept-mastery outlines: compile outline sources to JSON and aggregate mastery
#[derive(Parser, Debug)]
#[command(name = "conceptmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory holding the local .conceptmap.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// School/course pair; missing values fall back to the configured defaults.
#[derive(Args, Debug, Clone)]
pub struct OutlineArgs {
    /// School name
    pub school: Option<String>,
    /// Course name
    pub course: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and persist the JSON document for an outline
    Generate {
        #[command(flatten)]
        outline: OutlineArgs,
        /// Emit `children` on every node (render form)
        #[arg(long)]
        render: bool,
    },

    /// Validate an outline source file without writing anything
    Check {
        /// Outline source file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Validate the render form
        #[arg(long)]
        render: bool,
    },

    /// Print the concept tree and section summary of an outline source file
    Tree {
        /// Outline source file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Render an outline with positional mastery digits
    Show {
        #[command(flatten)]
        outline: OutlineArgs,
        /// One digit per leaf, in traversal order
        #[arg(short, long, default_value = "000000")]
        student_mastery: String,
        /// One digit per leaf, in traversal order (empty: all zero)
        #[arg(short = 'm', long, default_value = "")]
        class_mastery: String,
        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Apply a name-keyed mastery payload ({"Concept": "mastered", ...})
    Update {
        /// Mastery payload JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
        #[command(flatten)]
        outline: OutlineArgs,
        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
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
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
