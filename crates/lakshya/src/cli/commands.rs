//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lakshya - AI career counselor and guidance flows
#[derive(Parser, Debug)]
#[command(name = "lakshya")]
#[command(about = "AI career counselor and guidance flows for Lakshya360", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the career counselor over stdin
    Chat {
        /// Student's name
        #[arg(long, default_value = "Student")]
        name: String,

        /// Class or year, e.g. "Class 11"
        #[arg(long, default_value = "Class 12")]
        grade: String,

        /// Interests, comma separated
        #[arg(long, value_delimiter = ',')]
        interests: Vec<String>,

        /// Home city
        #[arg(long)]
        city: Option<String>,

        /// Session to resume or create
        #[arg(long, default_value = "local")]
        session: String,
    },

    /// Run a structured flow and print its JSON result
    Flow {
        /// Flow name: day_in_life, future_pathways, college_finder,
        /// recommendations or quiz_suggestions
        name: String,

        /// JSON file holding the flow input
        #[arg(long)]
        input: PathBuf,
    },

    /// Print the effective configuration
    Config,
}
