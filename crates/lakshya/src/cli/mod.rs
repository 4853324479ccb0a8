//! Command-line interface for the lakshya binary.

mod chat;
mod commands;
mod config;
mod flow;

pub use chat::run_chat;
pub use commands::{Cli, Commands};
pub use config::{load_config, show_config};
pub use flow::run_flow;
