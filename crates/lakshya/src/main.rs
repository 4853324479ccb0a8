//! Lakshya CLI binary.
//!
//! - Chat with the career counselor
//! - Run structured guidance flows from JSON input
//! - Inspect the effective configuration

use clap::Parser;
use lakshya::{AppContext, StudentProfile, init_telemetry};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, load_config, run_chat, run_flow, show_config};

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_telemetry(cli.verbose, cli.json_logs)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Chat {
            name,
            grade,
            interests,
            city,
            session,
        } => {
            let app = AppContext::from_config(config)?;
            let profile = StudentProfile {
                name,
                grade,
                interests,
                city,
            };
            run_chat(&app, profile, &session).await?;
        }

        Commands::Flow { name, input } => {
            let app = AppContext::from_config(config)?;
            run_flow(&app, &name, &input).await?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}
