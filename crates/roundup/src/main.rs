// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! roundup - a recurring weekly survey bot for Telegram, backed by Google
//! Sheets.
//!
//! This is the binary entry point.

mod health;
mod serve;

use clap::{Parser, Subcommand};

/// roundup - a recurring weekly survey bot.
#[derive(Parser, Debug)]
#[command(name = "roundup", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the survey bot.
    Serve,
    /// Load and validate the configuration, then exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match roundup_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            roundup_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("roundup serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            println!(
                "roundup: config ok (agent.name={}, {} questions, rotation every {} days)",
                config.agent.name,
                config.survey.questions.len(),
                config.survey.rotation_days
            );
        }
        None => {
            println!("roundup: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = roundup_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "roundup");
    }
}
