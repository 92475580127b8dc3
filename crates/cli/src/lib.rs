pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "clerky",
    about = "Clerky operator CLI",
    long_about = "Inspect Clerky configuration, check runtime readiness, and exercise the chat engine from a terminal.",
    after_help = "Examples:\n  clerky doctor --json\n  clerky config\n  clerky ask \"What are your shipping rates?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, provider readiness, and catalog connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Send one message through the chat engine and print the reply")]
    Ask {
        #[arg(help = "The customer message to answer")]
        message: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Ask { message, json } => commands::ask::run(&message, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
