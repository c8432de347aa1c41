pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "intentctl",
    about = "Intent analyzer operator CLI",
    long_about = "Inspect configuration, check model reachability, and run one-shot intent analysis.",
    after_help = "Examples:\n  intentctl doctor --json\n  intentctl config\n  intentctl analyze --text \"my order never arrived\" --domain commerce"
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
    #[command(about = "Validate config and probe the configured Gemini model")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Analyze a single message and print the structured result as JSON")]
    Analyze {
        #[arg(long, help = "Message text to analyze")]
        text: String,
        #[arg(long, default_value = "general", help = "Business domain hint")]
        domain: String,
        #[arg(long = "context", help = "Prior conversation message (repeatable)")]
        context: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Analyze { text, domain, context } => {
            commands::analyze::run(&text, &domain, context)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
