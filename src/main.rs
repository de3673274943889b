mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod ingest;
mod models;
mod patterns;
mod receipt;
mod reports;
mod rules;
mod settings;
mod sms;
mod sources;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ReportCommands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,birr={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Ingest(args) => cli::ingest::run(args),
        Commands::Extract {
            text,
            rules,
            offline,
            insecure_receipts,
        } => cli::extract::run(&text, rules.as_deref(), offline, insecure_receipts),
        Commands::Report { command } => match command {
            ReportCommands::Monthly => cli::report::monthly(),
            ReportCommands::Receivers { limit } => cli::report::receivers(limit),
            ReportCommands::Senders { limit } => cli::report::senders(limit),
            ReportCommands::Reasons { limit } => cli::report::reasons(limit),
            ReportCommands::Categories => cli::report::categories(),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
