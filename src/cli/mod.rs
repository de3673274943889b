pub mod extract;
pub mod ingest;
pub mod init;
pub mod report;
pub mod status;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "birr", about = "Turn bank SMS notifications into a ledger of transactions.")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for birr data (default: ~/Documents/birr)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Extract, categorize and store transactions from an SMS export.
    Ingest(IngestArgs),
    /// Show what would be extracted from a single message.
    Extract {
        /// Message body
        text: String,
        /// Rule table JSON overriding the built-in patterns
        #[arg(long)]
        rules: Option<String>,
        /// Do not download linked receipts
        #[arg(long)]
        offline: bool,
        /// Skip TLS certificate verification for receipt downloads
        #[arg(long = "insecure-receipts")]
        insecure_receipts: bool,
    },
    /// Summaries of stored transactions.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show paths, counts and the last ingest run.
    Status,
}

#[derive(Args)]
pub struct IngestArgs {
    /// JSON export or adb content-query dump
    pub file: String,
    /// Source format key (json, adb); detected when omitted
    #[arg(long)]
    pub format: Option<String>,
    /// Ignore messages before this day (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,
    /// Category table JSON (default: <data_dir>/category.json)
    #[arg(long)]
    pub categories: Option<String>,
    /// Rule table JSON overriding the built-in patterns
    #[arg(long)]
    pub rules: Option<String>,
    /// Skip TLS certificate verification for receipt downloads
    #[arg(long = "insecure-receipts")]
    pub insecure_receipts: bool,
    /// Receipt download timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Do not download linked receipts
    #[arg(long)]
    pub offline: bool,
    /// Extract and report without writing to the database
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income and expenses per month.
    Monthly,
    /// Largest receivers of outgoing payments.
    Receivers {
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// Largest payers of incoming transfers.
    Senders {
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// Most frequent payment reasons.
    Reasons {
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// Totals per category.
    Categories,
}
