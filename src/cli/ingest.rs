use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::categorizer::CategoryTable;
use crate::cli::IngestArgs;
use crate::db::{checksum_seen, get_connection, init_db, record_ingest_run};
use crate::error::{BirrError, Result};
use crate::fmt::{etb, or_unknown};
use crate::ingest::{ingest_messages, IngestOptions, Pipeline};
use crate::models::{Direction, TransactionRecord};
use crate::receipt::{FetchOptions, HttpReceipts, NoReceipts, ReceiptSource};
use crate::rules::{CompiledRules, RuleTable};
use crate::settings::{load_settings, parse_day, Settings};
use crate::sources::{compute_checksum, load_messages};

pub fn run(args: IngestArgs) -> Result<()> {
    let settings = load_settings();
    let file = PathBuf::from(&args.file);

    let categories_path = args
        .categories
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.categories_path());
    let categories = CategoryTable::load(&categories_path)?;
    if categories.is_empty() {
        warn!(path = %categories_path.display(), "category table is empty; reasons are used as categories");
    }
    let rules = load_rules(args.rules.as_deref(), &settings)?;
    let cutoff = match &args.since {
        Some(day) => parse_day(day)?,
        None => settings.cutoff()?,
    };

    let loaded = load_messages(&file, args.format.as_deref())?;
    let checksum = compute_checksum(&file)?;

    let db_path = settings.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    if checksum_seen(&conn, &checksum)? {
        warn!(file = %file.display(), "this file was ingested before");
        println!("This file was ingested before; its transactions will be stored again.");
    }

    let receipts = receipt_source(
        args.offline,
        args.insecure_receipts || settings.insecure_receipts,
        args.timeout.unwrap_or(settings.fetch_timeout_secs),
    )?;
    let pipeline = Pipeline {
        rules: &rules,
        categories: &categories,
        receipts: receipts.as_ref(),
    };
    let options = IngestOptions {
        cutoff,
        dry_run: args.dry_run,
    };

    let mut summary = ingest_messages(&conn, &loaded.messages, &pipeline, &options, |record| {
        println!("{}", describe(record));
    });
    summary.rejected += loaded.skipped;

    let verb = if args.dry_run { "would be stored" } else { "stored" };
    println!(
        "{} {verb}, {} before {cutoff}, {} not transactions, {} rejected",
        summary.accepted, summary.before_cutoff, summary.unmatched, summary.rejected
    );

    if !args.dry_run {
        record_ingest_run(&conn, &source_name(&file), &checksum, summary.accepted, summary.rejected)?;
    }
    Ok(())
}

pub(crate) fn load_rules(cli_path: Option<&str>, settings: &Settings) -> Result<CompiledRules> {
    match cli_path.or(settings.rules_file.as_deref()) {
        Some(path) => RuleTable::load(Path::new(path))?.compile(),
        None => CompiledRules::builtin(),
    }
}

pub(crate) fn receipt_source(
    offline: bool,
    insecure: bool,
    timeout_secs: u64,
) -> Result<Box<dyn ReceiptSource>> {
    if offline {
        return Ok(Box::new(NoReceipts));
    }
    let receipts = HttpReceipts::new(FetchOptions {
        insecure,
        timeout: Duration::from_secs(timeout_secs),
    })
    .map_err(|e| BirrError::Other(format!("{e:#}")))?;
    Ok(Box::new(receipts))
}

fn source_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string())
}

pub fn describe(record: &TransactionRecord) -> String {
    let amount = etb(record.transaction_amount);
    match record.direction {
        Direction::Incoming => format!(
            "Incoming transaction of {amount} received from {}",
            or_unknown(&record.payer)
        ),
        Direction::Outgoing => format!(
            "Outgoing transaction of {amount} to {}",
            or_unknown(&record.receiver)
        ),
    }
}
