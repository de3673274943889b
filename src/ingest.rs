use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::categorizer::CategoryTable;
use crate::db::insert_transaction;
use crate::error::{BirrError, Result};
use crate::models::{RawMessage, TransactionRecord};
use crate::patterns::{Extraction, Field};
use crate::receipt::ReceiptSource;
use crate::rules::CompiledRules;
use crate::sms::extract_sms;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount such as `12,345.67`.
pub fn parse_amount(field: Field, raw: &str) -> Result<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BirrError::InvalidAmount {
            field,
            value: raw.to_string(),
        })
}

fn required(fields: &Extraction, field: Field) -> Result<&str> {
    fields.get(field).ok_or(BirrError::MissingField(field))
}

/// Local wall-clock time of a millisecond timestamp, truncated to the second.
pub fn message_time(epoch_ms: i64) -> Result<NaiveDateTime> {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .and_then(|t| t.naive_local().with_nanosecond(0))
        .ok_or(BirrError::InvalidTimestamp(epoch_ms))
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Collaborators shared by every message in a batch.
pub struct Pipeline<'a> {
    pub rules: &'a CompiledRules,
    pub categories: &'a CategoryTable,
    pub receipts: &'a dyn ReceiptSource,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Messages strictly before midnight (local) of this day are skipped.
    pub cutoff: NaiveDate,
    /// Extract and validate without writing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub before_cutoff: usize,
    pub unmatched: usize,
    pub rejected: usize,
}

#[derive(Debug)]
enum Outcome {
    Accepted(TransactionRecord),
    BeforeCutoff,
    Unmatched,
}

/// Turn a message body into a record. `None` when the body is not a
/// transaction notification.
pub fn build_record(
    date: NaiveDateTime,
    text: &str,
    pipeline: &Pipeline<'_>,
) -> Result<Option<TransactionRecord>> {
    let Some(extraction) = extract_sms(text, pipeline.rules, pipeline.receipts) else {
        return Ok(None);
    };
    let fields = &extraction.fields;

    let transaction_amount = parse_amount(
        Field::TransactionAmount,
        required(fields, Field::TransactionAmount)?,
    )?;
    let current_balance = parse_amount(
        Field::CurrentBalance,
        required(fields, Field::CurrentBalance)?,
    )?;
    let total_amount = parse_amount(Field::TotalAmount, required(fields, Field::TotalAmount)?)?;

    let reason = fields.get(Field::Reason).unwrap_or_default().to_string();
    let category = pipeline.categories.categorize(&reason);

    Ok(Some(TransactionRecord {
        date: date.format(DATE_FORMAT).to_string(),
        transaction_amount,
        current_balance,
        total_amount,
        reason,
        receiver: fields.get(Field::Receiver).unwrap_or_default().to_string(),
        payer: fields.get(Field::Payer).unwrap_or_default().to_string(),
        direction: extraction.direction,
        category,
    }))
}

fn process_message(
    conn: &Connection,
    message: &RawMessage,
    pipeline: &Pipeline<'_>,
    options: &IngestOptions,
) -> Result<Outcome> {
    let date = message_time(message.date)?;
    if date.date() < options.cutoff {
        return Ok(Outcome::BeforeCutoff);
    }

    let Some(record) = build_record(date, &message.text, pipeline)? else {
        return Ok(Outcome::Unmatched);
    };

    if !options.dry_run {
        insert_transaction(conn, &record)?;
    }
    Ok(Outcome::Accepted(record))
}

/// Process messages in order. A bad message is logged and skipped; it never
/// stops the batch. `on_accepted` sees each accepted record as it is stored.
pub fn ingest_messages(
    conn: &Connection,
    messages: &[RawMessage],
    pipeline: &Pipeline<'_>,
    options: &IngestOptions,
    mut on_accepted: impl FnMut(&TransactionRecord),
) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for (index, message) in messages.iter().enumerate() {
        match process_message(conn, message, pipeline, options) {
            Ok(Outcome::Accepted(record)) => {
                info!(
                    index,
                    direction = %record.direction,
                    amount = record.transaction_amount,
                    category = %record.category,
                    "accepted transaction"
                );
                on_accepted(&record);
                summary.accepted += 1;
            }
            Ok(Outcome::BeforeCutoff) => {
                debug!(index, date = message.date, "before cutoff");
                summary.before_cutoff += 1;
            }
            Ok(Outcome::Unmatched) => {
                debug!(index, "not a transaction notification");
                summary.unmatched += 1;
            }
            Err(e) => {
                warn!(index, "Error processing message: {e}");
                summary.rejected += 1;
            }
        }
    }

    summary
}
