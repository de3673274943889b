use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::TransactionRecord;

pub const DB_FILE: &str = "transactions.db";

// No uniqueness constraint: ingesting the same messages twice stores them twice.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT,
    transaction_amount REAL,
    current_balance REAL,
    total_amount REAL,
    reason TEXT,
    receiver TEXT,
    payer TEXT,
    direction TEXT,
    category TEXT
);

CREATE TABLE IF NOT EXISTS ingest_runs (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    checksum TEXT NOT NULL,
    run_at TEXT DEFAULT (datetime('now')),
    inserted INTEGER NOT NULL,
    rejected INTEGER NOT NULL
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn insert_transaction(conn: &Connection, record: &TransactionRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions \
         (date, transaction_amount, current_balance, total_amount, reason, receiver, payer, direction, category) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.date,
            record.transaction_amount,
            record.current_balance,
            record.total_amount,
            record.reason,
            record.receiver,
            record.payer,
            record.direction.as_str(),
            record.category,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestRun {
    pub source: String,
    pub checksum: String,
    pub run_at: String,
    pub inserted: i64,
    pub rejected: i64,
}

pub fn record_ingest_run(
    conn: &Connection,
    source: &str,
    checksum: &str,
    inserted: usize,
    rejected: usize,
) -> Result<()> {
    conn.execute(
        "INSERT INTO ingest_runs (source, checksum, inserted, rejected) VALUES (?1, ?2, ?3, ?4)",
        params![source, checksum, inserted as i64, rejected as i64],
    )?;
    Ok(())
}

pub fn checksum_seen(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM ingest_runs WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

pub fn last_ingest_run(conn: &Connection) -> Result<Option<IngestRun>> {
    let run = conn
        .query_row(
            "SELECT source, checksum, run_at, inserted, rejected FROM ingest_runs \
             ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok(IngestRun {
                    source: row.get(0)?,
                    checksum: row.get(1)?,
                    run_at: row.get(2)?,
                    inserted: row.get(3)?,
                    rejected: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(run)
}
