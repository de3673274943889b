use rusqlite::Connection;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Monthly income vs expenses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthRow {
    pub month: String,
    pub expenses: f64,
    pub income: f64,
}

pub fn get_monthly(conn: &Connection) -> Result<Vec<MonthRow>> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%Y-%m', date) AS month, \
                COALESCE(SUM(CASE WHEN direction = 'outgoing' THEN transaction_amount ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN direction = 'incoming' THEN transaction_amount ELSE 0 END), 0) \
         FROM transactions \
         GROUP BY month \
         ORDER BY month",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MonthRow {
                month: row.get(0)?,
                expenses: row.get(1)?,
                income: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Counterparties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EntityTotal {
    pub name: String,
    pub amount: f64,
    pub count: i64,
}

fn top_entities(conn: &Connection, column: &str, direction: &str, limit: usize) -> Result<Vec<EntityTotal>> {
    let sql = format!(
        "SELECT {column}, SUM(transaction_amount) AS amount, COUNT(*) \
         FROM transactions \
         WHERE direction = ?1 AND {column} IS NOT NULL AND {column} != '' \
         GROUP BY {column} \
         ORDER BY amount DESC \
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![direction, limit as i64], |row| {
            Ok(EntityTotal {
                name: row.get(0)?,
                amount: row.get(1)?,
                count: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_top_receivers(conn: &Connection, limit: usize) -> Result<Vec<EntityTotal>> {
    top_entities(conn, "receiver", "outgoing", limit)
}

pub fn get_top_senders(conn: &Connection, limit: usize) -> Result<Vec<EntityTotal>> {
    top_entities(conn, "payer", "incoming", limit)
}

// ---------------------------------------------------------------------------
// Reasons and categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReasonRow {
    pub reason: String,
    pub category: String,
    pub amount: f64,
    pub count: i64,
}

pub fn get_top_reasons(conn: &Connection, limit: usize) -> Result<Vec<ReasonRow>> {
    let mut stmt = conn.prepare(
        "SELECT reason, category, SUM(transaction_amount), COUNT(*) AS n \
         FROM transactions \
         WHERE reason IS NOT NULL AND reason != '' \
         GROUP BY reason, category \
         ORDER BY n DESC, reason \
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(ReasonRow {
                reason: row.get(0)?,
                category: row.get(1)?,
                amount: row.get(2)?,
                count: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub total: f64,
    pub incoming: f64,
    pub outgoing: f64,
    pub count: i64,
}

pub fn get_category_analysis(conn: &Connection) -> Result<Vec<CategoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(category, ''), SUM(transaction_amount) AS total, \
                SUM(CASE WHEN direction = 'incoming' THEN transaction_amount ELSE 0 END), \
                SUM(CASE WHEN direction = 'outgoing' THEN transaction_amount ELSE 0 END), \
                COUNT(*) \
         FROM transactions \
         GROUP BY category \
         ORDER BY total DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CategoryRow {
                category: row.get(0)?,
                total: row.get(1)?,
                incoming: row.get(2)?,
                outgoing: row.get(3)?,
                count: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub count: i64,
}

pub fn get_totals(conn: &Connection) -> Result<Totals> {
    let totals = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN direction = 'incoming' THEN transaction_amount ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN direction = 'outgoing' THEN transaction_amount ELSE 0 END), 0), \
                COUNT(*) \
         FROM transactions",
        [],
        |row| {
            Ok(Totals {
                income: row.get(0)?,
                expenses: row.get(1)?,
                count: row.get(2)?,
            })
        },
    )?;
    Ok(totals)
}
