use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{BirrError, Result};
use crate::fmt::etb;
use crate::reports::{self, EntityTotal};
use crate::settings::load_settings;

fn open() -> Result<Connection> {
    let db_path = load_settings().db_path();
    if !db_path.exists() {
        return Err(BirrError::Other(
            "Database not found. Run `birr init` to set up.".to_string(),
        ));
    }
    get_connection(&db_path)
}

pub fn monthly() -> Result<()> {
    let conn = open()?;
    let months = reports::get_monthly(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
    for m in &months {
        let net = m.income - m.expenses;
        let net_cell = if net >= 0.0 {
            etb(net).green()
        } else {
            etb(net).red()
        };
        table.add_row(vec![
            Cell::new(&m.month),
            Cell::new(etb(m.income)),
            Cell::new(etb(m.expenses)),
            Cell::new(net_cell),
        ]);
    }

    let totals = reports::get_totals(&conn)?;
    table.add_row(vec![
        Cell::new("TOTAL".bold()),
        Cell::new(etb(totals.income).bold()),
        Cell::new(etb(totals.expenses).bold()),
        Cell::new(etb(totals.income - totals.expenses).bold()),
    ]);

    println!("Monthly Income & Expenses\n{table}");
    Ok(())
}

fn entity_table(title: &str, header: &str, rows: &[EntityTotal]) {
    if rows.is_empty() {
        println!("{title}: nothing recorded yet.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header, "Amount", "Count"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(etb(row.amount)),
            Cell::new(row.count),
        ]);
    }
    println!("{title}\n{table}");
}

pub fn receivers(limit: usize) -> Result<()> {
    let conn = open()?;
    entity_table("Top Receivers", "Receiver", &reports::get_top_receivers(&conn, limit)?);
    Ok(())
}

pub fn senders(limit: usize) -> Result<()> {
    let conn = open()?;
    entity_table("Top Senders", "Payer", &reports::get_top_senders(&conn, limit)?);
    Ok(())
}

pub fn reasons(limit: usize) -> Result<()> {
    let conn = open()?;
    let rows = reports::get_top_reasons(&conn, limit)?;

    let mut table = Table::new();
    table.set_header(vec!["Reason", "Category", "Amount", "Count"]);
    for r in &rows {
        table.add_row(vec![
            Cell::new(&r.reason),
            Cell::new(&r.category),
            Cell::new(etb(r.amount)),
            Cell::new(r.count),
        ]);
    }
    println!("Top Reasons\n{table}");
    Ok(())
}

pub fn categories() -> Result<()> {
    let conn = open()?;
    let rows = reports::get_category_analysis(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Incoming", "Outgoing", "Total", "Count"]);
    for c in &rows {
        let name = if c.category.is_empty() {
            "(uncategorized)".dimmed()
        } else {
            c.category.normal()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(etb(c.incoming)),
            Cell::new(etb(c.outgoing)),
            Cell::new(etb(c.total)),
            Cell::new(c.count),
        ]);
    }
    println!("Category Analysis\n{table}");
    Ok(())
}
