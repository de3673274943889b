use crate::categorizer::CategoryTable;
use crate::db::{get_connection, last_ingest_run};
use crate::error::Result;
use crate::fmt::etb;
use crate::reports::get_totals;
use crate::settings::{load_settings, settings_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();
    let categories_path = settings.categories_path();

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    match CategoryTable::load(&categories_path) {
        Ok(table) => println!("Categories: {} ({} entries)", categories_path.display(), table.len()),
        Err(_) => println!("Categories: {} (missing)", categories_path.display()),
    }
    println!(
        "Rules:      {}",
        settings.rules_file.as_deref().unwrap_or("(built-in)")
    );
    println!("Cutoff:     {}", settings.cutoff_date);

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `birr init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let totals = get_totals(&conn)?;
    println!();
    println!("Transactions:  {}", totals.count);
    println!("Income:        {}", etb(totals.income));
    println!("Expenses:      {}", etb(totals.expenses));

    if let Some(run) = last_ingest_run(&conn)? {
        println!(
            "Last ingest:   {} at {} ({} stored, {} rejected)",
            run.source, run.run_at, run.inserted, run.rejected
        );
    }
    Ok(())
}
