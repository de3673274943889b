use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::ingest::{load_rules, receipt_source};
use crate::error::Result;
use crate::settings::load_settings;
use crate::sms::extract_sms;

pub fn run(text: &str, rules: Option<&str>, offline: bool, insecure: bool) -> Result<()> {
    let settings = load_settings();
    let rules = load_rules(rules, &settings)?;
    let receipts = receipt_source(
        offline,
        insecure || settings.insecure_receipts,
        settings.fetch_timeout_secs,
    )?;

    let Some(extraction) = extract_sms(text, &rules, receipts.as_ref()) else {
        println!("{}", "Not a transaction notification.".yellow());
        return Ok(());
    };

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    for (field, value) in extraction.fields.iter() {
        table.add_row(vec![Cell::new(field.key()), Cell::new(value)]);
    }
    println!("Direction: {}\n{table}", extraction.direction.as_str().bold());
    Ok(())
}
