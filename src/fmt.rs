/// Format an amount in birr with thousands separators: ETB 1,234.56
pub fn etb(val: f64) -> String {
    let cents = (val.abs() * 100.0).round() as u64;
    let birr = (cents / 100).to_string();
    let digits = birr.as_bytes();
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    grouped.push_str(&birr[..lead]);
    for chunk in digits[lead..].chunks(3) {
        grouped.push(',');
        grouped.extend(chunk.iter().map(|&b| char::from(b)));
    }

    let sign = if val < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}ETB {grouped}.{:02}", cents % 100)
}

/// Placeholder for a counterparty the receipt did not name.
pub fn or_unknown(name: &str) -> &str {
    if name.is_empty() {
        "Unknown"
    } else {
        name
    }
}
