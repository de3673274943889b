//! Message sources: a JSON export, or the text dump of an Android SMS query.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{BirrError, Result};
use crate::models::RawMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `[{"date": <ms>, "text": "..."}, ...]`
    Json,
    /// Output of `adb shell content query --uri content://sms/inbox --projection "date,body"`.
    Adb,
}

const ALL_FORMATS: &[SourceFormat] = &[SourceFormat::Json, SourceFormat::Adb];

impl SourceFormat {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Adb => "adb",
        }
    }

    fn detect(&self, content: &str) -> bool {
        match self {
            Self::Json => content.trim_start().starts_with('['),
            Self::Adb => content.trim_start().starts_with("Row:"),
        }
    }

    pub fn parse(&self, content: &str) -> Result<LoadedMessages> {
        match self {
            Self::Json => parse_json_export(content),
            Self::Adb => Ok(parse_adb_dump(content)),
        }
    }
}

/// Messages read from a source, plus the count of entries that could not be
/// read as a message and were left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedMessages {
    pub messages: Vec<RawMessage>,
    pub skipped: usize,
}

pub fn get_by_key(key: &str) -> Option<SourceFormat> {
    ALL_FORMATS.iter().find(|f| f.key() == key).copied()
}

pub fn detect_format(content: &str) -> Option<SourceFormat> {
    ALL_FORMATS.iter().find(|f| f.detect(content)).copied()
}

pub fn load_messages(path: &Path, format_key: Option<&str>) -> Result<LoadedMessages> {
    let content = std::fs::read_to_string(path)?;
    let format = match format_key {
        Some(key) => get_by_key(key).ok_or_else(|| BirrError::UnknownFormat(key.to_string()))?,
        None => detect_format(&content).ok_or_else(|| {
            BirrError::UnknownFormat(format!("cannot tell the format of {}", path.display()))
        })?,
    };
    let loaded = format.parse(&content)?;
    debug!(
        format = format.key(),
        count = loaded.messages.len(),
        skipped = loaded.skipped,
        "loaded messages"
    );
    Ok(loaded)
}

/// The file has to be a JSON array; each element is read on its own so a
/// body-less or undated entry only loses itself.
pub fn parse_json_export(content: &str) -> Result<LoadedMessages> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut loaded = LoadedMessages::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RawMessage>(entry) {
            Ok(m) => loaded.messages.push(m),
            Err(e) => {
                warn!(index, "Skipping unreadable message: {e}");
                loaded.skipped += 1;
            }
        }
    }
    Ok(loaded)
}

pub fn compute_checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bdate=(-?\d+)").expect("date regex"))
}

/// Parse `content query` output. Each record starts with a `Row:` line; bodies
/// that span several lines continue until the next `Row:`. `body` has to be the
/// last projected column so commas inside it survive.
pub fn parse_adb_dump(output: &str) -> LoadedMessages {
    let mut rows: Vec<String> = Vec::new();
    for line in output.lines() {
        if line.starts_with("Row:") {
            rows.push(line.to_string());
        } else if let Some(current) = rows.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }

    let mut loaded = LoadedMessages::default();
    for row in &rows {
        match parse_adb_row(row) {
            Some(m) => loaded.messages.push(m),
            None => {
                warn!("Skipping unreadable device row: {}", first_line(row));
                loaded.skipped += 1;
            }
        }
    }
    loaded
}

fn parse_adb_row(row: &str) -> Option<RawMessage> {
    let body_at = row.find("body=")?;
    let (columns, body) = row.split_at(body_at);
    let date = date_re()
        .captures(columns)?
        .get(1)?
        .as_str()
        .parse()
        .ok()?;
    Some(RawMessage {
        date,
        text: body["body=".len()..].to_string(),
    })
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adb_rows_keep_commas_in_body() {
        let dump = "Row: 0 date=1730456411000, body=Dear Customer, ETB 1,500.00 Credited\n\
                    Row: 1 date=1730456999000, body=second\n";
        let msgs = parse_adb_dump(dump).messages;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].date, 1_730_456_411_000);
        assert_eq!(msgs[0].text, "Dear Customer, ETB 1,500.00 Credited");
        assert_eq!(msgs[1].text, "second");
    }

    #[test]
    fn test_adb_multiline_body() {
        let dump = "Row: 0 date=1730456411000, body=line one\nline two\n\nRow: 1 date=1, body=x";
        let msgs = parse_adb_dump(dump).messages;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].text, "line one\nline two\n");
    }

    #[test]
    fn test_adb_rows_without_date_are_skipped() {
        let dump = "Row: 0 body=no date here date=5\nRow: 1 date=7, body=ok\n";
        let loaded = parse_adb_dump(dump);
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].date, 7);
    }

    #[test]
    fn test_adb_ignores_preamble() {
        let msgs = parse_adb_dump("No result found.\n").messages;
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("  [{\"date\": 1, \"text\": \"x\"}]"), Some(SourceFormat::Json));
        assert_eq!(detect_format("Row: 0 date=1, body=x"), Some(SourceFormat::Adb));
        assert_eq!(detect_format("date,body\n1,x"), None);
    }

    #[test]
    fn test_load_messages_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sms-file.json");
        std::fs::write(&path, r#"[{"date": "1730419200000", "text": "hello"}]"#).unwrap();
        let msgs = load_messages(&path, None).unwrap().messages;
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].text, "hello");
    }

    #[test]
    fn test_json_bad_entries_do_not_lose_good_ones() {
        let export = r#"[
            {"date": 1730456411000, "text": "Credited with ETB 1.00"},
            {"date": 1730456412000},
            {"date": null, "text": "undated"},
            {"date": "yesterday", "body": "bad date"},
            {"date": "1730456413000", "body": "second good"}
        ]"#;
        let loaded = parse_json_export(export).unwrap();
        assert_eq!(loaded.skipped, 3);
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[0].date, 1_730_456_411_000);
        assert_eq!(loaded.messages[1].text, "second good");
    }

    #[test]
    fn test_json_export_must_be_an_array() {
        assert!(matches!(parse_json_export(r#"{"date": 1}"#), Err(BirrError::Json(_))));
        assert!(matches!(parse_json_export("[{"), Err(BirrError::Json(_))));
    }

    #[test]
    fn test_load_messages_unknown_format_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sms.txt");
        std::fs::write(&path, "[]").unwrap();
        let err = load_messages(&path, Some("csv")).unwrap_err();
        assert!(matches!(err, BirrError::UnknownFormat(_)));
    }

    #[test]
    fn test_load_messages_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_messages(&dir.path().join("missing.json"), None),
            Err(BirrError::Io(_))
        ));
    }

    #[test]
    fn test_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "[]").unwrap();
        let a = compute_checksum(&path).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, compute_checksum(&path).unwrap());
    }
}
