use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::DB_FILE;
use crate::error::{BirrError, Result};

pub const CATEGORY_FILE: &str = "category.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Defaults to `<data_dir>/category.json`.
    #[serde(default)]
    pub categories_file: Option<String>,
    #[serde(default)]
    pub rules_file: Option<String>,
    /// Messages dated before this day are ignored.
    #[serde(default = "default_cutoff_date")]
    pub cutoff_date: String,
    #[serde(default)]
    pub insecure_receipts: bool,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_cutoff_date() -> String {
    "2024-10-01".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            categories_file: None,
            rules_file: None,
            cutoff_date: default_cutoff_date(),
            insecure_receipts: false,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }

    pub fn categories_path(&self) -> PathBuf {
        match &self.categories_file {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.data_dir).join(CATEGORY_FILE),
        }
    }

    pub fn cutoff(&self) -> Result<NaiveDate> {
        parse_day(&self.cutoff_date)
    }
}

pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| BirrError::Settings(format!("invalid date {raw:?} (expected YYYY-MM-DD): {e}")))
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("birr")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("birr")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| BirrError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
