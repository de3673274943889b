use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{BirrError, Result};

/// Hand-maintained reason -> category labels.
///
/// People tend to reuse the same free-text reason ("mine", "rent") and want it
/// grouped under one label. Reasons not in the table are their own category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTable {
    entries: HashMap<String, String>,
}

impl CategoryTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table: HashMap<String, String> = HashMap::new();
        let mut folded: Vec<(String, String)> = Vec::new();
        for (key, value) in entries {
            let key = key.as_ref();
            let lower = key.to_lowercase();
            if key == lower {
                table.insert(lower, value.into());
            } else {
                folded.push((lower, value.into()));
            }
        }
        // An exact lowercase key beats any case variant of it; among variants
        // the first one seen wins.
        for (lower, value) in folded {
            table.entry(lower).or_insert(value);
        }
        Self { entries: table }
    }

    /// Load a JSON object of `"reason": "category"` pairs.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BirrError::Settings(format!("cannot read category table {}: {e}", path.display()))
        })?;
        let raw: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self::new(raw))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn categorize(&self, reason: &str) -> String {
        let key = reason.to_lowercase();
        match self.entries.get(&key) {
            Some(category) => category.clone(),
            None => key,
        }
    }
}
