use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BirrError, Result};

/// Everything past this token in a receipt reason is service-fee boilerplate.
const REASON_TERMINATOR: &str = "done";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TransactionAmount,
    CurrentBalance,
    TotalAmount,
    TransactionLink,
    Reason,
    Receiver,
    Payer,
    PaymentDatetime,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Self::TransactionAmount => "transaction_amount",
            Self::CurrentBalance => "current_balance",
            Self::TotalAmount => "total_amount",
            Self::TransactionLink => "transaction_link",
            Self::Reason => "reason",
            Self::Receiver => "receiver",
            Self::Payer => "payer",
            Self::PaymentDatetime => "payment_datetime",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Field values pulled out of one message (and possibly its receipt).
///
/// A field that was not found is absent, which is different from a field that
/// was found with an empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    values: BTreeMap<Field, String>,
}

impl Extraction {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Merge `other` into `self`; values from `other` win on shared fields.
    pub fn merge(&mut self, other: Extraction) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

/// A compiled field -> pattern table. Each pattern has exactly one capture group.
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<(Field, Regex)>,
}

impl PatternSet {
    pub fn compile(patterns: &BTreeMap<Field, String>) -> Result<Self> {
        let mut rules = Vec::with_capacity(patterns.len());
        for (field, pattern) in patterns {
            let re = Regex::new(pattern)?;
            // captures_len counts the implicit whole-match group
            if re.captures_len() != 2 {
                return Err(BirrError::InvalidRule(format!(
                    "pattern for {field} must have exactly one capture group: {pattern}"
                )));
            }
            rules.push((*field, re));
        }
        Ok(Self { rules })
    }

    pub fn has(&self, field: Field) -> bool {
        self.rules.iter().any(|(f, _)| *f == field)
    }

    /// Apply every pattern to `text`, keeping the first match of each.
    pub fn extract(&self, text: &str) -> Extraction {
        let mut out = Extraction::default();
        for (field, re) in &self.rules {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let Some(m) = caps.get(1) else {
                continue;
            };
            out.insert(*field, clean(*field, m.as_str()));
        }
        out
    }
}

fn clean(field: Field, raw: &str) -> String {
    let value = raw.trim();
    if field == Field::Reason {
        return value
            .split(REASON_TERMINATOR)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
    }
    value.to_string()
}
