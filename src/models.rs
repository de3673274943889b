use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One notification as read from the message source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMessage {
    /// Milliseconds since the Unix epoch.
    #[serde(deserialize_with = "epoch_millis")]
    pub date: i64,
    #[serde(alias = "body")]
    pub text: String,
}

// Device exports write the timestamp either as a number or as a digit string.
fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Text(String),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Int(v) => Ok(v),
        Millis::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated transaction, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: String,
    pub transaction_amount: f64,
    pub current_balance: f64,
    pub total_amount: f64,
    pub reason: String,
    pub receiver: String,
    pub payer: String,
    pub direction: Direction,
    pub category: String,
}
