//! Declarative extraction rules: one field -> pattern table per message source.
//!
//! The built-in tables match the CBE notification and receipt templates. A JSON
//! file with the same shape can replace any section when the bank changes its
//! wording.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BirrError, Result};
use crate::patterns::{Field, PatternSet};

const INCOMING_MARKER: &str = "Credited";

const OUTGOING_SMS: &[(Field, &str)] = &[
    (Field::TransactionAmount, r"ETB([\d,]+\.\d{2})\s+\.Service"),
    (Field::CurrentBalance, r"Current Balance is ETB\s*([\d,]+\.\d{2})"),
    (Field::TransactionLink, r"(https://[^\s]+)"),
    (Field::TotalAmount, r"total of ETB([\d,]+)"),
];

const INCOMING_SMS: &[(Field, &str)] = &[
    (Field::TransactionAmount, r"Credited with ETB\s*([\d,]+\.\d{2})"),
    (Field::CurrentBalance, r"Current Balance is ETB\s*([\d,]+\.\d{2})"),
    (Field::TransactionLink, r"(https://[^\s]+)"),
];

// Receipt text comes out of the PDF with stray spaces inside words ("T ype").
const RECEIPT: &[(Field, &str)] = &[
    (Field::Reason, r"Reason\s*/\s*T\s*ype of service\s+(.*)"),
    (Field::Receiver, r"Receiver\s+(.*)"),
    (Field::Payer, r"Payer\s+(.*)"),
    (Field::PaymentDatetime, r"Payment Date & Time\s+(.*)"),
];

fn table(rules: &[(Field, &str)]) -> BTreeMap<Field, String> {
    rules.iter().map(|(f, p)| (*f, p.to_string())).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    pub incoming_marker: String,
    pub outgoing: BTreeMap<Field, String>,
    pub incoming: BTreeMap<Field, String>,
    pub receipt: BTreeMap<Field, String>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            incoming_marker: INCOMING_MARKER.to_string(),
            outgoing: table(OUTGOING_SMS),
            incoming: table(INCOMING_SMS),
            receipt: table(RECEIPT),
        }
    }
}

impl RuleTable {
    /// Load a rule file. Sections missing from the file keep the built-in rules.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn compile(&self) -> Result<CompiledRules> {
        if self.incoming_marker.is_empty() {
            return Err(BirrError::InvalidRule("incoming_marker must not be empty".into()));
        }
        let outgoing = PatternSet::compile(&self.outgoing)?;
        let incoming = PatternSet::compile(&self.incoming)?;
        for (name, set) in [("outgoing", &outgoing), ("incoming", &incoming)] {
            if !set.has(Field::TransactionAmount) {
                return Err(BirrError::InvalidRule(format!(
                    "{name} rules need a transaction_amount pattern"
                )));
            }
        }
        for field in [Field::TransactionAmount, Field::CurrentBalance, Field::TotalAmount] {
            if self.receipt.contains_key(&field) {
                return Err(BirrError::InvalidRule(format!(
                    "receipt rules cannot override {field}"
                )));
            }
        }
        Ok(CompiledRules {
            incoming_marker: self.incoming_marker.clone(),
            outgoing,
            incoming,
            receipt: PatternSet::compile(&self.receipt)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub incoming_marker: String,
    pub outgoing: PatternSet,
    pub incoming: PatternSet,
    pub receipt: PatternSet,
}

impl CompiledRules {
    pub fn builtin() -> Result<Self> {
        RuleTable::default().compile()
    }
}
