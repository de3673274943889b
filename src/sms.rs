use tracing::debug;

use crate::models::Direction;
use crate::patterns::{Extraction, Field, PatternSet};
use crate::receipt::ReceiptSource;
use crate::rules::CompiledRules;

/// Fields found for one notification, together with the direction that chose
/// the pattern set.
#[derive(Debug, Clone, PartialEq)]
pub struct SmsExtraction {
    pub direction: Direction,
    pub fields: Extraction,
}

pub fn classify(text: &str, rules: &CompiledRules) -> Direction {
    if text.contains(rules.incoming_marker.as_str()) {
        Direction::Incoming
    } else {
        Direction::Outgoing
    }
}

fn patterns_for(direction: Direction, rules: &CompiledRules) -> &PatternSet {
    match direction {
        Direction::Incoming => &rules.incoming,
        Direction::Outgoing => &rules.outgoing,
    }
}

/// Extract transaction fields from a notification body, following its receipt
/// link when there is one.
///
/// Returns `None` when the body has no transaction amount for its direction.
pub fn extract_sms(
    text: &str,
    rules: &CompiledRules,
    receipts: &dyn ReceiptSource,
) -> Option<SmsExtraction> {
    let direction = classify(text, rules);
    let mut fields = patterns_for(direction, rules).extract(text);

    let amount = fields
        .get(Field::TransactionAmount)
        .filter(|a| !a.is_empty())?
        .to_string();

    // Credit alerts carry no separate total.
    if direction == Direction::Incoming {
        fields.insert(Field::TotalAmount, amount);
    }

    if let Some(link) = fields.get(Field::TransactionLink).map(str::to_string) {
        match receipts.first_page_text(&link) {
            Some(page) => fields.merge(rules.receipt.extract(&page)),
            None => debug!(%link, "continuing without receipt"),
        }
    }

    Some(SmsExtraction { direction, fields })
}
