//! Transaction classifier and normalizer
//!
//! Turns raw statement lines into `NormalizedTransaction`s. Everything here
//! is a pure function of its inputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::wire_date::parse_wire_date;
use crate::domain::{AccountBalance, Direction, NormalizedTransaction, RawLineItem};
use crate::services::keywords::{normalize_text, KeywordMatcher};

/// Separator between the parts of a composite description
pub const DESCRIPTION_SEPARATOR: &str = " - ";

/// Lines carrying a balance instead of a movement, in lookup priority order
///
/// Compared after `normalize_text`, so case, accents and spacing do not matter.
pub const BALANCE_MARKERS: &[&str] = &[
    "Saldo Atual",
    "Saldo Disponivel",
    "S A L D O",
    "Saldo do Dia",
    "Saldo Anterior",
];

/// Fallback marker word, matched as a substring of the normalized description
const BALANCE_WORD: &str = "saldo";

/// Stateless classifier configured with a keyword matcher
#[derive(Debug, Clone, Default)]
pub struct TransactionClassifier {
    keywords: KeywordMatcher,
}

impl TransactionClassifier {
    pub fn new(keywords: KeywordMatcher) -> Self {
        Self { keywords }
    }

    /// Infer the direction of a line
    ///
    /// First matching rule wins:
    /// 1. explicit sign indicator
    /// 2. debit/credit keywords in description, entry type or complementary info
    /// 3. negative amount
    /// 4. credit
    pub fn infer_direction(&self, item: &RawLineItem) -> Direction {
        if let Some(direction) = item.sign_indicator.as_deref().and_then(sign_from_indicator) {
            return direction;
        }

        let text = [
            item.description.as_str(),
            item.entry_type.as_deref().unwrap_or(""),
            item.complementary_info.as_str(),
        ]
        .join(" ");
        if let Some(direction) = self.keywords.classify(&text) {
            return direction;
        }

        if item.amount.is_sign_negative() && !item.amount.is_zero() {
            return Direction::Debit;
        }

        Direction::Credit
    }

    /// Classify and normalize a single line
    pub fn normalize(&self, item: &RawLineItem, today: NaiveDate) -> NormalizedTransaction {
        let direction = self.infer_direction(item);

        let movement_date = item
            .movement_date
            .as_deref()
            .or(item.posting_date.as_deref())
            .map(|raw| parse_wire_date(raw, today))
            .unwrap_or(today);

        let tax_id = counterparty_tax_id(item);
        let operation_description = compose_description(&[
            item.description.as_str(),
            item.complementary_info.as_str(),
            tax_id.as_deref().unwrap_or(""),
        ]);

        NormalizedTransaction {
            direction,
            movement_date,
            counterparty_bank: item.counterparty_bank.clone(),
            operation_description,
            amount: item.amount.abs(),
            raw_metadata: item.clone(),
        }
    }

    /// Normalize a full list, preserving order
    pub fn normalize_all(&self, items: &[RawLineItem], today: NaiveDate) -> Vec<NormalizedTransaction> {
        let normalized: Vec<_> = items.iter().map(|item| self.normalize(item, today)).collect();
        debug!(count = normalized.len(), "Normalized statement lines");
        normalized
    }
}

/// Map an explicit sign indicator to a direction
///
/// Accepts `D`/`C`, `-`/`+` and the numeric codes `1` (debit) / `2` (credit).
pub fn sign_from_indicator(indicator: &str) -> Option<Direction> {
    match indicator.trim().to_ascii_uppercase().as_str() {
        "D" | "-" | "1" => Some(Direction::Debit),
        "C" | "+" | "2" => Some(Direction::Credit),
        _ => None,
    }
}

/// Format a Brazilian tax id for display
///
/// 11 digits become a CPF (`123.456.789-01`), 14 digits a CNPJ
/// (`12.345.678/0001-99`). Anything else is returned unchanged.
pub fn format_tax_id(raw: &str) -> String {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }
    match raw.len() {
        11 => format!("{}.{}.{}-{}", &raw[0..3], &raw[3..6], &raw[6..9], &raw[9..11]),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &raw[0..2],
            &raw[2..5],
            &raw[5..8],
            &raw[8..12],
            &raw[12..14]
        ),
        _ => raw.to_string(),
    }
}

/// Formatted counterparty tax id of a line, if any
///
/// Ids sent as JSON numbers lose their leading zeros; the person-type
/// indicator tells us the intended width.
fn counterparty_tax_id(item: &RawLineItem) -> Option<String> {
    let raw = item.counterparty_tax_id.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }

    let width = match item.counterparty_person_type.as_deref().map(str::trim) {
        Some("F") | Some("f") => 11,
        Some("J") | Some("j") => 14,
        _ => 0,
    };

    let digits = if raw.bytes().all(|b| b.is_ascii_digit()) && raw.len() < width {
        format!("{:0>width$}", raw, width = width)
    } else {
        raw.to_string()
    };

    Some(format_tax_id(&digits))
}

/// Join the non-empty parts with `DESCRIPTION_SEPARATOR`, keeping their order
pub fn compose_description(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(DESCRIPTION_SEPARATOR)
}

/// Whether a line is one of the known balance markers
pub fn is_balance_marker(tx: &NormalizedTransaction) -> bool {
    let description = normalize_text(tx.primary_description());
    BALANCE_MARKERS.iter().any(|m| normalize_text(m) == description)
        || description.contains(BALANCE_WORD)
}

/// Find the account balance among statement lines
///
/// Exact markers are tried in priority order (last occurrence wins within a
/// marker), then any line containing "saldo". `None` when nothing matches;
/// callers must not read that as a zero balance.
pub fn extract_balance(items: &[NormalizedTransaction]) -> Option<AccountBalance> {
    let descriptions: Vec<String> = items
        .iter()
        .map(|tx| normalize_text(tx.primary_description()))
        .collect();

    for marker in BALANCE_MARKERS {
        let marker = normalize_text(marker);
        if let Some(i) = descriptions.iter().rposition(|d| *d == marker) {
            return Some(balance_from(&items[i]));
        }
    }

    if let Some(i) = descriptions.iter().rposition(|d| d.contains(BALANCE_WORD)) {
        return Some(balance_from(&items[i]));
    }

    warn!(lines = items.len(), "No balance line found in statement");
    None
}

fn balance_from(tx: &NormalizedTransaction) -> AccountBalance {
    AccountBalance {
        amount: tx.signed_amount(),
        marker: tx.primary_description().to_string(),
        as_of: tx.movement_date,
    }
}

/// Balance amount or zero, for callers that only want a number
pub fn balance_or_zero(balance: Option<&AccountBalance>) -> Decimal {
    balance.map(|b| b.amount).unwrap_or(Decimal::ZERO)
}
