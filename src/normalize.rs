//! Per-field value normalization and type inference.
//!
//! Nothing here fails: a value that cannot be understood becomes `None` and
//! the row it belongs to is kept.

use crate::types::{CellValue, TransactionType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

/// Normalize a monetary cell.
///
/// Handles currency symbols, thousands separators, stray quotes, accounting
/// negatives like `(123.45)` and trailing `CR`/`DR` style suffixes.
///
/// ```
/// use cleanfi::normalize::normalize_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(normalize_amount(&"$1,234.56".into()), Some(Decimal::new(123456, 2)));
/// assert_eq!(normalize_amount(&"(1,234.56)".into()), Some(Decimal::new(-123456, 2)));
/// assert_eq!(normalize_amount(&"n/a".into()), None);
/// ```
pub fn normalize_amount(cell: &CellValue) -> Option<Decimal> {
    let raw = cell.as_text()?;
    let cleaned = raw.replace(['$', ',', '"'], "");
    let cleaned = cleaned.trim();

    let signed = match cleaned.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => format!("-{}", inner),
        None => cleaned.to_string(),
    };

    let number = signed
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .trim();

    let parsed = parse_decimal(number);
    if parsed.is_none() {
        debug!(value = %raw, "unparsable amount");
    }
    parsed
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    // `Decimal::from_str` silently skips underscores.
    if s.is_empty() || s.contains('_') {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Normalize a transaction type cell to one of the canonical labels.
///
/// Known tokens are matched exactly first, then a whole-word sweep for
/// `debit`, `credit`, `deposit` and `withdraw(al)` runs in that order.
/// Anything else is kept, title-cased, as [`TransactionType::Other`].
/// Blank cells yield `None`.
pub fn normalize_type(cell: &CellValue) -> Option<TransactionType> {
    let raw = cell.as_text()?;
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    if let Some(known) = exact_type(&value) {
        return Some(known);
    }

    let swept = type_patterns()
        .iter()
        .find(|(re, _)| re.is_match(&value))
        .map(|(_, t)| t.clone());

    Some(swept.unwrap_or_else(|| TransactionType::Other(title_case(&value))))
}

fn exact_type(value: &str) -> Option<TransactionType> {
    let t = match value {
        "debit" | "debit card" | "purchase" | "dr" => TransactionType::Debit,
        "credit" | "cr" | "refund" => TransactionType::Credit,
        "deposit" | "dep" | "atm deposit" => TransactionType::Deposit,
        "withdrawal" | "withd" | "atm withdrawal" | "cash withdrawal" | "atm" => {
            TransactionType::Withdrawal
        }
        _ => return None,
    };
    Some(t)
}

fn type_patterns() -> &'static [(Regex, TransactionType)] {
    static PATTERNS: OnceLock<Vec<(Regex, TransactionType)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"\bdebit\b", TransactionType::Debit),
            (r"\bcredit\b", TransactionType::Credit),
            (r"\bdeposit\b", TransactionType::Deposit),
            (r"\bwithdraw(al)?\b", TransactionType::Withdrawal),
        ]
        .into_iter()
        .map(|(pattern, t)| (Regex::new(pattern).expect("invalid type regex"), t))
        .collect()
    })
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Derive a type from the sign of the amount.
///
/// Positive amounts are deposits and negative ones debits; zero and missing
/// amounts stay untyped.
pub fn infer_type(amount: Option<Decimal>) -> Option<TransactionType> {
    let amount = amount?;
    if amount > Decimal::ZERO {
        Some(TransactionType::Deposit)
    } else if amount < Decimal::ZERO {
        Some(TransactionType::Debit)
    } else {
        None
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",  // 2024-02-20
    "%m/%d/%y",  // 02/20/24
    "%m/%d/%Y",  // 02/20/2024
    "%m-%d-%Y",  // 02-20-2024
    "%Y/%m/%d",  // 2024/02/20
    "%d.%m.%Y",  // 20.02.2024
    "%b %d, %Y", // Feb 20, 2024
    "%B %d, %Y", // February 20, 2024
    "%d %b %Y",  // 20 Feb 2024
];

/// Parse a date cell. Month-first forms win over day-first ones.
///
/// Date-only values are placed at midnight.
pub fn normalize_date(cell: &CellValue) -> Option<NaiveDateTime> {
    let CellValue::Text(raw) = cell else {
        return None;
    };
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        });

    if parsed.is_none() {
        debug!(value, "unparsable date");
    }
    parsed
}

/// Description text, trimmed; empty for missing cells.
pub fn normalize_description(cell: &CellValue) -> String {
    cell.as_text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
