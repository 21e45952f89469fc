//! Common types shared by the cleaning pipeline.

use chrono::{Datelike, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Category assigned when no rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single untyped cell of a raw export.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Text as it appeared in the source.
    Text(String),
    /// Numeric cell, e.g. from a spreadsheet reader.
    Number(f64),
    /// Empty cell.
    #[default]
    Empty,
}

impl CellValue {
    /// Text form of the cell, `None` for empty cells.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Number(n) => Some(Cow::Owned(n.to_string())),
            CellValue::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// An arbitrary table of bank rows, as uploaded.
///
/// Headers are kept exactly as supplied; nothing about the column set is
/// validated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Create an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows read as empty in the missing positions.
    pub fn push_row<I, C>(&mut self, cells: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Builder-style variant of [`RawTable::push_row`].
    pub fn with_row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        self.push_row(cells);
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row`, `col`; out-of-range positions are empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// The six fixed output columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Date,
    Description,
    Amount,
    Balance,
    Type,
    Category,
}

impl CanonicalField {
    /// All fields in canonical column order.
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Date,
        CanonicalField::Description,
        CanonicalField::Amount,
        CanonicalField::Balance,
        CanonicalField::Type,
        CanonicalField::Category,
    ];

    /// Fields that must be mapped before normalization can run.
    pub const REQUIRED: [CanonicalField; 3] = [
        CanonicalField::Date,
        CanonicalField::Description,
        CanonicalField::Amount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Date => "Date",
            CanonicalField::Description => "Description",
            CanonicalField::Amount => "Amount",
            CanonicalField::Balance => "Balance",
            CanonicalField::Type => "Type",
            CanonicalField::Category => "Category",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalField::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown canonical field: {}", s))
    }
}

/// Resolved canonical -> raw column assignment for one input table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: [Option<String>; 6],
}

impl ColumnMapping {
    /// Raw column chosen for `field`, if any.
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.columns[field.index()].as_deref()
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.columns[field.index()].is_some()
    }

    pub(crate) fn set(&mut self, field: CanonicalField, column: String) {
        self.columns[field.index()] = Some(column);
    }

    /// Required fields that are still unmapped, in canonical order.
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        CanonicalField::REQUIRED
            .into_iter()
            .filter(|f| !self.is_mapped(*f))
            .collect()
    }

    /// Every field with its assignment, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, Option<&str>)> + '_ {
        CanonicalField::ALL
            .into_iter()
            .map(move |f| (f, self.get(f)))
    }
}

impl fmt::Display for ColumnMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, column) in self.iter() {
            writeln!(f, "{:<12} <- {}", field.name(), column.unwrap_or("(unmapped)"))?;
        }
        Ok(())
    }
}

/// Transaction type label.
///
/// Values that match no known token are kept, title-cased, as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Debit,
    Credit,
    Deposit,
    Withdrawal,
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Debit => "Debit",
            TransactionType::Credit => "Credit",
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Other(label) => label,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TransactionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Debit" => TransactionType::Debit,
            "Credit" => TransactionType::Credit,
            "Deposit" => TransactionType::Deposit,
            "Withdrawal" => TransactionType::Withdrawal,
            _ => TransactionType::Other(s),
        }
    }
}

impl From<TransactionType> for String {
    fn from(t: TransactionType) -> Self {
        match t {
            TransactionType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// One cleaned transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Transaction date; date-only values sit at midnight.
    pub date: Option<NaiveDateTime>,
    /// Trimmed description, empty when the source had none.
    pub description: String,
    /// Signed amount; negative is money out.
    pub amount: Option<Decimal>,
    /// Running balance after the transaction.
    pub balance: Option<Decimal>,
    /// Normalized or inferred transaction type.
    pub transaction_type: Option<TransactionType>,
    /// Never empty; falls back to [`UNCATEGORIZED`].
    pub category: String,
}

impl CanonicalRecord {
    pub fn is_categorized(&self) -> bool {
        self.category != UNCATEGORIZED
    }
}

/// Cleaned table, same row order as the raw input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalTable {
    /// Records in input row order.
    pub records: Vec<CanonicalRecord>,
}

impl CanonicalTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRecord> {
        self.records.iter()
    }

    /// Presentation copy with dates rendered as `M/D/Y`.
    pub fn display(&self) -> DisplayTable {
        DisplayTable {
            records: self
                .records
                .iter()
                .map(|r| DisplayRecord {
                    date: r.date.as_ref().map(format_mdy),
                    description: r.description.clone(),
                    amount: r.amount,
                    balance: r.balance,
                    transaction_type: r.transaction_type.clone(),
                    category: r.category.clone(),
                })
                .collect(),
        }
    }

    /// Convert back into a raw table with canonical headers.
    ///
    /// Cleaning the result again yields an identical table.
    pub fn to_raw(&self) -> RawTable {
        let mut raw = RawTable::new(CanonicalField::ALL.iter().map(|f| f.name()));
        for r in &self.records {
            raw.push_row([
                CellValue::from(r.date.as_ref().map(format_iso)),
                CellValue::from(r.description.as_str()),
                CellValue::from(r.amount.map(|a| a.to_string())),
                CellValue::from(r.balance.map(|b| b.to_string())),
                CellValue::from(r.transaction_type.as_ref().map(|t| t.to_string())),
                CellValue::from(r.category.as_str()),
            ]);
        }
        raw
    }
}

impl<'a> IntoIterator for &'a CanonicalTable {
    type Item = &'a CanonicalRecord;
    type IntoIter = std::slice::Iter<'a, CanonicalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A canonical record with its date rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    /// Date as `M/D/Y`.
    pub date: Option<String>,
    /// Transaction description.
    pub description: String,
    /// Transaction amount.
    pub amount: Option<Decimal>,
    /// Running balance.
    pub balance: Option<Decimal>,
    /// Transaction type.
    pub transaction_type: Option<TransactionType>,
    /// Category name.
    pub category: String,
}

/// Display variant of [`CanonicalTable`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayTable {
    /// Records in input row order.
    pub records: Vec<DisplayRecord>,
}

impl DisplayTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Format as `M/D/Y` without zero padding or time of day.
pub fn format_mdy(date: &NaiveDateTime) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

pub(crate) fn format_iso(date: &NaiveDateTime) -> String {
    if date.time() == NaiveTime::default() {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}
