//! The cleaning pipeline.
//!
//! Headers are cleaned, mapped to canonical fields, checked for the required
//! Date/Description/Amount columns, and every row is normalized into a
//! [`CanonicalRecord`]. Output rows keep the input order.

use crate::alias::AliasResolver;
use crate::categorizer::{Categorizer, KeywordMatcher, SubstringMatcher};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::headers::clean_headers;
use crate::normalize::{
    infer_type, normalize_amount, normalize_date, normalize_description, normalize_type,
};
use crate::types::{
    CanonicalField, CanonicalRecord, CanonicalTable, CellValue, ColumnMapping, DisplayTable,
    RawTable, UNCATEGORIZED,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTables {
    /// Canonical records with parsed dates.
    pub table: CanonicalTable,
    /// Same records with dates rendered as `M/D/Y`.
    pub display: DisplayTable,
    /// Raw column chosen for each canonical field.
    pub mapping: ColumnMapping,
}

/// Four-part result for presentation layers.
///
/// When required columns are missing both tables are `None` and
/// `missing_required` lists the unmapped fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanViews {
    /// Canonical table, absent when validation failed.
    pub table: Option<CanonicalTable>,
    /// Display table, absent when validation failed.
    pub display: Option<DisplayTable>,
    /// Detected mapping, always present.
    pub mapping: ColumnMapping,
    /// Required fields without a column, in canonical order.
    pub missing_required: Vec<CanonicalField>,
}

/// Normalization pipeline bound to one immutable configuration.
pub struct Pipeline {
    config: PipelineConfig,
    matcher: Box<dyn KeywordMatcher>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Create a pipeline using substring keyword matching.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            matcher: Box::new(SubstringMatcher),
        }
    }

    /// Replace the keyword matcher used by the categorizer.
    pub fn with_matcher<M: KeywordMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Category names a user may choose from, ending with "Uncategorized".
    pub fn category_options(&self) -> Vec<String> {
        self.config.categories.options()
    }

    /// Clean the headers and map them to canonical fields.
    pub fn resolve_columns<S: AsRef<str>>(&self, headers: &[S]) -> ColumnMapping {
        self.map_headers(headers).1
    }

    /// Run the full pipeline.
    ///
    /// Fails with [`Error::MissingRequiredColumns`] when Date, Description or
    /// Amount cannot be mapped; no partial table is produced in that case.
    pub fn clean(&self, raw: &RawTable) -> Result<CleanTables> {
        let (headers, mapping) = self.map_headers(raw.headers());

        let missing = check_required(&mapping);
        if !missing.is_empty() {
            return Err(Error::MissingRequiredColumns { missing, mapping });
        }

        Ok(self.normalize(raw, &headers, mapping))
    }

    /// Like [`Pipeline::clean`], but folds the missing-column failure into
    /// the returned value.
    pub fn build_clean_views(&self, raw: &RawTable) -> CleanViews {
        let (headers, mapping) = self.map_headers(raw.headers());

        let missing_required = check_required(&mapping);
        if !missing_required.is_empty() {
            return CleanViews {
                table: None,
                display: None,
                mapping,
                missing_required,
            };
        }

        let clean = self.normalize(raw, &headers, mapping);
        CleanViews {
            table: Some(clean.table),
            display: Some(clean.display),
            mapping: clean.mapping,
            missing_required,
        }
    }

    fn map_headers<S: AsRef<str>>(&self, headers: &[S]) -> (Vec<String>, ColumnMapping) {
        let headers = clean_headers(headers);
        let mapping = AliasResolver::new(&self.config.aliases)
            .exclusive(self.config.exclusive_columns)
            .resolve(headers.as_slice());
        (headers, mapping)
    }

    fn normalize(&self, raw: &RawTable, headers: &[String], mapping: ColumnMapping) -> CleanTables {
        // Colliding headers resolve to the last one, as in the alias lookup.
        let column = |field: CanonicalField| {
            mapping
                .get(field)
                .and_then(|name| headers.iter().rposition(|h| h == name))
        };
        let date_col = column(CanonicalField::Date);
        let description_col = column(CanonicalField::Description);
        let amount_col = column(CanonicalField::Amount);
        let balance_col = column(CanonicalField::Balance);
        let type_col = column(CanonicalField::Type);
        let category_col = column(CanonicalField::Category);

        let categorizer = Categorizer::with_matcher(&self.config.categories, self.matcher.as_ref());
        let mut stats = CleanStats::default();

        let records = (0..raw.len())
            .map(|row| {
                let cell = |col: Option<usize>| col.map(|c| raw.cell(row, c));

                let date = cell(date_col).and_then(|c| stats.track_date(c));
                let description = cell(description_col)
                    .map(normalize_description)
                    .unwrap_or_default();
                let amount = cell(amount_col).and_then(|c| stats.track_amount(c));
                let balance = cell(balance_col).and_then(|c| stats.track_amount(c));

                let transaction_type = match cell(type_col) {
                    Some(c) => normalize_type(c),
                    None => infer_type(amount),
                };

                let category = match cell(category_col) {
                    Some(c) => passthrough_category(c),
                    None => categorizer.categorize(&description).to_string(),
                };

                CanonicalRecord {
                    date,
                    description,
                    amount,
                    balance,
                    transaction_type,
                    category,
                }
            })
            .collect::<Vec<_>>();

        let table = CanonicalTable { records };
        let uncategorized = table.iter().filter(|r| !r.is_categorized()).count();
        info!(
            rows = table.len(),
            uncategorized,
            bad_dates = stats.bad_dates,
            bad_amounts = stats.bad_amounts,
            "cleaned table"
        );
        debug!(mapping = %mapping, "column mapping");

        let display = table.display();
        CleanTables {
            table,
            display,
            mapping,
        }
    }
}

/// Clean `raw` with the built-in alias and category tables.
pub fn build_clean_views(raw: &RawTable) -> CleanViews {
    static DEFAULT: OnceLock<Pipeline> = OnceLock::new();
    DEFAULT.get_or_init(Pipeline::default).build_clean_views(raw)
}

fn check_required(mapping: &ColumnMapping) -> Vec<CanonicalField> {
    let missing = mapping.missing_required();
    if !missing.is_empty() {
        warn!(?missing, "required columns not found");
    }
    missing
}

fn passthrough_category(cell: &CellValue) -> String {
    let value = normalize_description(cell);
    if value.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        value
    }
}

/// Counts of non-blank cells that could not be parsed.
#[derive(Debug, Default)]
struct CleanStats {
    bad_dates: usize,
    bad_amounts: usize,
}

impl CleanStats {
    fn track_date(&mut self, cell: &CellValue) -> Option<chrono::NaiveDateTime> {
        let parsed = normalize_date(cell);
        if parsed.is_none() && !is_blank(cell) {
            self.bad_dates += 1;
        }
        parsed
    }

    fn track_amount(&mut self, cell: &CellValue) -> Option<rust_decimal::Decimal> {
        let parsed = normalize_amount(cell);
        if parsed.is_none() && !is_blank(cell) {
            self.bad_amounts += 1;
        }
        parsed
    }
}

fn is_blank(cell: &CellValue) -> bool {
    cell.as_text().map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::WordBoundaryMatcher;
    use crate::config::{AliasTable, FieldAliases};
    use crate::types::TransactionType;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> RawTable {
        RawTable::new([" Posting  Date ", "Payee", "Amt", "Running Bal."])
            .with_row(["01/15/2024", "Starbucks Coffee", "($4.50)", "$1,000.00"])
            .with_row(["01/16/2024", "ACME PAYROLL", "2,500.00", "3,495.50"])
            .with_row(["not a date", "", "n/a", ""])
    }

    #[test]
    fn test_clean_sample() {
        let clean = Pipeline::default().clean(&sample()).unwrap();

        assert_eq!(clean.mapping.get(CanonicalField::Date), Some("Posting Date"));
        assert_eq!(clean.mapping.get(CanonicalField::Description), Some("Payee"));
        assert_eq!(clean.mapping.get(CanonicalField::Amount), Some("Amt"));
        assert_eq!(clean.mapping.get(CanonicalField::Balance), Some("Running Bal."));
        assert_eq!(clean.mapping.get(CanonicalField::Type), None);

        let rows = &clean.table.records;
        assert_eq!(rows.len(), 3);

        assert_eq!(
            rows[0],
            CanonicalRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0),
                description: "Starbucks Coffee".into(),
                amount: Some(dec("-4.50")),
                balance: Some(dec("1000.00")),
                transaction_type: Some(TransactionType::Debit),
                category: "Food & Dining".into(),
            }
        );

        assert_eq!(rows[1].transaction_type, Some(TransactionType::Deposit));
        assert_eq!(rows[1].category, "Income");

        // Unparsable cells become missing; the row is kept.
        assert_eq!(rows[2].date, None);
        assert_eq!(rows[2].amount, None);
        assert_eq!(rows[2].balance, None);
        assert_eq!(rows[2].transaction_type, None);
        assert_eq!(rows[2].category, UNCATEGORIZED);
    }

    #[test]
    fn test_display_dates() {
        let clean = Pipeline::default().clean(&sample()).unwrap();
        let dates: Vec<_> = clean.display.records.iter().map(|r| r.date.clone()).collect();
        assert_eq!(
            dates,
            vec![Some("1/15/2024".to_string()), Some("1/16/2024".to_string()), None]
        );
    }

    #[test]
    fn test_missing_required_columns() {
        let raw = RawTable::new(["Memo", "Amt"]).with_row(["Coffee", "3.00"]);
        let views = build_clean_views(&raw);

        assert_eq!(views.missing_required, vec![CanonicalField::Date]);
        assert!(views.table.is_none());
        assert!(views.display.is_none());
        assert_eq!(views.mapping.get(CanonicalField::Description), Some("Memo"));
        assert_eq!(views.mapping.get(CanonicalField::Amount), Some("Amt"));

        let err = Pipeline::default().clean(&raw).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredColumns { .. }));
    }

    #[test]
    fn test_type_column_normalized() {
        let raw = RawTable::new(["Date", "Description", "Amount", "Transaction Type"])
            .with_row(["2024-02-01", "ATM", "-40", "Cash Withdrawal"])
            .with_row(["2024-02-02", "Paycheck", "100", "DR"])
            .with_row(["2024-02-03", "Check 1001", "-12", "check"])
            .with_row(["2024-02-04", "Fee", "-1", ""]);
        let clean = Pipeline::default().clean(&raw).unwrap();
        let types: Vec<_> = clean
            .table
            .iter()
            .map(|r| r.transaction_type.clone())
            .collect();

        // An explicit type column is never overridden by the amount sign.
        assert_eq!(
            types,
            vec![
                Some(TransactionType::Withdrawal),
                Some(TransactionType::Debit),
                Some(TransactionType::Other("Check".into())),
                None,
            ]
        );
    }

    #[test]
    fn test_round_trip_is_stable() {
        let raw = RawTable::new(["Date", "Description", "Amount", "Balance"])
            .with_row(["2024-03-01 09:15:00", "Uber trip", "-23.10", "976.90"])
            .with_row(["2024-03-02", "Direct Dep", "1,200", ""])
            .with_row(["", "   ", "0", "bad"]);
        let pipeline = Pipeline::default();

        let first = pipeline.clean(&raw).unwrap().table;
        let second = pipeline.clean(&first.to_raw()).unwrap().table;
        assert_eq!(first, second);
    }

    #[test]
    fn test_rows_keep_input_order() {
        let mut raw = RawTable::new(["Date", "Description", "Amount"]);
        for i in 0..50 {
            raw.push_row([
                CellValue::from("2024-01-01"),
                CellValue::from(format!("row {}", i)),
                CellValue::Number(i as f64),
            ]);
        }
        let clean = Pipeline::default().clean(&raw).unwrap();
        for (i, record) in clean.table.iter().enumerate() {
            assert_eq!(record.description, format!("row {}", i));
            assert_eq!(record.amount, Some(Decimal::from(i as i64)));
        }
    }

    #[test]
    fn test_category_column_passthrough() {
        let mut config = PipelineConfig::default();
        config.aliases = AliasTable::new(vec![
            FieldAliases { field: CanonicalField::Date, aliases: vec!["date".into()] },
            FieldAliases { field: CanonicalField::Description, aliases: vec!["memo".into()] },
            FieldAliases { field: CanonicalField::Amount, aliases: vec!["amount".into()] },
            FieldAliases { field: CanonicalField::Category, aliases: vec!["bucket".into()] },
        ]);
        let raw = RawTable::new(["Date", "Memo", "Amount", "Bucket"])
            .with_row(["2024-01-01", "Starbucks", "-5", " Treats "])
            .with_row(["2024-01-02", "Starbucks", "-5", ""]);

        let clean = Pipeline::new(config).clean(&raw).unwrap();
        let categories: Vec<_> = clean.table.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Treats", UNCATEGORIZED]);
    }

    #[test]
    fn test_colliding_headers_take_last_column() {
        let raw = RawTable::new(["Date", "Description", "Amount", " Amount "])
            .with_row(["2024-01-01", "x", "1.00", "2.00"]);
        let clean = Pipeline::default().clean(&raw).unwrap();

        assert_eq!(clean.mapping.get(CanonicalField::Amount), Some("Amount"));
        assert_eq!(clean.table.records[0].amount, Some(dec("2.00")));
    }

    #[test]
    fn test_build_clean_views_success() {
        let views = Pipeline::default().build_clean_views(&sample());

        assert!(views.missing_required.is_empty());
        assert_eq!(views.table.map(|t| t.len()), Some(3));
        assert_eq!(views.display.map(|t| t.len()), Some(3));
        assert_eq!(views.mapping.get(CanonicalField::Amount), Some("Amt"));
    }

    #[test]
    fn test_custom_matcher() {
        let raw = RawTable::new(["Date", "Description", "Amount"])
            .with_row(["2024-01-01", "CASHBACK REWARD", "1.00"]);

        let substring = Pipeline::default().clean(&raw).unwrap();
        assert_eq!(substring.table.records[0].category, "ATM & Cash");

        let word = Pipeline::default()
            .with_matcher(WordBoundaryMatcher)
            .clean(&raw)
            .unwrap();
        assert_eq!(word.table.records[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_resolve_columns_cleans_headers() {
        let mapping = Pipeline::default().resolve_columns(&["  Transaction   Date ", "Name", "Value"]);
        assert_eq!(mapping.get(CanonicalField::Date), Some("Transaction Date"));
        assert_eq!(mapping.get(CanonicalField::Description), Some("Name"));
        assert_eq!(mapping.get(CanonicalField::Amount), Some("Value"));
        assert!(mapping.missing_required().is_empty());
    }

    #[test]
    fn test_category_options() {
        let options = Pipeline::default().category_options();
        assert_eq!(options.len(), 14);
        assert_eq!(options[13], UNCATEGORIZED);
    }
}
