//! CleanFi Library
//!
//! Turns an arbitrary bank-transaction export into a canonical table with
//! the fixed columns `Date, Description, Amount, Balance, Type, Category`.
//!
//! # Pipeline
//!
//! - **Headers**: whitespace in raw column names is collapsed
//! - **Mapping**: each canonical field is matched to a raw column through a
//!   priority-ordered alias table
//! - **Validation**: Date, Description and Amount must be mapped
//! - **Normalization**: money strings become decimals, type strings become
//!   canonical labels, dates are parsed
//! - **Inference**: without a type column the type follows the amount sign
//! - **Categories**: descriptions are classified by an ordered keyword table
//!
//! # Examples
//!
//! ## Cleaning an in-memory table
//!
//! ```
//! use cleanfi::{build_clean_views, RawTable, TransactionType};
//!
//! let raw = RawTable::new(["Post Date", "Memo", "Amt"])
//!     .with_row(["01/15/2024", "Starbucks Coffee", "(4.50)"]);
//!
//! let views = build_clean_views(&raw);
//! assert!(views.missing_required.is_empty());
//!
//! let table = views.table.unwrap();
//! assert_eq!(table.records[0].category, "Food & Dining");
//! assert_eq!(table.records[0].transaction_type, Some(TransactionType::Debit));
//! ```
//!
//! ## Cleaning a CSV file
//!
//! ```no_run
//! use std::fs::File;
//! use cleanfi::{Pipeline, RawTable};
//!
//! let mut input = File::open("export.csv")?;
//! let raw = RawTable::from_read(&mut input)?;
//!
//! let clean = Pipeline::default().clean(&raw)?;
//!
//! let mut output = File::create("clean_transactions.csv")?;
//! clean.display.write_to(&mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod headers;
pub mod alias;
pub mod normalize;
pub mod categorizer;
pub mod pipeline;
pub mod csv_format;
pub mod summary;

// Re-export commonly used types
pub use config::{AliasTable, CategoryRule, CategoryRuleTable, FieldAliases, PipelineConfig};
pub use error::{Error, Result};
pub use pipeline::{build_clean_views, CleanTables, CleanViews, Pipeline};
pub use summary::Summary;
pub use types::{
    CanonicalField, CanonicalRecord, CanonicalTable, CellValue, ColumnMapping, DisplayRecord,
    DisplayTable, RawTable, TransactionType, UNCATEGORIZED,
};
