//! CSV reader for raw exports and writer for cleaned tables.

use crate::error::Result;
use crate::types::{
    format_iso, CanonicalField, CanonicalRecord, CanonicalTable, CellValue, DisplayRecord,
    DisplayTable, RawTable,
};
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::debug;

/// Output row, one column per canonical field.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Amount")]
    amount: Option<Decimal>,
    #[serde(rename = "Balance")]
    balance: Option<Decimal>,
    #[serde(rename = "Type")]
    transaction_type: Option<&'a str>,
    #[serde(rename = "Category")]
    category: &'a str,
}

impl<'a> From<&'a CanonicalRecord> for CsvRecord<'a> {
    fn from(r: &'a CanonicalRecord) -> Self {
        CsvRecord {
            date: r.date.as_ref().map(format_iso),
            description: &r.description,
            amount: r.amount,
            balance: r.balance,
            transaction_type: r.transaction_type.as_ref().map(|t| t.as_str()),
            category: &r.category,
        }
    }
}

impl<'a> From<&'a DisplayRecord> for CsvRecord<'a> {
    fn from(r: &'a DisplayRecord) -> Self {
        CsvRecord {
            date: r.date.clone(),
            description: &r.description,
            amount: r.amount,
            balance: r.balance,
            transaction_type: r.transaction_type.as_ref().map(|t| t.as_str()),
            category: &r.category,
        }
    }
}

impl RawTable {
    /// Read a raw export from any source implementing `Read`.
    ///
    /// The first record is the header row. Rows may have fewer or more
    /// fields than the header; empty fields become [`CellValue::Empty`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use cleanfi::RawTable;
    ///
    /// let mut file = File::open("export.csv")?;
    /// let raw = RawTable::from_read(&mut file)?;
    /// println!("{} rows", raw.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                // Spreadsheet exports often start with a byte order mark.
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut table = RawTable::new(headers);
        for result in csv_reader.records() {
            let record = result?;
            table.push_row(record.iter().map(|field| {
                if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(field)
                }
            }));
        }

        debug!(columns = table.headers().len(), rows = table.len(), "read raw csv");
        Ok(table)
    }
}

impl CanonicalTable {
    /// Write the table as CSV with ISO dates.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_records(writer, self.records.iter().map(CsvRecord::from))
    }
}

impl DisplayTable {
    /// Write the table as CSV with `M/D/Y` dates.
    ///
    /// # Examples
    ///
    /// ```
    /// use cleanfi::{build_clean_views, RawTable};
    ///
    /// let raw = RawTable::new(["Date", "Description", "Amount"])
    ///     .with_row(["2024-01-05", "Netflix", "-15.49"]);
    /// let views = build_clean_views(&raw);
    ///
    /// let mut out = Vec::new();
    /// views.display.unwrap().write_to(&mut out)?;
    /// assert_eq!(
    ///     String::from_utf8(out)?,
    ///     "Date,Description,Amount,Balance,Type,Category\n1/5/2024,Netflix,-15.49,,Debit,Entertainment\n"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_records(writer, self.records.iter().map(CsvRecord::from))
    }
}

fn write_records<'a, W, I>(writer: &mut W, records: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = CsvRecord<'a>>,
{
    // The header is written by hand so that an empty table still gets one.
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(CanonicalField::ALL.iter().map(|f| f.name()))?;

    for record in records {
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
