//! Spending summary over a cleaned table.

use crate::types::{CanonicalTable, UNCATEGORIZED};
use rust_decimal::Decimal;
use std::fmt;

/// Categories left out of the expense breakdown.
pub const NON_EXPENSE_CATEGORIES: [&str; 3] = ["Transfer", "ATM & Cash", UNCATEGORIZED];

/// Totals and the per-category expense breakdown of one table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub total: usize,
    pub categorized: usize,
    pub uncategorized: usize,
    /// Sum of positive amounts.
    pub total_income: Decimal,
    /// Absolute sum of negative amounts.
    pub total_spent: Decimal,
    /// Absolute expense per category, sorted by category name.
    pub expenses_by_category: Vec<(String, Decimal)>,
}

impl Summary {
    pub fn from_table(table: &CanonicalTable) -> Self {
        let mut summary = Summary {
            total: table.len(),
            ..Default::default()
        };

        for record in table {
            if record.is_categorized() {
                summary.categorized += 1;
            } else {
                summary.uncategorized += 1;
            }

            let Some(amount) = record.amount else {
                continue;
            };

            if amount > Decimal::ZERO {
                summary.total_income += amount;
            } else if amount < Decimal::ZERO {
                summary.total_spent += amount.abs();

                if !NON_EXPENSE_CATEGORIES.contains(&record.category.as_str()) {
                    summary.add_expense(&record.category, amount.abs());
                }
            }
        }

        summary
    }

    fn add_expense(&mut self, category: &str, amount: Decimal) {
        match self
            .expenses_by_category
            .binary_search_by(|(name, _)| name.as_str().cmp(category))
        {
            Ok(i) => self.expenses_by_category[i].1 += amount,
            Err(i) => self
                .expenses_by_category
                .insert(i, (category.to_string(), amount)),
        }
    }

    /// Share of rows with a category other than "Uncategorized".
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.categorized as f64 / self.total as f64
        }
    }

    /// Category with the largest expense; ties go to the name sorting first.
    pub fn highest_spending(&self) -> Option<(&str, Decimal)> {
        self.expenses_by_category
            .iter()
            .fold(None, |best: Option<(&str, Decimal)>, (name, amount)| match best {
                Some((_, top)) if top >= *amount => best,
                _ => Some((name.as_str(), *amount)),
            })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Transactions: {}", self.total)?;
        writeln!(f, "Categorized:        {}", self.categorized)?;
        writeln!(f, "Uncategorized:      {}", self.uncategorized)?;
        writeln!(f, "Progress:           {:.1}%", self.progress() * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Total Income:       ${}", self.total_income.round_dp(2))?;
        writeln!(f, "Total Spent:        ${}", self.total_spent.round_dp(2))?;

        match self.highest_spending() {
            Some((name, amount)) => {
                writeln!(f, "Highest Spending:   {} (${})", name, amount.round_dp(2))?
            }
            None => writeln!(f, "Highest Spending:   -")?,
        }

        if self.expenses_by_category.is_empty() {
            return writeln!(f, "\nNo expenses to display.");
        }

        writeln!(f, "\nExpenses by Category:")?;
        for (name, amount) in &self.expenses_by_category {
            writeln!(f, "  - {:<20} ${}", name, amount.round_dp(2))?;
        }
        Ok(())
    }
}
