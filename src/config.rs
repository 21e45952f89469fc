//! Rule tables and pipeline options.
//!
//! The defaults are the reference alias and category tables. Both tables can
//! be replaced wholesale from a JSON rules file:
//!
//! ```json
//! {
//!   "aliases": [{ "field": "Date", "aliases": ["date", "posted"] }],
//!   "categories": [{ "name": "Food", "keywords": ["cafe"] }],
//!   "exclusive_columns": false
//! }
//! ```

use crate::error::Result;
use crate::types::{CanonicalField, UNCATEGORIZED};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Complete configuration of a [`crate::Pipeline`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Header aliases per canonical field.
    pub aliases: AliasTable,
    /// Ordered keyword rules for the categorizer.
    pub categories: CategoryRuleTable,
    /// Once a raw column is claimed by one field, hide it from later fields.
    pub exclusive_columns: bool,
}

impl PipelineConfig {
    /// Load a configuration from JSON. Missing sections keep their defaults.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Alias candidates for one canonical field, most preferred first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAliases {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

/// Canonical field -> ordered alias candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: Vec<FieldAliases>,
}

impl AliasTable {
    pub fn new(entries: Vec<FieldAliases>) -> Self {
        Self { entries }
    }

    /// Candidates for `field`; empty when the table has no entry for it.
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.aliases.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let entry = |field, aliases: &[&str]| FieldAliases {
            field,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };

        Self::new(vec![
            entry(
                CanonicalField::Date,
                &["date", "posting date", "post date", "transaction date", "posted date"],
            ),
            entry(
                CanonicalField::Description,
                &["description", "details", "memo", "payee", "narration", "transaction", "name"],
            ),
            entry(
                CanonicalField::Amount,
                &["amount", "transaction amount", "amt", "debit/credit", "value"],
            ),
            entry(
                CanonicalField::Balance,
                &["balance", "running balance", "available balance", "running bal", "Running Bal."],
            ),
            entry(
                CanonicalField::Type,
                &["type", "transaction type", "credit/debit", "dr/cr", "category", "method"],
            ),
        ])
    }
}

/// One category and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered category rules. Declaration order breaks ties between categories
/// whose keywords overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRuleTable {
    rules: Vec<CategoryRule>,
}

impl CategoryRuleTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Values a user may pick when overriding a category: every configured
    /// name plus [`UNCATEGORIZED`].
    pub fn options(&self) -> Vec<String> {
        self.names()
            .map(str::to_string)
            .chain(std::iter::once(UNCATEGORIZED.to_string()))
            .collect()
    }
}

impl Default for CategoryRuleTable {
    fn default() -> Self {
        let rule = |name: &str, keywords: &[&str]| CategoryRule {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };

        Self::new(vec![
            rule(
                "Food & Dining",
                &[
                    "restaurant", "cafe", "coffee", "starbucks", "mcdonald", "burger", "pizza",
                    "subway", "dining", "food", "grocery", "supermarket", "walmart", "target",
                    "costco", "safeway", "kroger", "whole foods", "trader joe", "albertsons",
                    "food lion", "publix", "chicken", "tea", "boba", "tst", "cava", "chili's",
                    "kfc", "snowdaes", "dunkin", "domino's",
                ],
            ),
            rule(
                "Transportation",
                &[
                    "gas", "gasoline", "fuel", "shell", "exxon", "mobil", "bp", "chevron",
                    "speedway", "uber", "lyft", "taxi", "parking", "toll", "metro", "bus",
                    "train", "airline", "delta", "united", "american", "southwest", "jetblue",
                    "car rental", "hertz", "avis",
                ],
            ),
            rule(
                "Shopping",
                &[
                    "amazon", "ebay", "walmart", "target", "best buy", "home depot", "lowes",
                    "macy", "nordstrom", "gap", "old navy", "h&m", "zara", "online", "purchase",
                    "order", "uniqlo", "7-eleven", "family dollar", "lowe's", "staples",
                ],
            ),
            rule(
                "Entertainment",
                &[
                    "netflix", "spotify", "hulu", "disney", "youtube", "movie", "cinema",
                    "theater", "concert", "ticket", "entertainment", "game", "steam",
                    "playstation", "xbox",
                ],
            ),
            rule(
                "Healthcare",
                &[
                    "hospital", "doctor", "medical", "pharmacy", "cvs", "walgreens", "health",
                    "dental", "vision", "insurance", "clinic", "urgent care", "prescription",
                    "medication",
                ],
            ),
            rule(
                "Utilities/Bills",
                &[
                    "bill", "electric", "gas", "water", "internet", "phone", "cable", "utility",
                    "at&t", "verizon", "tmobile", "sprint", "comcast", "spectrum", "cox",
                    "directv", "dish", "openai",
                ],
            ),
            rule(
                "Income",
                &[
                    "payroll", "salary", "wage", "bonus", "commission", "income", "deposit",
                    "refund", "interest", "dividend", "investment", "return", "direct dep",
                    "dep",
                ],
            ),
            rule("ATM & Cash", &["atm", "cash", "withdrawal", "deposit", "bank", "branch"]),
            rule(
                "Insurance",
                &[
                    "insurance", "premium", "coverage", "policy", "auto insurance",
                    "home insurance", "life insurance", "health insurance",
                ],
            ),
            rule(
                "Education",
                &[
                    "school", "university", "college", "tuition", "education", "student",
                    "book", "textbook", "course", "class",
                ],
            ),
            rule(
                "Travel",
                &[
                    "hotel", "airbnb", "booking", "expedia", "priceline", "travel", "vacation",
                    "flight", "cruise", "resort",
                ],
            ),
            rule(
                "Subscriptions",
                &["subscription", "monthly", "annual", "recurring", "membership", "premium"],
            ),
            rule("Transfer", &["transfer", "xfer from", "xfer to"]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_category_options() {
        let options = CategoryRuleTable::default().options();
        assert_eq!(options.first().map(String::as_str), Some("Food & Dining"));
        assert_eq!(options.last().map(String::as_str), Some(UNCATEGORIZED));
    }

    #[test]
    fn test_default_has_no_category_aliases() {
        let aliases = AliasTable::default();
        assert!(aliases.aliases(CanonicalField::Category).is_empty());
        assert_eq!(aliases.aliases(CanonicalField::Amount)[2], "amt");
    }

    #[test]
    fn test_from_json_partial_override() {
        let json = r#"{
            "categories": [
                { "name": "Coffee", "keywords": ["espresso", "latte"] }
            ],
            "exclusive_columns": true
        }"#;
        let config = PipelineConfig::from_json_reader(json.as_bytes()).unwrap();

        assert!(config.exclusive_columns);
        assert_eq!(config.categories.options(), vec!["Coffee", UNCATEGORIZED]);
        assert_eq!(config.aliases, AliasTable::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_canonical_field() {
        let json = r#"{ "aliases": [{ "field": "Memo", "aliases": ["memo"] }] }"#;
        assert!(PipelineConfig::from_json_reader(json.as_bytes()).is_err());
    }
}
