//! Canonical column mapping.

use crate::config::AliasTable;
use crate::types::{CanonicalField, ColumnMapping};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Matches raw headers against an [`AliasTable`].
#[derive(Debug, Clone)]
pub struct AliasResolver<'a> {
    aliases: &'a AliasTable,
    exclusive: bool,
}

impl<'a> AliasResolver<'a> {
    /// Create a resolver that lets fields share a raw column.
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self {
            aliases,
            exclusive: false,
        }
    }

    /// When set, a raw column claimed by one field is not offered to the
    /// fields after it.
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Pick a raw column for every canonical field.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. For
    /// each field the first alias present among the headers wins.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ColumnMapping {
        // Later headers shadow earlier ones with the same key.
        let lookup: HashMap<String, &str> = headers
            .iter()
            .map(|h| (lookup_key(h.as_ref()), h.as_ref()))
            .collect();

        let mut mapping = ColumnMapping::default();
        let mut claimed: HashSet<&str> = HashSet::new();

        for field in CanonicalField::ALL {
            let hit = self
                .aliases
                .aliases(field)
                .iter()
                .filter_map(|alias| lookup.get(&lookup_key(alias)).copied())
                .find(|raw| !(self.exclusive && claimed.contains(raw)));

            if let Some(raw) = hit {
                debug!(field = field.name(), column = raw, "mapped column");
                claimed.insert(raw);
                mapping.set(field, raw.to_string());
            }
        }

        mapping
    }
}

fn lookup_key(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldAliases;

    fn resolve(headers: &[&str]) -> ColumnMapping {
        AliasResolver::new(&AliasTable::default()).resolve(headers)
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let mapping = resolve(&[" Posting Date ", "DESCRIPTION", "Amount"]);
        assert_eq!(mapping.get(CanonicalField::Date), Some(" Posting Date "));
        assert_eq!(mapping.get(CanonicalField::Description), Some("DESCRIPTION"));
        assert_eq!(mapping.get(CanonicalField::Amount), Some("Amount"));
        assert!(!mapping.is_mapped(CanonicalField::Balance));
    }

    #[test]
    fn test_alias_order_is_preference() {
        // "details" precedes "memo" in the Description candidates.
        let mapping = resolve(&["Memo", "Details", "Date", "Amt"]);
        assert_eq!(mapping.get(CanonicalField::Description), Some("Details"));
    }

    #[test]
    fn test_running_bal_alias() {
        let mapping = resolve(&["Date", "Description", "Amount", "Running Bal."]);
        assert_eq!(mapping.get(CanonicalField::Balance), Some("Running Bal."));
    }

    #[test]
    fn test_category_header_feeds_type() {
        let mapping = resolve(&["Date", "Description", "Amount", "Category"]);
        assert_eq!(mapping.get(CanonicalField::Type), Some("Category"));
        assert!(!mapping.is_mapped(CanonicalField::Category));
    }

    #[test]
    fn test_column_reuse_and_exclusive_claim() {
        let aliases = AliasTable::new(vec![
            FieldAliases {
                field: CanonicalField::Description,
                aliases: vec!["transaction".into()],
            },
            FieldAliases {
                field: CanonicalField::Type,
                aliases: vec!["transaction".into(), "kind".into()],
            },
        ]);
        let headers = ["Transaction", "Kind"];

        let shared = AliasResolver::new(&aliases).resolve(&headers);
        assert_eq!(shared.get(CanonicalField::Description), Some("Transaction"));
        assert_eq!(shared.get(CanonicalField::Type), Some("Transaction"));

        let exclusive = AliasResolver::new(&aliases).exclusive(true).resolve(&headers);
        assert_eq!(exclusive.get(CanonicalField::Description), Some("Transaction"));
        assert_eq!(exclusive.get(CanonicalField::Type), Some("Kind"));
    }
}
