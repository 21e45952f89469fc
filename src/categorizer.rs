//! Keyword-driven spending categories.

use crate::config::CategoryRuleTable;
use crate::types::UNCATEGORIZED;

/// Decides whether a keyword occurs in a description.
///
/// Both arguments are already lower-cased.
pub trait KeywordMatcher: Send + Sync {
    fn matches(&self, description: &str, keyword: &str) -> bool;
}

impl<T: KeywordMatcher + ?Sized> KeywordMatcher for &T {
    fn matches(&self, description: &str, keyword: &str) -> bool {
        (**self).matches(description, keyword)
    }
}

/// Plain substring search. `"cash"` matches inside `"cashback"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl KeywordMatcher for SubstringMatcher {
    fn matches(&self, description: &str, keyword: &str) -> bool {
        description.contains(keyword)
    }
}

/// Keyword must start and end on a word boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundaryMatcher;

impl KeywordMatcher for WordBoundaryMatcher {
    fn matches(&self, description: &str, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        description.match_indices(keyword).any(|(start, _)| {
            let end = start + keyword.len();
            let before = description[..start].chars().next_back();
            let after = description[end..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }
}

/// First-match categorizer over an ordered rule table.
pub struct Categorizer<'a> {
    rules: &'a CategoryRuleTable,
    matcher: Box<dyn KeywordMatcher + 'a>,
}

impl<'a> Categorizer<'a> {
    /// Categorizer using substring matching.
    pub fn new(rules: &'a CategoryRuleTable) -> Self {
        Self::with_matcher(rules, SubstringMatcher)
    }

    pub fn with_matcher<M: KeywordMatcher + 'a>(rules: &'a CategoryRuleTable, matcher: M) -> Self {
        Self {
            rules,
            matcher: Box::new(matcher),
        }
    }

    /// Category for a description.
    ///
    /// Categories are tried in declaration order and keywords within a
    /// category in declaration order; the first hit wins. Blank descriptions
    /// and descriptions with no hit are [`UNCATEGORIZED`].
    pub fn categorize(&self, description: &str) -> &'a str {
        let description = description.trim();
        if description.is_empty() {
            return UNCATEGORIZED;
        }
        let lowered = description.to_lowercase();

        self.rules
            .rules()
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|k| self.matcher.matches(&lowered, &k.to_lowercase()))
            })
            .map(|rule| rule.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryRule;

    fn categorize(description: &str) -> String {
        let rules = CategoryRuleTable::default();
        let category = Categorizer::new(&rules).categorize(description).to_string();
        category
    }

    #[test]
    fn test_first_category_wins() {
        // "coffee" is a Food & Dining keyword, "deposit" an Income one.
        assert_eq!(categorize("Starbucks Coffee Deposit"), "Food & Dining");
        assert_eq!(categorize("Deposit"), "Income");
    }

    #[test]
    fn test_substring_not_token() {
        assert_eq!(categorize("CASHBACK REWARD"), "ATM & Cash");
        // "tea" inside "steakhouse" hits Food & Dining before anything else.
        assert_eq!(categorize("Steakhouse"), "Food & Dining");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize("NETFLIX.COM"), "Entertainment");
        assert_eq!(categorize("Online Transfer to Savings"), "Shopping");
        assert_eq!(categorize("Xfer to Savings"), "Transfer");
    }

    #[test]
    fn test_uncategorized() {
        assert_eq!(categorize(""), UNCATEGORIZED);
        assert_eq!(categorize("   "), UNCATEGORIZED);
        assert_eq!(categorize("ZZZ 12345"), UNCATEGORIZED);
    }

    #[test]
    fn test_reordering_changes_result() {
        let rules = CategoryRuleTable::new(vec![
            CategoryRule { name: "Income".into(), keywords: vec!["deposit".into()] },
            CategoryRule { name: "Food".into(), keywords: vec!["coffee".into()] },
        ]);
        let categorizer = Categorizer::new(&rules);
        assert_eq!(categorizer.categorize("Starbucks Coffee Deposit"), "Income");
    }

    #[test]
    fn test_word_boundary_matcher() {
        let matcher = WordBoundaryMatcher;
        assert!(matcher.matches("atm withdrawal", "atm"));
        assert!(matcher.matches("paid at&t bill", "at&t"));
        assert!(!matcher.matches("cashback reward", "cash"));
        assert!(!matcher.matches("steakhouse", "tea"));

        let rules = CategoryRuleTable::default();
        let categorizer = Categorizer::with_matcher(&rules, WordBoundaryMatcher);
        assert_eq!(categorizer.categorize("CASHBACK REWARD"), UNCATEGORIZED);
        assert_eq!(categorizer.categorize("ATM withdrawal"), "ATM & Cash");
    }
}
