//! Header cleanup.

/// Strip surrounding whitespace from each header and collapse internal runs
/// of whitespace to a single space.
pub fn clean_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers.iter().map(|h| clean_header(h.as_ref())).collect()
}

/// Single-header form of [`clean_headers`].
pub fn clean_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_headers() {
        let cleaned = clean_headers(&["  Posting   Date ", "Amount\t", "Running\n Bal."]);
        assert_eq!(cleaned, vec!["Posting Date", "Amount", "Running Bal."]);
    }

    #[test]
    fn test_clean_headers_idempotent() {
        let once = clean_headers(&[" a  b ", "c", "", "  "]);
        let twice = clean_headers(&once);
        assert_eq!(once, twice);
        assert_eq!(once, vec!["a b", "c", "", ""]);
    }
}
