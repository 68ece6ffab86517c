//! SQL helper functions for the `SQLite` store.
//!
//! LIKE wildcard escaping keeps caller input from injecting unintended
//! wildcard behavior into the fallback substring scan; the FTS query builder
//! quotes terms so FTS5 operator characters are matched literally.

/// Escapes SQL LIKE wildcards in a string to make them literal.
///
/// SQL LIKE uses `%` (match any characters) and `_` (match single character)
/// as wildcards. When searching for literal `%` or `_` characters, they must
/// be escaped with a backslash. The backslash itself also needs escaping.
/// Requires `ESCAPE '\'` in the LIKE clause.
#[must_use]
pub(crate) fn escape_like_wildcards(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '_' | '\\' => {
                result.push('\\');
                result.push(c);
            },
            _ => result.push(c),
        }
    }
    result
}

/// Builds an FTS5 MATCH expression from free-form query text.
///
/// FTS5 treats `-` (NOT), `*` (prefix), `"` (phrase), and `:` (column) as
/// operators; wrapping each whitespace-separated term in double quotes (with
/// interior quotes doubled) makes caller input match literally. Terms are
/// OR-joined so any matching term ranks the row.
#[must_use]
pub(crate) fn build_match_expression(query: &str) -> String {
    let terms: Vec<&str> = query.split_whitespace().collect();
    let estimated_len = terms.iter().map(|t| t.len() + 8).sum::<usize>();
    let mut expression = String::with_capacity(estimated_len);

    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            expression.push_str(" OR ");
        }
        expression.push('"');
        for c in term.chars() {
            if c == '"' {
                expression.push_str("\"\"");
            } else {
                expression.push(c);
            }
        }
        expression.push('"');
    }

    expression
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        // No special characters
        assert_eq!(escape_like_wildcards("normal"), "normal");

        // Percent sign (LIKE wildcard for "any characters")
        assert_eq!(escape_like_wildcards("100%"), "100\\%");
        assert_eq!(escape_like_wildcards("%prefix"), "\\%prefix");

        // Underscore (LIKE wildcard for "single character")
        assert_eq!(escape_like_wildcards("user_name"), "user\\_name");

        // Backslash (the escape character itself)
        assert_eq!(escape_like_wildcards("path\\file"), "path\\\\file");

        // Multiple special characters
        assert_eq!(escape_like_wildcards("100%_test\\"), "100\\%\\_test\\\\");

        // Empty string
        assert_eq!(escape_like_wildcards(""), "");
    }

    #[test]
    fn test_build_match_expression_single_term() {
        assert_eq!(build_match_expression("needle"), "\"needle\"");
    }

    #[test]
    fn test_build_match_expression_multiple_terms() {
        assert_eq!(
            build_match_expression("rust borrow checker"),
            "\"rust\" OR \"borrow\" OR \"checker\""
        );
    }

    #[test]
    fn test_build_match_expression_operator_characters() {
        assert_eq!(build_match_expression("foo-bar"), "\"foo-bar\"");
        assert_eq!(build_match_expression("col:value"), "\"col:value\"");
        assert_eq!(build_match_expression("pre*"), "\"pre*\"");
    }

    #[test]
    fn test_build_match_expression_embedded_quotes() {
        assert_eq!(build_match_expression("say \"hi\""), "\"say\" OR \"\"\"hi\"\"\"");
    }

    #[test]
    fn test_build_match_expression_empty() {
        assert_eq!(build_match_expression("   "), "");
    }
}
