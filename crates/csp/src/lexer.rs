//! Two-pass lexer for policy header values.
//!
//! The first pass ([`DirectiveLexer`]) splits the header into `name body`
//! clauses on `;`. The second pass ([`SourceLexer`]) splits a clause body into
//! source tokens. Both passes are best-effort: anything they cannot recognise
//! is skipped rather than reported, so a malformed header still yields every
//! well-formed directive it contains.

/// One `name body;` clause of a policy header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause<'a> {
    /// Directive name, e.g. `script-src`
    pub name: &'a str,
    /// Everything after the name, with surrounding whitespace removed
    pub body: &'a str,
}

/// Returns true for characters allowed in a directive name
fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '-'
}

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Check whether `name` is something the directive lexer would recognise.
pub fn is_directive_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Splits a header value into directive clauses.
pub struct DirectiveLexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> DirectiveLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Recognise a single raw clause (the text between two `;`).
    fn recognize(raw: &'a str) -> Option<Clause<'a>> {
        let raw = raw.trim_start_matches(is_separator);
        if raw.is_empty() {
            return None;
        }

        let name_len = raw.find(|c: char| !is_name_char(c)).unwrap_or(raw.len());
        let (name, rest) = raw.split_at(name_len);

        // The name must be followed by whitespace or the end of the clause,
        // otherwise it is only the prefix of something we do not understand.
        let terminated = rest.chars().next().map_or(true, is_separator);
        if !is_directive_name(name) || !terminated {
            log::trace!("Skipping unrecognized directive clause: {:?}", raw);
            return None;
        }

        Some(Clause {
            name,
            body: rest.trim_matches(is_separator),
        })
    }
}

impl<'a> Iterator for DirectiveLexer<'a> {
    type Item = Clause<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.input.len() {
            let rest = &self.input[self.position..];
            let (raw, consumed) = match rest.find(';') {
                Some(end) => (&rest[..end], end + 1),
                None => (rest, rest.len()),
            };
            self.position += consumed;

            if let Some(clause) = Self::recognize(raw) {
                return Some(clause);
            }
        }
        None
    }
}

/// Splits a clause body into source tokens.
///
/// A token is either a quoted run (`'self'`, `'sha256-…'`) ending at the next
/// quote, or a maximal run of non-whitespace characters. Quotes are kept as
/// part of the token text.
pub struct SourceLexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> SourceLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Length of a quoted run at the start of `s`, quotes included
    fn quoted_len(s: &str) -> Option<usize> {
        let inner = s.strip_prefix('\'')?;
        match inner.find('\'') {
            Some(0) | None => None,
            Some(close) => Some(close + 2),
        }
    }
}

impl<'a> Iterator for SourceLexer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.position..];
        let trimmed = rest.trim_start_matches(is_separator);
        self.position += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            return None;
        }

        let len = Self::quoted_len(trimmed)
            .unwrap_or_else(|| trimmed.find(is_separator).unwrap_or(trimmed.len()));
        self.position += len;
        Some(&trimmed[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clauses(input: &str) -> Vec<(&str, &str)> {
        DirectiveLexer::new(input).map(|c| (c.name, c.body)).collect()
    }

    fn tokens(input: &str) -> Vec<&str> {
        SourceLexer::new(input).collect()
    }

    #[test]
    fn test_directive_clauses() {
        assert_eq!(
            clauses("default-src 'self'; upgrade-insecure-requests;"),
            vec![("default-src", "'self'"), ("upgrade-insecure-requests", "")]
        );
    }

    #[test]
    fn test_last_clause_without_terminator() {
        assert_eq!(
            clauses("img-src data:; object-src 'none'"),
            vec![("img-src", "data:"), ("object-src", "'none'")]
        );
    }

    #[test]
    fn test_unrecognized_names_are_skipped() {
        assert_eq!(
            clauses("Default-src 'self'; img2-src x; font-src https:;"),
            vec![("font-src", "https:")]
        );
        assert!(clauses("'self' data:; ;; ").is_empty());
    }

    #[test]
    fn test_clause_whitespace() {
        assert_eq!(
            clauses("  script-src   'self'  ;\tstyle-src\thttps:;"),
            vec![("script-src", "'self'"), ("style-src", "https:")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(clauses("").is_empty());
        assert!(tokens("").is_empty());
        assert!(tokens("   ").is_empty());
    }

    #[test]
    fn test_source_tokens() {
        assert_eq!(
            tokens("'self' https: data: www.example.com"),
            vec!["'self'", "https:", "data:", "www.example.com"]
        );
    }

    #[test]
    fn test_quoted_tokens() {
        assert_eq!(
            tokens("'sha256-2yQBTLGLI1sDcBILfj/o6b5ufMv6CEwPYOk3RZI/WjE=' 'none'"),
            vec!["'sha256-2yQBTLGLI1sDcBILfj/o6b5ufMv6CEwPYOk3RZI/WjE='", "'none'"]
        );
        // a quoted run may contain spaces and ends at the next quote
        assert_eq!(tokens("'a b'c d"), vec!["'a b'", "c", "d"]);
        // empty or unterminated quotes fall back to bare tokens
        assert_eq!(tokens("'' 'open"), vec!["''", "'open"]);
    }

    #[test]
    fn test_is_directive_name() {
        assert!(is_directive_name("script-src-attr"));
        assert!(!is_directive_name(""));
        assert!(!is_directive_name("Script-src"));
        assert!(!is_directive_name("src2"));
    }
}
