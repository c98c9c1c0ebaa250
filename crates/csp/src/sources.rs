//! Caller-supplied source lists.
//!
//! Mutating operations accept "nothing", a single token, or a sequence whose
//! slots may be missing or empty. [`Sources`] captures all of these shapes;
//! invalid slots are dropped silently by [`Sources::valid_tokens`].

/// Source tokens passed to [`Policy`](crate::Policy) mutations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources(Vec<Option<String>>);

impl Sources {
    /// No sources at all (the `null` input)
    pub fn none() -> Self {
        Self::default()
    }

    /// A single source token
    pub fn one(token: impl Into<String>) -> Self {
        Self(vec![Some(token.into())])
    }

    /// True when no slot was supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens that are present and non-empty, in order
    pub fn valid_tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .iter()
            .filter_map(|slot| slot.as_deref())
            .filter(|token| !token.is_empty())
    }

    /// Filtered tokens as an owned list
    pub(crate) fn into_valid(self) -> Vec<String> {
        self.0
            .into_iter()
            .flatten()
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl From<&str> for Sources {
    fn from(token: &str) -> Self {
        Self::one(token)
    }
}

impl From<String> for Sources {
    fn from(token: String) -> Self {
        Self::one(token)
    }
}

impl From<&String> for Sources {
    fn from(token: &String) -> Self {
        Self::one(token.as_str())
    }
}

impl From<Option<&str>> for Sources {
    fn from(token: Option<&str>) -> Self {
        Self(vec![token.map(str::to_string)])
    }
}

impl From<Option<String>> for Sources {
    fn from(token: Option<String>) -> Self {
        Self(vec![token])
    }
}

impl From<Vec<&str>> for Sources {
    fn from(tokens: Vec<&str>) -> Self {
        tokens.into_iter().collect()
    }
}

impl From<Vec<String>> for Sources {
    fn from(tokens: Vec<String>) -> Self {
        tokens.into_iter().collect()
    }
}

impl From<Vec<Option<&str>>> for Sources {
    fn from(tokens: Vec<Option<&str>>) -> Self {
        Self(tokens.into_iter().map(|t| t.map(str::to_string)).collect())
    }
}

impl From<Vec<Option<String>>> for Sources {
    fn from(tokens: Vec<Option<String>>) -> Self {
        Self(tokens)
    }
}

impl From<&[&str]> for Sources {
    fn from(tokens: &[&str]) -> Self {
        tokens.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Sources {
    fn from(tokens: [&str; N]) -> Self {
        tokens.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Sources {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| Some(s.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtering_drops_missing_and_empty() {
        let sources = Sources::from(vec![None, Some("'self'"), Some(""), None, Some("data:")]);
        assert_eq!(sources.valid_tokens().collect::<Vec<_>>(), vec!["'self'", "data:"]);
        assert_eq!(sources.into_valid(), vec!["'self'".to_string(), "data:".to_string()]);
    }

    #[test]
    fn test_scalar_forms() {
        assert_eq!(Sources::from("'self'"), Sources::one("'self'"));
        assert_eq!(Sources::from(String::from("https:")), Sources::one("https:"));
        assert_eq!(Sources::from(None::<&str>).valid_tokens().count(), 0);
        assert_eq!(Sources::from("").valid_tokens().count(), 0);
    }

    #[test]
    fn test_none_is_empty() {
        assert!(Sources::none().is_empty());
        assert!(Sources::from(Vec::<String>::new()).is_empty());
        assert!(!Sources::from(["a", "b"]).is_empty());
    }
}
