//! Content Security Policy model.
//!
//! A [`Policy`] is an ordered collection of directives. Each directive is
//! either a flag (`upgrade-insecure-requests;`) or carries an ordered list of
//! source tokens (`img-src 'self' data:;`). Directive order follows first
//! appearance and is reproduced on serialization.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::config::ParserConfig;
use crate::error::{CspError, CspResult};
use crate::lexer::{Clause, DirectiveLexer, SourceLexer};
use crate::sources::Sources;

/// Value stored for a directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Option<Vec<String>>")]
pub enum DirectiveValue {
    /// Directive present without sources
    Flag,
    /// Ordered source tokens; duplicates are kept
    Sources(Vec<String>),
}

impl DirectiveValue {
    /// Build a value from filtered tokens. An empty list collapses to a flag.
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        if tokens.is_empty() {
            Self::Flag
        } else {
            Self::Sources(tokens)
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }

    /// Source tokens, or `None` for a flag
    pub fn sources(&self) -> Option<&[String]> {
        match self {
            Self::Flag => None,
            Self::Sources(tokens) => Some(tokens),
        }
    }

    /// Append tokens, promoting a flag to a source list.
    fn extend(&mut self, tokens: Vec<String>) {
        match self {
            Self::Flag => *self = Self::Sources(tokens),
            Self::Sources(existing) => existing.extend(tokens),
        }
    }
}

impl From<Option<Vec<String>>> for DirectiveValue {
    fn from(value: Option<Vec<String>>) -> Self {
        value.map_or(Self::Flag, Self::Sources)
    }
}

impl From<DirectiveValue> for Option<Vec<String>> {
    fn from(value: DirectiveValue) -> Self {
        match value {
            DirectiveValue::Flag => None,
            DirectiveValue::Sources(tokens) => Some(tokens),
        }
    }
}

/// Insertion-ordered directive storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DirectiveMap {
    entries: Vec<(String, DirectiveValue)>,
}

impl DirectiveMap {
    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn get(&self, name: &str) -> Option<&DirectiveValue> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut DirectiveValue> {
        self.position(name).map(move |i| &mut self.entries[i].1)
    }

    fn get_or_insert_flag(&mut self, name: &str) -> &mut DirectiveValue {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), DirectiveValue::Flag));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Insert or replace; a replaced directive keeps its position.
    fn insert(&mut self, name: &str, value: DirectiveValue) {
        match self.position(name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    fn remove(&mut self, name: &str) -> Option<DirectiveValue> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Reject blank directive names before touching any state
fn check_name(operation: &'static str, directive: &str) -> CspResult<()> {
    if directive.trim().is_empty() {
        return Err(CspError::InvalidArgument { operation });
    }
    Ok(())
}

/// A parsed, mutable Content-Security-Policy header value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    directives: DirectiveMap,
}

impl Policy {
    /// Create an empty policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a header value.
    ///
    /// Parsing is best-effort: clauses whose name is not made of lowercase
    /// letters and hyphens are skipped. A directive that appears more than
    /// once keeps its first position and its last value.
    pub fn parse(input: &str) -> Self {
        let mut policy = Self::new();
        for clause in DirectiveLexer::new(input) {
            policy.insert_clause(clause);
        }
        log::debug!(
            "Parsed CSP header ({} bytes) into {} directives",
            input.len(),
            policy.len()
        );
        policy
    }

    /// Parse a header value while enforcing the limits in `config`.
    pub fn parse_with_config(input: &str, config: &ParserConfig) -> CspResult<Self> {
        if input.len() > config.max_header_length {
            log::warn!(
                "Rejecting CSP header of {} bytes (limit {})",
                input.len(),
                config.max_header_length
            );
            return Err(CspError::HeaderTooLong {
                length: input.len(),
                max: config.max_header_length,
            });
        }

        let mut policy = Self::new();
        for clause in DirectiveLexer::new(input) {
            let count = SourceLexer::new(clause.body).count();
            if count > config.max_sources_per_directive {
                log::warn!(
                    "Rejecting CSP directive '{}' with {} sources (limit {})",
                    clause.name,
                    count,
                    config.max_sources_per_directive
                );
                return Err(CspError::TooManySources {
                    directive: clause.name.to_string(),
                    count,
                    max: config.max_sources_per_directive,
                });
            }

            policy.insert_clause(clause);

            if policy.len() > config.max_directives {
                log::warn!(
                    "Rejecting CSP header with more than {} directives",
                    config.max_directives
                );
                return Err(CspError::TooManyDirectives {
                    count: policy.len(),
                    max: config.max_directives,
                });
            }
        }
        Ok(policy)
    }

    fn insert_clause(&mut self, clause: Clause<'_>) {
        let tokens = SourceLexer::new(clause.body).map(str::to_string).collect();
        self.directives
            .insert(clause.name, DirectiveValue::from_tokens(tokens));
    }

    /// Sources of `directive`; `None` when it is absent or a flag.
    pub fn get(&self, directive: &str) -> CspResult<Option<Vec<String>>> {
        check_name("get", directive)?;
        match self.directives.get(directive) {
            None | Some(DirectiveValue::Flag) => Ok(None),
            Some(DirectiveValue::Sources(tokens)) => {
                if tokens.iter().any(String::is_empty) {
                    log::error!("Directive '{}' holds an empty source token", directive);
                    return Err(CspError::InvalidState {
                        directive: directive.to_string(),
                    });
                }
                Ok(Some(tokens.clone()))
            }
        }
    }

    /// Replace `directive` with the valid tokens in `sources`.
    ///
    /// Missing and empty tokens are dropped; if nothing remains the directive
    /// becomes a flag.
    pub fn set(&mut self, directive: &str, sources: impl Into<Sources>) -> CspResult<()> {
        check_name("set", directive)?;
        let value = DirectiveValue::from_tokens(sources.into().into_valid());
        log::trace!("Setting CSP directive '{}' to {:?}", directive, value);
        self.directives.insert(directive, value);
        Ok(())
    }

    /// Set `directive` as a flag directive
    pub fn set_flag(&mut self, directive: &str) -> CspResult<()> {
        self.set(directive, Sources::none())
    }

    /// Remove `directive` entirely. Absent directives are ignored.
    pub fn remove(&mut self, directive: &str) -> CspResult<()> {
        check_name("remove", directive)?;
        if self.directives.remove(directive).is_some() {
            log::trace!("Removed CSP directive '{}'", directive);
        }
        Ok(())
    }

    /// Append the valid tokens in `sources` to `directive`.
    ///
    /// An absent directive is created as a flag first, and stays one when
    /// there is nothing to append.
    pub fn add_source(&mut self, directive: &str, sources: impl Into<Sources>) -> CspResult<()> {
        check_name("add_source", directive)?;
        let tokens = sources.into().into_valid();
        let value = self.directives.get_or_insert_flag(directive);
        if tokens.is_empty() {
            return Ok(());
        }
        log::trace!("Adding {:?} to CSP directive '{}'", tokens, directive);
        value.extend(tokens);
        Ok(())
    }

    /// Remove the first occurrence of each token in `sources` from `directive`.
    ///
    /// Repeating a token removes one more occurrence. A list emptied this way
    /// stays an empty list; it is not turned back into a flag.
    pub fn remove_source(&mut self, directive: &str, sources: impl Into<Sources>) -> CspResult<()> {
        check_name("remove_source", directive)?;
        let sources = sources.into();
        let Some(DirectiveValue::Sources(existing)) = self.directives.get_mut(directive) else {
            return Ok(());
        };
        for token in sources.valid_tokens() {
            if let Some(index) = existing.iter().position(|t| t == token) {
                existing.remove(index);
            }
        }
        Ok(())
    }

    /// Append the origin of `url` (e.g. `https://cdn.example.com`) as a source.
    ///
    /// URLs with an opaque origin, such as `data:` or `blob:` URLs, contribute
    /// their scheme instead.
    pub fn add_origin(&mut self, directive: &str, url: &Url) -> CspResult<()> {
        let origin = url.origin();
        let token = if origin.is_tuple() {
            origin.ascii_serialization()
        } else {
            format!("{}:", url.scheme())
        };
        self.add_source(directive, token)
    }

    /// Whether `directive` is present (flag or source list)
    pub fn contains(&self, directive: &str) -> bool {
        self.directives.get(directive).is_some()
    }

    /// Stored value of `directive`
    pub fn value(&self, directive: &str) -> Option<&DirectiveValue> {
        self.directives.get(directive)
    }

    /// Directives in serialization order
    pub fn directives(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> + '_ {
        self.directives.iter()
    }

    /// Directive names in serialization order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.directives.iter().map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.directives().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            if let DirectiveValue::Sources(tokens) = value {
                for token in tokens {
                    write!(f, " {}", token)?;
                }
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

impl FromStr for Policy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.directives() {
            map.serialize_entry(name, &value.sources())?;
        }
        map.end()
    }
}

struct PolicyVisitor;

impl<'de> Visitor<'de> for PolicyVisitor {
    type Value = Policy;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of directive names to null or a list of sources")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Policy, A::Error> {
        let mut policy = Policy::new();
        while let Some((name, sources)) = map.next_entry::<String, Option<Vec<String>>>()? {
            policy
                .set(&name, sources.unwrap_or_default())
                .map_err(de::Error::custom)?;
        }
        Ok(policy)
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PolicyVisitor)
    }
}
