/// Limits applied when parsing a policy header from an untrusted peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum header length in bytes
    pub max_header_length: usize,
    /// Maximum number of distinct directives
    pub max_directives: usize,
    /// Maximum number of source tokens in one directive
    pub max_sources_per_directive: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_length: 16 * 1024, // 16KB is well above any real-world policy
            max_directives: 64,
            max_sources_per_directive: 256,
        }
    }
}

impl ParserConfig {
    /// Configuration without any limits
    pub fn unbounded() -> Self {
        Self {
            max_header_length: usize::MAX,
            max_directives: usize::MAX,
            max_sources_per_directive: usize::MAX,
        }
    }

    /// Set the maximum header length
    pub fn with_max_header_length(mut self, max: usize) -> Self {
        self.max_header_length = max;
        self
    }

    /// Set the maximum number of directives
    pub fn with_max_directives(mut self, max: usize) -> Self {
        self.max_directives = max;
        self
    }

    /// Set the maximum number of sources per directive
    pub fn with_max_sources_per_directive(mut self, max: usize) -> Self {
        self.max_sources_per_directive = max;
        self
    }
}
