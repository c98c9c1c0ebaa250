#![no_main]
//! Content Security Policy (CSP) Focused Fuzzing
//!
//! This fuzzer targets the policy model:
//! - header parsing on arbitrary input
//! - serialization idempotence
//! - directive and source mutations with malformed names and tokens
//! - bounded parsing limits

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

use citadel_csp::{ParserConfig, Policy};

/// CSP-focused fuzzing input
#[derive(Debug, Clone, Arbitrary)]
pub struct CspFuzzInput {
    /// Raw CSP header string
    pub csp_header: String,
    /// Mutations applied after parsing
    pub operations: Vec<CspOperation>,
}

/// One mutation of a parsed policy
#[derive(Debug, Clone, Arbitrary)]
pub enum CspOperation {
    Set {
        directive: String,
        sources: Vec<Option<String>>,
    },
    Remove {
        directive: String,
    },
    AddSource {
        directive: String,
        sources: Vec<Option<String>>,
    },
    RemoveSource {
        directive: String,
        sources: Vec<Option<String>>,
    },
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);

    // Choose fuzzing strategy
    let strategy = unstructured.int_in_range(0..=2).unwrap_or(0);

    match strategy {
        0 => fuzz_basic_csp_parsing(&mut unstructured),
        1 => fuzz_csp_mutations(&mut unstructured),
        _ => fuzz_bounded_parsing(&mut unstructured),
    }
});

/// Serialization of any parsed policy must be a fixed point
fn fuzz_basic_csp_parsing(unstructured: &mut Unstructured) {
    if let Ok(header) = String::arbitrary(unstructured) {
        let once = Policy::parse(&header).to_string();
        let twice = Policy::parse(&once).to_string();
        assert_eq!(once, twice, "CSP serialization should be idempotent");
        assert!(!once.starts_with(' '));
        assert!(once.is_empty() || once.ends_with(';'));
    }
}

/// Mutations either fail up front or keep the model serializable
fn fuzz_csp_mutations(unstructured: &mut Unstructured) {
    if let Ok(input) = CspFuzzInput::arbitrary(unstructured) {
        let mut policy = Policy::parse(&input.csp_header);

        for operation in input.operations {
            let before = policy.clone();
            let (directive, result) = match operation {
                CspOperation::Set { directive, sources } => {
                    let result = policy.set(&directive, sources);
                    (directive, result)
                }
                CspOperation::Remove { directive } => {
                    let result = policy.remove(&directive);
                    (directive, result)
                }
                CspOperation::AddSource { directive, sources } => {
                    let result = policy.add_source(&directive, sources);
                    (directive, result)
                }
                CspOperation::RemoveSource { directive, sources } => {
                    let result = policy.remove_source(&directive, sources);
                    (directive, result)
                }
            };

            if result.is_err() {
                assert!(directive.trim().is_empty());
                assert_eq!(policy, before, "failed mutations must not change the policy");
            } else {
                assert!(policy.get(&directive).is_ok());
            }
        }

        let _ = policy.to_string();
    }
}

/// Bounded parsing agrees with plain parsing whenever it succeeds
fn fuzz_bounded_parsing(unstructured: &mut Unstructured) {
    if let Ok(header) = String::arbitrary(unstructured) {
        let config = ParserConfig::default()
            .with_max_directives(8)
            .with_max_sources_per_directive(8);
        if let Ok(policy) = Policy::parse_with_config(&header, &config) {
            assert_eq!(policy, Policy::parse(&header));
        }
    }
}
