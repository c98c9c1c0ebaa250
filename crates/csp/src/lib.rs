//! Citadel CSP Crate
//!
//! Parses `Content-Security-Policy` header values into an ordered, mutable
//! directive model and serializes them back. Parsing is best-effort and does
//! not validate directive names or source expressions against the CSP
//! specification.

pub mod config;
pub mod error;
pub mod lexer;
pub mod policy;
pub mod shared;
pub mod sources;

pub use config::ParserConfig;
pub use error::{CspError, CspResult};
pub use policy::{DirectiveValue, Policy};
pub use shared::SharedPolicy;
pub use sources::Sources;
