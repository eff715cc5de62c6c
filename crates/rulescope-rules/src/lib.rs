//! # rulescope-rules
//!
//! Rule loading and applicability resolution.
//!
//! Given a set of rule documents (a small metadata header plus a free-text
//! body), this crate decides which rules apply to a candidate file path and
//! in what order.
//!
//! ## Pipeline
//!
//! 1. [`discover_rule_sources`] walks the rules directories under a project
//!    root and reads candidate documents into [`RuleSource`]s.
//! 2. [`load_records`] / [`load_discovered`] parse each source's header
//!    ([`parse_rule`]), reject duplicate ids, and compile glob patterns into
//!    an immutable [`RuleRecordSet`].
//! 3. [`resolve`] produces the ordered [`rulescope_core::ResolutionResult`]
//!    for one path: always-apply rules first, then glob matches by pattern
//!    specificity.
//!
//! [`RuleCatalog`] holds the current set for hosts that reload rules while
//! resolutions are in flight.

#![deny(unsafe_code)]

pub mod catalog;
pub mod discovery;
pub mod glob;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod set;
pub mod source;

pub use catalog::RuleCatalog;
pub use discovery::{DiscoveryConfig, DiscoveryResult, discover_rule_sources};
pub use glob::{GlobOptions, GlobPattern};
pub use loader::{LoadFailure, LoadOptions, LoadReport, load_discovered, load_records};
pub use parser::{ParsedRule, parse_rule};
pub use resolver::{normalize_path, resolve};
pub use set::RuleRecordSet;
pub use source::{RuleSource, id_from_relative_path};
