//! # rulescope-core
//!
//! Foundation types, errors, and logging for the rulescope rule resolver.
//!
//! This crate provides the shared vocabulary the other rulescope crates
//! depend on:
//!
//! - **Rule ids**: [`RuleId`] newtype so ids are never confused with paths
//! - **Records**: [`RuleRecord`], one rule document's metadata plus its body
//! - **Results**: [`RuleMatch`], [`MatchReason`], [`ResolutionResult`]
//! - **Errors**: [`RuleError`] taxonomy via `thiserror`
//! - **Logging**: `tracing` subscriber setup and log-capture test utilities

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod logging;
pub mod types;

pub use errors::{RuleError, RuleErrorKind};
pub use ids::RuleId;
pub use types::{MatchReason, ResolutionResult, RuleMatch, RuleRecord};
