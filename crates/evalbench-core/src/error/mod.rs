//! Error types for Evalbench
//!
//! Every failure a run can hit is classified into one of the taxonomy
//! variants of [`BenchError`]:
//! - `Configuration`: unknown model, unsupported provider, missing suite,
//!   missing adapter parameter or credential. Always fatal.
//! - `Template`: a case lacks a field referenced by its prompt template.
//! - `Generation`: the model backend failed or answered with garbage.
//! - `Evaluation`: an evaluator could not produce a score record.
//!
//! `Io` and `Serialization` cover plumbing failures around those.

mod constructors;
mod conversions;
mod types;

pub use types::{BenchError, BenchResult, ResultExt};
