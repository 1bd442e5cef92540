#![allow(
    clippy::module_name_repetitions, // `SmcSpec`, `FieldRef` etc. read better with the prefix
    clippy::missing_errors_doc // every fallible entry point returns the crate-wide `Error`
)]

pub mod coverage;
pub mod dsl;
pub mod emit;
pub mod error;
pub mod ir;

/// Helpers for inspecting generated headers in tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use dsl::{parse_file, parse_str};
pub use emit::{GenerateOptions, GeneratedFiles, Headers, generate, render_headers};
pub use error::{Error, Result};
pub use ir::{ArgumentKind, ArgumentSlot, CallRecord, Field, Literal, SmcSpec};
