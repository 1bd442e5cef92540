//! Test harness for smc-fuzz-gen
//!
//! Reads generated headers back into plain Rust values so tests can assert
//! on table contents instead of comparing whole files.
//!
//! # Example
//!
//! ```rust
//! use smc_fuzz_gen::test_harness::*;
//!
//! let (_, headers) = generate_str("smc: T 0x10\narg0 = 0x5\n");
//! let rows = field_rows(&headers.field_spec);
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].bitw, 64);
//! assert_eq!(define(&headers.definitions, "T_ARG0"), Some(0));
//! ```

#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::manual_assert
)]

use std::sync::LazyLock;

use regex::Regex;

use crate::{Headers, SmcSpec, parse_str, render_headers};

static DEFINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#define (\w+) (-?\d+)$").expect("define pattern"));

static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"\{ \.bitw = (\d+), \.bitst = (\d+), \.bnames = "(\w+)", \.defval = (\w+), "#,
        r#"\.reserved = (\d+), \.regnum = (\d+), \.smcname = "(\w+)", \.smcargname = "(\w+)" \}"#,
    ))
    .expect("field row pattern")
});

static SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{ \.arg_span = \{(\d+),(\d+)\} \}").expect("span pattern"));

/// Parse and render, panicking on any error.
pub fn generate_str(source: &str) -> (SmcSpec, Headers) {
    let spec = parse_str(source).unwrap_or_else(|e| panic!("parse failed: {e}"));
    let headers = render_headers(&spec).unwrap_or_else(|e| panic!("render failed: {e}"));
    (spec, headers)
}

/// Every `#define NAME VALUE` with an integer value, in header order.
pub fn defines(header: &str) -> Vec<(String, i64)> {
    DEFINE_RE
        .captures_iter(header)
        .map(|c| (c[1].to_string(), c[2].parse().expect("integer define")))
        .collect()
}

/// Value of one `#define`.
pub fn define(header: &str, name: &str) -> Option<i64> {
    defines(header)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
}

/// One row of `fuzzer_arg_array`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub bitw: u32,
    pub bitst: u32,
    pub bnames: String,
    pub defval: String,
    pub reserved: u32,
    pub regnum: u32,
    pub smcname: String,
    pub smcargname: String,
}

/// Rows of `fuzzer_arg_array`, in table order.
pub fn field_rows(field_spec: &str) -> Vec<FieldRow> {
    ROW_RE
        .captures_iter(field_spec)
        .map(|c| FieldRow {
            bitw: c[1].parse().expect("bitw"),
            bitst: c[2].parse().expect("bitst"),
            bnames: c[3].to_string(),
            defval: c[4].to_string(),
            reserved: c[5].parse().expect("reserved"),
            regnum: c[6].parse().expect("regnum"),
            smcname: c[7].to_string(),
            smcargname: c[8].to_string(),
        })
        .collect()
}

/// Entries of `fuzzer_arg_array_lst`.
pub fn spans(field_spec: &str) -> Vec<(usize, usize)> {
    SPAN_RE
        .captures_iter(field_spec)
        .map(|c| (c[1].parse().expect("lo"), c[2].parse().expect("hi")))
        .collect()
}

/// Raw comma separated entries of `int NAME[] = { ... };`.
pub fn int_table<'h>(field_spec: &'h str, name: &str) -> Vec<&'h str> {
    let open = format!("int {name}[] = {{");
    let Some(start) = field_spec.find(&open) else {
        panic!("table {name} not found");
    };
    let body = &field_spec[start + open.len()..];
    let end = body.find("};").unwrap_or_else(|| panic!("table {name} not closed"));
    body[..end]
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Numeric entries of an integer table.
pub fn int_values(field_spec: &str, name: &str) -> Vec<usize> {
    int_table(field_spec, name)
        .into_iter()
        .map(|v| v.parse().unwrap_or_else(|_| panic!("{name}: non-numeric entry {v}")))
        .collect()
}
