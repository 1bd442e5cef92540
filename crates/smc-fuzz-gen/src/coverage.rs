//! Field value coverage from a fuzzer run log.
//!
//! The fuzzing harness prints one line per issued call:
//!
//! ```text
//! SMC FUZZER CALL fid:c4000020 arg1:0 arg2:1f arg3:0 arg4:0 arg5:0 arg6:0 arg7:0
//! ```
//!
//! Each line is matched to a call through its numeric id, and every field of
//! that call records the distinct values its bits took.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::ir::{CallRecord, Field, MAX_REGISTERS, SmcSpec};

static SAMPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut pattern = String::from(r"^SMC FUZZER CALL fid:([a-fA-F0-9]+)");
    for register in 1..MAX_REGISTERS {
        pattern.push_str(&format!(r"\s+arg{register}:([a-fA-F0-9]+)"));
    }
    pattern.push('$');
    Regex::new(&pattern).expect("sample line pattern")
});

/// Register values of one logged call; index 0 holds the function id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub registers: [u64; MAX_REGISTERS as usize],
}

impl Sample {
    #[must_use]
    pub fn fid(&self) -> u64 {
        self.registers[0]
    }
}

/// Why a log line did not yield a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// Not a fuzzer call line at all.
    NotASample,
    /// A register value wider than 64 bits.
    Overflow(String),
}

/// Parse one log line.
pub fn parse_sample(line: &str) -> Result<Sample, SampleError> {
    let caps = SAMPLE_RE
        .captures(line.trim())
        .ok_or(SampleError::NotASample)?;
    let mut registers = [0u64; MAX_REGISTERS as usize];
    for (register, slot) in registers.iter_mut().enumerate() {
        let text = caps.get(register + 1).map_or("", |m| m.as_str());
        *slot = u64::from_str_radix(text, 16)
            .map_err(|_| SampleError::Overflow(text.to_string()))?;
    }
    Ok(Sample { registers })
}

/// Distinct values seen for one field.
#[derive(Debug, Clone)]
pub struct FieldCoverage<'a> {
    pub field: &'a Field,
    pub values: BTreeSet<u64>,
}

#[derive(Debug, Clone)]
pub struct CallCoverage<'a> {
    pub call: &'a CallRecord,
    pub fields: Vec<FieldCoverage<'a>>,
}

/// Coverage for every declared call, in declaration order.
#[derive(Debug, Clone)]
pub struct CoverageReport<'a> {
    pub calls: Vec<CallCoverage<'a>>,
    /// Log lines matched to a declared call.
    pub matched: usize,
    /// Fuzzer lines whose function id is not declared or could not be read.
    pub unmatched: usize,
}

impl<'a> CoverageReport<'a> {
    #[must_use]
    pub fn call(&self, name: &str) -> Option<&CallCoverage<'a>> {
        self.calls.iter().find(|c| c.call.name == name)
    }
}

impl<'a> CallCoverage<'a> {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldCoverage<'a>> {
        self.fields.iter().find(|f| f.field.name == name)
    }
}

/// Collect field coverage from the contents of a run log.
#[must_use]
pub fn collect<'a>(spec: &'a SmcSpec, log: &str) -> CoverageReport<'a> {
    let mut calls: Vec<CallCoverage<'a>> = spec
        .calls
        .iter()
        .map(|call| CallCoverage {
            call,
            fields: call
                .fields()
                .map(|field| FieldCoverage {
                    field,
                    values: BTreeSet::new(),
                })
                .collect(),
        })
        .collect();

    let mut by_id = HashMap::new();
    for (index, call) in spec.calls.iter().enumerate() {
        let Some(id) = call.numeric_id else {
            continue;
        };
        if let Some(previous) = by_id.insert(id, index) {
            tracing::warn!(
                "function id {id:#x} shared by {} and {}, using {}",
                spec.calls[previous].name,
                call.name,
                call.name
            );
        }
    }

    let mut matched = 0;
    let mut unmatched = 0;
    for line in log.lines() {
        let sample = match parse_sample(line) {
            Ok(sample) => sample,
            Err(SampleError::NotASample) => continue,
            Err(SampleError::Overflow(text)) => {
                tracing::warn!("skipping fuzzer line with oversized value {text}: {line}");
                unmatched += 1;
                continue;
            }
        };
        let Some(&index) = by_id.get(&sample.fid()) else {
            tracing::debug!("no SMC call declared for fid {:#x}", sample.fid());
            unmatched += 1;
            continue;
        };
        matched += 1;
        for coverage in &mut calls[index].fields {
            let register = sample.registers[usize::from(coverage.field.register)];
            coverage.values.insert(coverage.field.extract(register));
        }
    }

    CoverageReport {
        calls,
        matched,
        unmatched,
    }
}

impl fmt::Display for CoverageReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in &self.calls {
            writeln!(f, "{}", call.call.name)?;
            write_grid(f, call)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One column per field, one row per distinct value, `-` where a column has
/// run out of values.
fn write_grid(f: &mut fmt::Formatter<'_>, call: &CallCoverage<'_>) -> fmt::Result {
    let columns: Vec<Vec<String>> = call
        .fields
        .iter()
        .map(|c| c.values.iter().map(|v| format!("{v:#x}")).collect())
        .collect();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = call
        .fields
        .iter()
        .zip(&columns)
        .map(|(c, cells)| {
            cells
                .iter()
                .map(String::len)
                .chain([c.field.name.len(), 1])
                .max()
                .unwrap_or(1)
        })
        .collect();

    let rule = |f: &mut fmt::Formatter<'_>, fill: char| -> fmt::Result {
        for width in &widths {
            write!(f, "+{}", fill.to_string().repeat(width + 2))?;
        }
        writeln!(f, "+")
    };
    let row = |f: &mut fmt::Formatter<'_>, cells: &[&str]| -> fmt::Result {
        for (cell, &width) in cells.iter().zip(&widths) {
            write!(f, "| {cell:<width$} ")?;
        }
        writeln!(f, "|")
    };

    rule(f, '-')?;
    let headers: Vec<&str> = call.fields.iter().map(|c| c.field.name.as_str()).collect();
    row(f, &headers)?;
    if rows == 0 {
        return rule(f, '-');
    }
    rule(f, '=')?;
    for index in 0..rows {
        let cells: Vec<&str> = columns
            .iter()
            .map(|cells| cells.get(index).map_or("-", String::as_str))
            .collect();
        row(f, &cells)?;
        rule(f, '-')?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse_str;

    const SPEC: &str = "smc: SDEI_EVENT_ENABLE 0xc4000026\n\
                        arg1: event\n\
                        field:num:[0,3] = 0x0\n\
                        field:flags:[4,7] = 0x0\n";

    #[test]
    fn test_parse_sample() {
        let sample =
            parse_sample("SMC FUZZER CALL fid:c4000026 arg1:21 arg2:0 arg3:0 arg4:0 arg5:0 arg6:0 arg7:ff")
                .unwrap();
        assert_eq!(sample.fid(), 0xc400_0026);
        assert_eq!(sample.registers[1], 0x21);
        assert_eq!(sample.registers[7], 0xff);
        assert_eq!(parse_sample("boot complete"), Err(SampleError::NotASample));
    }

    #[test]
    fn test_collect_distinct_values() {
        let spec = parse_str(SPEC).unwrap();
        let log = "\
SMC FUZZER CALL fid:c4000026 arg1:21 arg2:0 arg3:0 arg4:0 arg5:0 arg6:0 arg7:0
unrelated output
SMC FUZZER CALL fid:c4000026 arg1:31 arg2:0 arg3:0 arg4:0 arg5:0 arg6:0 arg7:0
SMC FUZZER CALL fid:deadbeef arg1:31 arg2:0 arg3:0 arg4:0 arg5:0 arg6:0 arg7:0
";
        let report = collect(&spec, log);
        assert_eq!(report.matched, 2);
        assert_eq!(report.unmatched, 1);
        let call = report.call("SDEI_EVENT_ENABLE").unwrap();
        let num: Vec<_> = call.field("num").unwrap().values.iter().copied().collect();
        let flags: Vec<_> = call.field("flags").unwrap().values.iter().copied().collect();
        assert_eq!(num, vec![1]);
        assert_eq!(flags, vec![2, 3]);
    }

    #[test]
    fn test_grid_rendering() {
        let spec = parse_str(SPEC).unwrap();
        let log = "SMC FUZZER CALL fid:c4000026 arg1:21 arg2:0 arg3:0 arg4:0 arg5:0 arg6:0 arg7:0\n\
                   SMC FUZZER CALL fid:c4000026 arg1:31 arg2:0 arg3:0 arg4:0 arg5:0 arg6:0 arg7:0\n";
        let report = collect(&spec, log);
        let expected = "\
SDEI_EVENT_ENABLE
+-----+-------+
| num | flags |
+=====+=======+
| 0x1 | 0x2   |
+-----+-------+
| -   | 0x3   |
+-----+-------+

";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_grid_without_samples() {
        let spec = parse_str(SPEC).unwrap();
        let report = collect(&spec, "");
        let expected = "\
SDEI_EVENT_ENABLE
+-----+-------+
| num | flags |
+-----+-------+

";
        assert_eq!(report.to_string(), expected);
    }
}
