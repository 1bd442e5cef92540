//! `field_specification.h`: flattened field descriptors and the tables that
//! map calls and arguments onto them.
//!
//! Every per-field table is written from the same [`SmcSpec::flat_fields`]
//! walk, so row `i` of `fuzzer_arg_array` and entry `i` of the three
//! `fuzzer_field*` arrays always describe the same field.

use std::fmt::Write;

use crate::Result;
use crate::ir::{FieldRef, SmcSpec};

/// Entries per line in the per-call integer tables.
const ROW_WIDTH: usize = 20;

const DECLARATIONS: &str = "struct fuzzer_arg_def {
        int regnum;
        char smcname[FUZZ_MAX_NAME_SIZE];
        char smcargname[FUZZ_MAX_NAME_SIZE];
        int bitw;
        int bitst;
        char bnames[FUZZ_MAX_NAME_SIZE];
        uint64_t defval;
        uint64_t **contval;
        int *contvallen;
        int contlen;
        int *conttype;
        int genvalues;
        int reserved;
};

struct fuzzer_arg_arange {
        int arg_span[2];
};
";

/// Render the field specification header.
pub fn render(spec: &SmcSpec) -> Result<String> {
    let fields = spec.flat_fields();
    let pairs = spec.argument_pairs();

    let mut out = String::from(DECLARATIONS);

    out.push_str("struct fuzzer_arg_def fuzzer_arg_array[] = {\n");
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push_str(",\n");
        }
        write_descriptor(&mut out, field)?;
    }
    out.push_str(" };\n\n");

    out.push_str("struct fuzzer_arg_arange fuzzer_arg_array_lst[] = {\n");
    for (index, pair) in pairs.iter().enumerate() {
        if index > 0 {
            out.push_str(",\n");
        }
        let (lo, hi) = pair.span();
        write!(out, "{{ .arg_span = {{{lo},{hi}}} }}")?;
    }
    out.push_str(" };\n\n");

    let counts: Vec<usize> = spec.calls.iter().map(|c| c.arguments.len()).collect();
    write_rows(&mut out, "fuzzer_arg_array_range", &counts)?;
    write_rows(&mut out, "fuzzer_arg_array_start", &spec.call_argument_offsets())?;

    write_column(&mut out, "fuzzer_fieldarg", fields.iter().map(FieldRef::argument_constant))?;
    out.push_str("\n\n");
    write_column(&mut out, "fuzzer_fieldcall", fields.iter().map(|f| f.call.name.clone()))?;
    out.push_str("\n\n");
    write_column(&mut out, "fuzzer_fieldfld", fields.iter().map(FieldRef::position_constant))?;
    out.push('\n');

    tracing::debug!(
        "field specification header: {} field rows, {} argument spans",
        fields.len(),
        pairs.len()
    );
    Ok(out)
}

fn write_descriptor(out: &mut String, field: &FieldRef<'_>) -> Result<()> {
    let f = field.field;
    write!(
        out,
        "{{ .bitw = {}, .bitst = {}, .bnames = \"{}\", .defval = {}, .reserved = 0, \
         .regnum = {}, .smcname = \"{}\", .smcargname = \"{}\" }}",
        f.width(),
        f.bit_start,
        f.name,
        f.default_value,
        f.register,
        field.call.name,
        field.argument.label,
    )?;
    Ok(())
}

/// `int NAME[] = {` followed by comma separated values, [`ROW_WIDTH`] per line.
fn write_rows(out: &mut String, name: &str, values: &[usize]) -> Result<()> {
    writeln!(out, "int {name}[] = {{")?;
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        write!(out, "{value}")?;
        if (index + 1) % ROW_WIDTH == 0 {
            out.push('\n');
        }
    }
    out.push_str("};\n\n");
    Ok(())
}

/// One symbolic entry per line, tab indented.
fn write_column(out: &mut String, name: &str, entries: impl Iterator<Item = String>) -> Result<()> {
    writeln!(out, "int {name}[] = {{")?;
    out.push('\t');
    for (index, entry) in entries.enumerate() {
        if index > 0 {
            out.push_str(",\n\t");
        }
        out.push_str(&entry);
    }
    out.push_str("\n};");
    Ok(())
}
