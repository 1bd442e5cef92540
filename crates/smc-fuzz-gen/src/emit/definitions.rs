//! `arg_struct_def.h`: integer constants naming calls, arguments and fields.

use std::collections::HashSet;
use std::fmt::Write;

use crate::Result;
use crate::ir::SmcSpec;

const BANNER: &str = "/*
 * Copyright (c) 2024, Arm Limited. All rights reserved.
 *
 * SPDX-License-Identifier: BSD-3-Clause
 */

";

const GUARD: &str = "ARG_STRUCT_DEF_H";

/// Leading all-uppercase token of a call name, e.g. `SDEI` for
/// `SDEI_EVENT_STATUS`. Names without an `UPPER_rest` shape have none.
#[must_use]
pub fn feature_token(call: &str) -> Option<&str> {
    let (head, rest) = call.split_once('_')?;
    let valid =
        !head.is_empty() && !rest.is_empty() && head.bytes().all(|b| b.is_ascii_uppercase());
    valid.then_some(head)
}

/// Render the definition header.
pub fn render(spec: &SmcSpec) -> Result<String> {
    let mut out = String::new();
    out.push_str(BANNER);
    writeln!(out, "#ifndef {GUARD}")?;
    writeln!(out, "#define {GUARD}")?;
    writeln!(out)?;

    let mut seen = HashSet::new();
    for token in spec.calls.iter().filter_map(|c| feature_token(&c.name)) {
        if seen.insert(token) {
            writeln!(out, "#define {token}_INCLUDE 1")?;
        }
    }
    writeln!(out)?;

    for (ordinal, call) in spec.calls.iter().enumerate() {
        writeln!(out, "#define {} {ordinal}", call.name)?;
    }
    writeln!(out, "#define MAX_SMC_CALLS {}", bound(spec.calls.len()))?;
    writeln!(out)?;

    let pairs = spec.argument_pairs();
    for pair in &pairs {
        writeln!(out, "#define {} {}", pair.constant(), pair.ordinal)?;
    }
    writeln!(out, "#define MAX_ARG_LENGTH {}", bound(pairs.len()))?;
    writeln!(out)?;

    let fields = spec.flat_fields();
    for field in &fields {
        writeln!(out, "#define {} {}", field.position_constant(), field.position)?;
    }
    write!(out, "\n\n")?;

    for field in &fields {
        writeln!(out, "#define {} {}", field.ordinal_constant(), field.ordinal)?;
    }
    write!(out, "\n#endif /* {GUARD} */\n")?;

    tracing::debug!(
        "definition header: {} calls, {} arguments, {} fields",
        spec.calls.len(),
        pairs.len(),
        fields.len()
    );
    Ok(out)
}

/// Highest valid ordinal for `count` entries. The harness sizes its loops
/// with this as an inclusive bound.
fn bound(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX) - 1
}
