//! Line classifier for the SMC call list.
//!
//! Each trimmed line maps to exactly one [`Line`]. Rules are tried in a
//! fixed order and the first match wins; anything left over is
//! [`Line::Malformed`]. Captures are returned as raw text so the parser can
//! report range and width problems with the original spelling.

use std::sync::LazyLock;

use regex::Regex;

const IDENT: &str = r"[A-Za-z0-9_]+";
const VALUE: &str = r"0x[0-9a-fA-F]+|\d+";

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^smc:\s*({IDENT})(?:\s+({IDENT}))?\s*$")).expect("call header pattern")
});

static FIELDED_ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^arg(\d+)\s*:\s*({IDENT})$")).expect("fielded argument pattern")
});

static RAW_ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^arg(\d+)\s*=\s*({VALUE})$")).expect("raw argument pattern")
});

static RAW_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^arg(\d+)\s*-\s*arg(\d+)\s*=\s*({VALUE})$"))
        .expect("argument range pattern")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^field\s*:\s*({IDENT})\s*:\s*\[\s*(\d+)\s*,\s*(\d+)\s*\]\s*=\s*({VALUE})$"
    ))
    .expect("field pattern")
});

static DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^define\s+({IDENT})\s*=\s*(0x[0-9a-fA-F]+)$")).expect("define pattern")
});

static HEX_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").expect("hex id pattern"));

/// Second token of an `smc:` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallId<'a> {
    /// `0xHEX`, prefix included.
    Literal(&'a str),
    /// A label resolved against `define` lines at end of file.
    Label(&'a str),
}

/// A classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    CallHeader {
        name: &'a str,
        id: Option<CallId<'a>>,
    },
    FieldedArg {
        register: &'a str,
        label: &'a str,
    },
    RawArg {
        register: &'a str,
        value: &'a str,
    },
    RawArgRange {
        first: &'a str,
        last: &'a str,
        value: &'a str,
    },
    Field {
        name: &'a str,
        start: &'a str,
        end: &'a str,
        value: &'a str,
    },
    Define {
        name: &'a str,
        value: &'a str,
    },
    Comment,
    Blank,
    Malformed,
}

/// Classify one line. Surrounding whitespace is ignored.
#[must_use]
pub fn tokenize(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = CALL_RE.captures(line) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let id = caps.get(2).map(|m| {
            let text = m.as_str();
            if HEX_ID_RE.is_match(text) {
                CallId::Literal(text)
            } else {
                CallId::Label(text)
            }
        });
        return Line::CallHeader { name, id };
    }

    if let Some(caps) = FIELDED_ARG_RE.captures(line) {
        return Line::FieldedArg {
            register: group(&caps, 1),
            label: group(&caps, 2),
        };
    }

    if let Some(caps) = RAW_ARG_RE.captures(line) {
        return Line::RawArg {
            register: group(&caps, 1),
            value: group(&caps, 2),
        };
    }

    if let Some(caps) = RAW_RANGE_RE.captures(line) {
        return Line::RawArgRange {
            first: group(&caps, 1),
            last: group(&caps, 2),
            value: group(&caps, 3),
        };
    }

    if let Some(caps) = FIELD_RE.captures(line) {
        return Line::Field {
            name: group(&caps, 1),
            start: group(&caps, 2),
            end: group(&caps, 3),
            value: group(&caps, 4),
        };
    }

    if let Some(caps) = DEFINE_RE.captures(line) {
        return Line::Define {
            name: group(&caps, 1),
            value: group(&caps, 2),
        };
    }

    if line.starts_with('#') {
        return Line::Comment;
    }

    Line::Malformed
}

fn group<'h>(caps: &regex::Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}
