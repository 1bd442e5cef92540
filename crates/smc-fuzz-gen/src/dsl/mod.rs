//! Reader for the SMC call list format.
//!
//! ```text
//! # comment
//! define SDEI_REGISTER_ID = 0xc4000021
//! smc: SDEI_EVENT_REGISTER SDEI_REGISTER_ID
//!     arg1: event
//!         field:num:[0,31] = 0x0
//!     arg2-arg4 = 0
//! ```

mod parser;
mod token;

use std::fs;
use std::path::Path;

use crate::ir::SmcSpec;
use crate::{Error, Result};

pub use token::{CallId, Line, tokenize};

/// Parse an SMC call list held in memory.
pub fn parse_str(source: &str) -> Result<SmcSpec> {
    parser::parse(source)
}

/// Read and parse an SMC call list file.
pub fn parse_file(path: &Path) -> Result<SmcSpec> {
    let source = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&source)
}
