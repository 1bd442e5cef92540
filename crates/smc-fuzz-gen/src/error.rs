use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("line {line}: malformed line `{text}`")]
    Malformed { line: usize, text: String },

    #[error("line {line}: out of sequence for {what}")]
    OutOfSequence { line: usize, what: String },

    #[error("incorrect ending for smc specification: {reason}")]
    IncorrectEnding { reason: String },

    #[error("line {line}: invalid literal `{text}` (must fit in 64 bits)")]
    InvalidLiteral { line: usize, text: String },

    #[error("line {line}: SMC call {call} declared twice")]
    DuplicateCall { line: usize, call: String },

    #[error("line {line}: register already specified for SMC call {call} argument {register}")]
    RegisterAlreadySpecified {
        line: usize,
        call: String,
        register: u8,
    },

    #[error("line {line}: register arg{register} of SMC call {call} is out of range (0-7)")]
    RegisterOutOfRange {
        line: usize,
        call: String,
        register: String,
    },

    #[error("line {line}: register range arg{first}-arg{last} of SMC call {call} is reversed")]
    InvalidRegisterRange {
        line: usize,
        call: String,
        first: u8,
        last: u8,
    },

    #[error("line {line}: argument label {label} declared twice for SMC call {call}")]
    DuplicateArgumentLabel {
        line: usize,
        call: String,
        label: String,
    },

    #[error("line {line}: argument {argument} (arg{register}) of SMC call {call} declares no fields")]
    EmptyArgument {
        line: usize,
        call: String,
        argument: String,
        register: u8,
    },

    #[error(
        "line {line}: field {field} of {call} {argument} has invalid bit range [{start},{end}] (need start <= end <= 63)"
    )]
    InvalidBitRange {
        line: usize,
        call: String,
        argument: String,
        field: String,
        start: String,
        end: String,
    },

    #[error(
        "line {line}: field overlap {call} {argument} {field} [{start},{end}] with {existing} [{existing_start},{existing_end}]"
    )]
    FieldOverlap {
        line: usize,
        call: String,
        argument: String,
        field: String,
        start: u8,
        end: u8,
        existing: String,
        existing_start: u8,
        existing_end: u8,
    },

    #[error("line {line}: field {field} declared twice in {call} {argument}")]
    DuplicateField {
        line: usize,
        call: String,
        argument: String,
        field: String,
    },

    #[error("cannot find define value {label} for SMC call {call}")]
    UnresolvedDefine { call: String, label: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to format header: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
