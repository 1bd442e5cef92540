//! In-memory description of an SMC call list.
//!
//! The tree is built once by [`crate::dsl::parse_str`] and is read-only
//! afterwards. Every sequence keeps declaration order, which is the order
//! all generated tables are laid out in.

mod flatten;

use std::collections::HashMap;
use std::fmt;

pub use flatten::{ArgumentRef, FieldRef};

/// Number of argument registers an SMC call can take.
pub const MAX_REGISTERS: u8 = 8;

/// Highest bit index of a 64-bit register.
pub const MAX_BIT: u8 = 63;

/// Notation a literal was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Hex,
    Decimal,
}

/// A 64-bit value that remembers how the author spelled it, so generated
/// headers keep the same notation as the call list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub value: u64,
    pub radix: Radix,
}

impl Literal {
    #[must_use]
    pub fn hex(value: u64) -> Self {
        Self {
            value,
            radix: Radix::Hex,
        }
    }

    #[must_use]
    pub fn decimal(value: u64) -> Self {
        Self {
            value,
            radix: Radix::Decimal,
        }
    }

    /// Parse `0xHEX` or a decimal number. Returns `None` if the text is not
    /// a literal or does not fit in 64 bits.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(digits) = text.strip_prefix("0x") {
            u64::from_str_radix(digits, 16).ok().map(Self::hex)
        } else {
            text.parse().ok().map(Self::decimal)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.radix {
            Radix::Hex => write!(f, "0x{:x}", self.value),
            Radix::Decimal => write!(f, "{}", self.value),
        }
    }
}

/// How an argument slot was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// `argN: LABEL` followed by `field:` lines.
    Fielded,
    /// `argN = VALUE` or a register range; carries one implicit 0-63 field.
    RawDefault,
}

/// A named bit range inside one argument register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// First bit, inclusive.
    pub bit_start: u8,
    /// Last bit, inclusive.
    pub bit_end: u8,
    pub default_value: Literal,
    pub register: u8,
    pub call: String,
    pub argument: String,
}

impl Field {
    /// Number of bits covered by the field.
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::from(self.bit_end - self.bit_start) + 1
    }

    /// Mask of `width()` low bits.
    #[must_use]
    pub fn mask(&self) -> u64 {
        if self.width() >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width()) - 1
        }
    }

    /// Inclusive interval intersection.
    #[must_use]
    pub fn overlaps(&self, start: u8, end: u8) -> bool {
        start <= self.bit_end && self.bit_start <= end
    }

    /// Extract this field's bits from a full register value.
    #[must_use]
    pub fn extract(&self, register_value: u64) -> u64 {
        (register_value >> self.bit_start) & self.mask()
    }
}

/// One occupied register of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSlot {
    pub register: u8,
    pub label: String,
    pub kind: ArgumentKind,
    pub fields: Vec<Field>,
}

impl ArgumentSlot {
    /// Build a raw-default slot: a single field spanning the whole register.
    #[must_use]
    pub fn raw_default(call: &str, register: u8, value: Literal) -> Self {
        let label = format!("{call}_arg_{register}");
        let field = Field {
            name: format!("{label}_field"),
            bit_start: 0,
            bit_end: MAX_BIT,
            default_value: value,
            register,
            call: call.to_string(),
            argument: label.clone(),
        };
        Self {
            register,
            label,
            kind: ArgumentKind::RawDefault,
            fields: vec![field],
        }
    }
}

/// One `smc:` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub name: String,
    /// Function id, either literal or resolved from a `define`.
    pub numeric_id: Option<u64>,
    /// The `define` label the id was resolved from, if any.
    pub id_label: Option<String>,
    pub arguments: Vec<ArgumentSlot>,
}

impl CallRecord {
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.arguments.iter().map(|a| a.fields.len()).sum()
    }

    #[must_use]
    pub fn argument(&self, register: u8) -> Option<&ArgumentSlot> {
        self.arguments.iter().find(|a| a.register == register)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.arguments.iter().flat_map(|a| a.fields.iter())
    }
}

/// `define NAME = VALUE` entries.
pub type SymbolTable = HashMap<String, u64>;

/// A fully parsed and validated SMC call list.
#[derive(Debug, Clone, Default)]
pub struct SmcSpec {
    pub calls: Vec<CallRecord>,
    pub defines: SymbolTable,
}

impl SmcSpec {
    #[must_use]
    pub fn call(&self, name: &str) -> Option<&CallRecord> {
        self.calls.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn argument_count(&self) -> usize {
        self.calls.iter().map(|c| c.arguments.len()).sum()
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.calls.iter().map(CallRecord::field_count).sum()
    }
}
