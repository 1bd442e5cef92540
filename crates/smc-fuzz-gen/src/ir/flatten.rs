//! Flattened views over the call tree.
//!
//! The generated headers index four spaces at once: calls, (call, argument)
//! pairs, fields across the whole file, and fields within one argument.
//! These views compute all four ordinals in a single file-order walk so the
//! emitters never derive them independently.

use super::{ArgumentSlot, CallRecord, Field, SmcSpec};

/// A (call, argument) pair with its ordinals.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentRef<'a> {
    /// Ordinal of the pair across the whole file.
    pub ordinal: usize,
    pub call_ordinal: usize,
    pub call: &'a CallRecord,
    pub argument: &'a ArgumentSlot,
    /// Index of this argument's first row in the flattened field table.
    pub first_field: usize,
}

impl ArgumentRef<'_> {
    /// `<CALL>_ARG<N>`
    #[must_use]
    pub fn constant(&self) -> String {
        format!("{}_ARG{}", self.call.name, self.argument.register)
    }

    /// Inclusive `[lo, hi]` row range of this argument's fields.
    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        let last = (self.first_field + self.argument.fields.len()).saturating_sub(1);
        (self.first_field, last)
    }
}

/// A field with every ordinal the headers need.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    /// Global ordinal; the row index in the flattened field table.
    pub ordinal: usize,
    /// Position within the owning argument.
    pub position: usize,
    pub argument_ordinal: usize,
    pub call_ordinal: usize,
    pub call: &'a CallRecord,
    pub argument: &'a ArgumentSlot,
    pub field: &'a Field,
}

impl FieldRef<'_> {
    /// `<CALL>_ARG<N>`, the owning pair's constant.
    #[must_use]
    pub fn argument_constant(&self) -> String {
        format!("{}_ARG{}", self.call.name, self.field.register)
    }

    /// `<CALL>_ARG<N>_<FIELD>`, the global ordinal constant.
    #[must_use]
    pub fn ordinal_constant(&self) -> String {
        format!(
            "{}_{}",
            self.argument_constant(),
            self.field.name.to_uppercase()
        )
    }

    /// `<CALL>_ARG<N>_<FIELD>_CNT`, the position-within-argument constant.
    #[must_use]
    pub fn position_constant(&self) -> String {
        format!("{}_CNT", self.ordinal_constant())
    }
}

impl SmcSpec {
    /// Every (call, argument) pair in file order.
    #[must_use]
    pub fn argument_pairs(&self) -> Vec<ArgumentRef<'_>> {
        let mut pairs = Vec::with_capacity(self.argument_count());
        let mut first_field = 0;
        for (call_ordinal, call) in self.calls.iter().enumerate() {
            for argument in &call.arguments {
                pairs.push(ArgumentRef {
                    ordinal: pairs.len(),
                    call_ordinal,
                    call,
                    argument,
                    first_field,
                });
                first_field += argument.fields.len();
            }
        }
        pairs
    }

    /// Every field in file order.
    #[must_use]
    pub fn flat_fields(&self) -> Vec<FieldRef<'_>> {
        let mut fields = Vec::with_capacity(self.field_count());
        for pair in self.argument_pairs() {
            for (position, field) in pair.argument.fields.iter().enumerate() {
                fields.push(FieldRef {
                    ordinal: fields.len(),
                    position,
                    argument_ordinal: pair.ordinal,
                    call_ordinal: pair.call_ordinal,
                    call: pair.call,
                    argument: pair.argument,
                    field,
                });
            }
        }
        fields
    }

    /// Index of each call's first pair in [`Self::argument_pairs`].
    #[must_use]
    pub fn call_argument_offsets(&self) -> Vec<usize> {
        self.calls
            .iter()
            .scan(0, |offset, call| {
                let start = *offset;
                *offset += call.arguments.len();
                Some(start)
            })
            .collect()
    }
}
