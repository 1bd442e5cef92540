use std::collections::HashSet;

use crate::ir::{
    ArgumentKind, ArgumentSlot, CallRecord, Field, Literal, MAX_BIT, MAX_REGISTERS, SmcSpec,
    SymbolTable,
};
use crate::{Error, Result};

use super::token::{CallId, Line, tokenize};

/// Where the reader is in the call / argument / field nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing declared yet.
    ExpectCall,
    /// An `smc:` header with no argument so far.
    JustOpenedCall,
    /// The current call has at least one argument.
    HasArgument,
}

struct Deferred {
    call: usize,
    label: String,
}

struct Builder {
    state: State,
    calls: Vec<CallRecord>,
    call_names: HashSet<String>,
    defines: SymbolTable,
    deferred: Vec<Deferred>,
    /// Registers used by the current call.
    occupied: [bool; MAX_REGISTERS as usize],
    /// Line of the most recent `argN:` header, while it is still open.
    open_fielded: Option<usize>,
}

/// Parse a full SMC call list.
pub fn parse(source: &str) -> Result<SmcSpec> {
    let mut builder = Builder::new();
    for (index, text) in source.lines().enumerate() {
        builder.line(index + 1, text)?;
    }
    builder.finish()
}

impl Builder {
    fn new() -> Self {
        Self {
            state: State::ExpectCall,
            calls: Vec::new(),
            call_names: HashSet::new(),
            defines: SymbolTable::new(),
            deferred: Vec::new(),
            occupied: [false; MAX_REGISTERS as usize],
            open_fielded: None,
        }
    }

    fn line(&mut self, line: usize, text: &str) -> Result<()> {
        match tokenize(text) {
            Line::CallHeader { name, id } => self.open_call(line, name, id),
            Line::FieldedArg { register, label } => self.fielded_argument(line, register, label),
            Line::RawArg { register, value } => {
                self.enter_argument(line, || format!("arg{register} = {value}"))?;
                let register = self.register(line, register)?;
                let value = literal(line, value)?;
                self.raw_argument(line, register, value)
            }
            Line::RawArgRange { first, last, value } => {
                self.enter_argument(line, || format!("arg{first}-arg{last} = {value}"))?;
                let first = self.register(line, first)?;
                let last = self.register(line, last)?;
                if first > last {
                    return Err(Error::InvalidRegisterRange {
                        line,
                        call: self.current_call_name(),
                        first,
                        last,
                    });
                }
                let value = literal(line, value)?;
                for register in first..=last {
                    self.raw_argument(line, register, value)?;
                }
                Ok(())
            }
            Line::Field {
                name,
                start,
                end,
                value,
            } => self.field(line, name, start, end, value),
            Line::Define { name, value } => {
                let value = literal(line, value)?;
                self.defines.insert(name.to_string(), value.value);
                Ok(())
            }
            Line::Comment | Line::Blank => Ok(()),
            Line::Malformed => Err(Error::Malformed {
                line,
                text: text.trim().to_string(),
            }),
        }
    }

    fn open_call(&mut self, line: usize, name: &str, id: Option<CallId<'_>>) -> Result<()> {
        if self.state == State::JustOpenedCall {
            return Err(Error::OutOfSequence {
                line,
                what: format!(
                    "smc call {name} (smc call {} declares no arguments)",
                    self.current_call_name()
                ),
            });
        }
        self.close_fielded()?;
        if !self.call_names.insert(name.to_string()) {
            return Err(Error::DuplicateCall {
                line,
                call: name.to_string(),
            });
        }

        let (numeric_id, id_label) = match id {
            Some(CallId::Literal(text)) => (Some(literal(line, text)?.value), None),
            Some(CallId::Label(label)) => {
                self.deferred.push(Deferred {
                    call: self.calls.len(),
                    label: label.to_string(),
                });
                (None, Some(label.to_string()))
            }
            None => (None, None),
        };

        self.calls.push(CallRecord {
            name: name.to_string(),
            numeric_id,
            id_label,
            arguments: Vec::new(),
        });
        self.occupied = [false; MAX_REGISTERS as usize];
        self.state = State::JustOpenedCall;
        Ok(())
    }

    /// Shared sequencing for every argument form.
    fn enter_argument(&mut self, line: usize, what: impl FnOnce() -> String) -> Result<()> {
        if self.state == State::ExpectCall {
            return Err(Error::OutOfSequence {
                line,
                what: what(),
            });
        }
        self.close_fielded()?;
        self.state = State::HasArgument;
        Ok(())
    }

    fn fielded_argument(&mut self, line: usize, register: &str, label: &str) -> Result<()> {
        self.enter_argument(line, || format!("arg{register} for argname {label}"))?;
        let register = self.register(line, register)?;
        self.claim(line, register, label)?;
        self.current_call(line)?.arguments.push(ArgumentSlot {
            register,
            label: label.to_string(),
            kind: ArgumentKind::Fielded,
            fields: Vec::new(),
        });
        self.open_fielded = Some(line);
        Ok(())
    }

    fn raw_argument(&mut self, line: usize, register: u8, value: Literal) -> Result<()> {
        let slot = ArgumentSlot::raw_default(&self.current_call_name(), register, value);
        self.claim(line, register, &slot.label)?;
        self.current_call(line)?.arguments.push(slot);
        Ok(())
    }

    fn field(&mut self, line: usize, name: &str, start: &str, end: &str, value: &str) -> Result<()> {
        if self.state != State::HasArgument {
            return Err(Error::OutOfSequence {
                line,
                what: format!("field {name}"),
            });
        }
        let value = literal(line, value)?;
        let call = self.current_call_name();
        let argument = self
            .calls
            .last_mut()
            .and_then(|c| c.arguments.last_mut())
            .ok_or_else(|| Error::OutOfSequence {
                line,
                what: format!("field {name}"),
            })?;

        let bits = start
            .parse::<u8>()
            .ok()
            .zip(end.parse::<u8>().ok())
            .filter(|(s, e)| s <= e && *e <= MAX_BIT);
        let Some((bit_start, bit_end)) = bits else {
            return Err(Error::InvalidBitRange {
                line,
                call,
                argument: argument.label.clone(),
                field: name.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        };

        if argument.fields.iter().any(|f| f.name == name) {
            return Err(Error::DuplicateField {
                line,
                call,
                argument: argument.label.clone(),
                field: name.to_string(),
            });
        }
        if let Some(existing) = argument.fields.iter().find(|f| f.overlaps(bit_start, bit_end)) {
            return Err(Error::FieldOverlap {
                line,
                call,
                argument: argument.label.clone(),
                field: name.to_string(),
                start: bit_start,
                end: bit_end,
                existing: existing.name.clone(),
                existing_start: existing.bit_start,
                existing_end: existing.bit_end,
            });
        }

        argument.fields.push(Field {
            name: name.to_string(),
            bit_start,
            bit_end,
            default_value: value,
            register: argument.register,
            call,
            argument: argument.label.clone(),
        });
        self.open_fielded = None;
        Ok(())
    }

    fn finish(mut self) -> Result<SmcSpec> {
        match self.state {
            State::HasArgument => {}
            State::ExpectCall => {
                return Err(Error::IncorrectEnding {
                    reason: "no smc call declared".to_string(),
                });
            }
            State::JustOpenedCall => {
                return Err(Error::IncorrectEnding {
                    reason: format!(
                        "smc call {} declares no arguments",
                        self.current_call_name()
                    ),
                });
            }
        }
        self.close_fielded()?;

        for deferred in &self.deferred {
            let call = &mut self.calls[deferred.call];
            let Some(value) = self.defines.get(&deferred.label) else {
                return Err(Error::UnresolvedDefine {
                    call: call.name.clone(),
                    label: deferred.label.clone(),
                });
            };
            call.numeric_id = Some(*value);
        }

        let spec = SmcSpec {
            calls: self.calls,
            defines: self.defines,
        };
        tracing::debug!(
            "parsed {} SMC calls, {} arguments, {} fields",
            spec.calls.len(),
            spec.argument_count(),
            spec.field_count()
        );
        Ok(spec)
    }

    /// Reject an `argN:` header that is being closed without any field.
    fn close_fielded(&mut self) -> Result<()> {
        let Some(line) = self.open_fielded.take() else {
            return Ok(());
        };
        let call = self.current_call_name();
        let (argument, register) = self
            .calls
            .last()
            .and_then(|c| c.arguments.last())
            .map(|a| (a.label.clone(), a.register))
            .unwrap_or_default();
        Err(Error::EmptyArgument {
            line,
            call,
            argument,
            register,
        })
    }

    fn register(&self, line: usize, text: &str) -> Result<u8> {
        text.parse::<u8>()
            .ok()
            .filter(|r| *r < MAX_REGISTERS)
            .ok_or_else(|| Error::RegisterOutOfRange {
                line,
                call: self.current_call_name(),
                register: text.to_string(),
            })
    }

    /// Mark a register as used by the current call.
    fn claim(&mut self, line: usize, register: u8, label: &str) -> Result<()> {
        let call = self.current_call_name();
        if self.occupied[usize::from(register)] {
            return Err(Error::RegisterAlreadySpecified {
                line,
                call,
                register,
            });
        }
        if self.calls.last().is_some_and(|c| c.arguments.iter().any(|a| a.label == label)) {
            return Err(Error::DuplicateArgumentLabel {
                line,
                call,
                label: label.to_string(),
            });
        }
        self.occupied[usize::from(register)] = true;
        Ok(())
    }

    fn current_call(&mut self, line: usize) -> Result<&mut CallRecord> {
        self.calls.last_mut().ok_or_else(|| Error::OutOfSequence {
            line,
            what: "argument outside of an smc call".to_string(),
        })
    }

    fn current_call_name(&self) -> String {
        self.calls.last().map(|c| c.name.clone()).unwrap_or_default()
    }
}

fn literal(line: usize, text: &str) -> Result<Literal> {
    Literal::parse(text).ok_or_else(|| Error::InvalidLiteral {
        line,
        text: text.to_string(),
    })
}
