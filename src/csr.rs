//! Named 1-bit fields packed into CSR registers.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::hdl::{Fragment, Signal, Stmt};

/// Who drives a register's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrKind {
    /// Driven by hardware; software writes only raise the strobe.
    Status,
    /// Software-written, persistent storage.
    Storage,
    /// Driven by hardware; writing 1 to a bit acknowledges it.
    WriteOneToClear,
}

impl CsrKind {
    pub fn access(self) -> &'static str {
        match self {
            CsrKind::Status => "read-only",
            CsrKind::Storage => "read-write",
            CsrKind::WriteOneToClear => "read-write, write 1 to clear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrField {
    pub name: String,
    pub offset: usize,
    pub description: String,
}

impl CsrField {
    pub fn new(name: impl Into<String>, offset: usize, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset,
            description: description.into(),
        }
    }
}

/// A register of `width` bits.
///
/// `bits[i]` is the value software reads at bit `i`. A bus write places the
/// written word in `written[i]` and pulses `re` for one cycle.
#[derive(Debug, Clone)]
pub struct CsrRegister {
    name: String,
    kind: CsrKind,
    description: String,
    fields: Vec<CsrField>,
    bits: Vec<Signal>,
    written: Vec<Signal>,
    re: Signal,
    logic: Fragment,
}

impl CsrRegister {
    /// Hardware-driven register. The caller drives `bits`.
    pub fn status(name: &str, description: impl Into<String>, fields: Vec<CsrField>) -> Self {
        Self::build(name, CsrKind::Status, description.into(), fields)
    }

    /// Hardware-driven register whose bits are acknowledged by writing 1.
    /// The caller drives `bits` and consumes `re & written[i]`.
    pub fn write_one_to_clear(
        name: &str,
        description: impl Into<String>,
        fields: Vec<CsrField>,
    ) -> Self {
        Self::build(name, CsrKind::WriteOneToClear, description.into(), fields)
    }

    /// Software-written register, latched on `re`.
    pub fn storage(name: &str, description: impl Into<String>, fields: Vec<CsrField>) -> Self {
        let mut reg = Self::build(name, CsrKind::Storage, description.into(), fields);
        let latch: Vec<Stmt> = reg
            .bits
            .iter()
            .zip(&reg.written)
            .map(|(bit, w)| bit.drive(w))
            .collect();
        reg.logic.sync.push(Stmt::when(&reg.re, latch));
        reg
    }

    fn build(name: &str, kind: CsrKind, description: String, fields: Vec<CsrField>) -> Self {
        let width = fields.iter().map(|f| f.offset + 1).max().unwrap_or(0);
        Self {
            name: name.into(),
            kind,
            description,
            bits: (0..width).map(|i| Signal::new(format!("{name}_{i}"))).collect(),
            written: (0..width).map(|i| Signal::new(format!("{name}_r_{i}"))).collect(),
            re: Signal::new(format!("{name}_re")),
            fields,
            logic: Fragment::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CsrKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn fields(&self) -> &[CsrField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CsrField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Value signal of the field called `name`.
    pub fn field_bit(&self, name: &str) -> Option<&Signal> {
        self.field(name).and_then(|f| self.bits.get(f.offset))
    }

    pub fn bit(&self, index: usize) -> Option<&Signal> {
        self.bits.get(index)
    }

    pub fn bits(&self) -> &[Signal] {
        &self.bits
    }

    pub fn written(&self, index: usize) -> Option<&Signal> {
        self.written.get(index)
    }

    pub fn written_bits(&self) -> &[Signal] {
        &self.written
    }

    /// Write strobe.
    pub fn re(&self) -> &Signal {
        &self.re
    }

    /// Logic owned by the register itself (the storage latch).
    pub fn fragment(&self) -> &Fragment {
        &self.logic
    }
}
