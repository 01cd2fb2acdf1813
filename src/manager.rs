//! Event manager: bit allocation and register synthesis.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::consts::*;
use crate::csr::{CsrField, CsrRegister};
use crate::doc::*;
use crate::error::{EventError, EventResult};
use crate::event::{EventPorts, EventSource, SourceId};
use crate::hdl::{Expr, Fragment, Signal, Stmt};

/// The three registers of a finalized manager.
#[derive(Debug, Clone)]
pub struct EventRegisters {
    /// Read-only, bit i mirrors `status` of source i.
    pub status: CsrRegister,
    /// Latched events, write 1 to clear.
    pub pending: CsrRegister,
    /// Persistent mask gating `irq`.
    pub enable: CsrRegister,
}

enum ManagerState {
    Open,
    Finalized {
        registers: EventRegisters,
        fields: Vec<String>,
        logic: Fragment,
    },
}

/// Collects event sources and, once finalized, exposes a status/pending/enable
/// register triple plus an `irq` line high whenever a pending source is enabled.
///
/// Bit `i` in every register belongs to the source with the `i`-th smallest
/// creation id, whatever order sources were attached in.
pub struct EventManager {
    sources: BTreeMap<SourceId, EventSource>,
    names: BTreeSet<String>,
    irq: Signal,
    state: ManagerState,
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
            names: BTreeSet::new(),
            irq: Signal::new("irq"),
            state: ManagerState::Open,
        }
    }

    /// Takes ownership of `source` and returns handles to its signals.
    pub fn attach(&mut self, source: EventSource) -> EventResult<EventPorts> {
        if self.is_finalized() {
            warn!("attach of event source #{} after finalize", source.id().as_u64());
            return Err(EventError::AlreadyFinalized);
        }
        if self.sources.contains_key(&source.id()) || source.is_claimed() {
            warn!("event source #{} attached twice", source.id().as_u64());
            return Err(EventError::DuplicateSource(source.id().as_u64()));
        }
        if self.sources.len() >= MAX_EVENT_SOURCES {
            warn!("event manager is full ({MAX_EVENT_SOURCES} sources)");
            return Err(EventError::TooManySources(MAX_EVENT_SOURCES));
        }
        if let Some(name) = source.name() {
            if self.names.contains(name) {
                warn!("event source name `{name}` already in use");
                return Err(EventError::NameCollision(String::from(name)));
            }
        }
        if !source.claim() {
            return Err(EventError::DuplicateSource(source.id().as_u64()));
        }

        if let Some(name) = source.name() {
            self.names.insert(String::from(name));
        }
        debug!(
            "attached {:?} event source #{} ({:?})",
            source.kind(),
            source.id().as_u64(),
            source.name()
        );
        let ports = source.ports().clone();
        self.sources.insert(source.id(), source);
        Ok(ports)
    }

    /// Fixes the register layout and emits the wiring. Runs exactly once.
    ///
    /// On error the manager stays open and nothing is emitted.
    pub fn finalize(&mut self) -> EventResult {
        if self.is_finalized() {
            warn!("event manager finalized twice");
            return Err(EventError::AlreadyFinalized);
        }

        let fields = self.field_names()?;
        let sources: Vec<&EventSource> = self.sources.values().collect();

        let mut status_fields = Vec::with_capacity(sources.len());
        let mut pending_fields = Vec::with_capacity(sources.len());
        let mut enable_fields = Vec::with_capacity(sources.len());
        for (i, (source, name)) in sources.iter().zip(&fields).enumerate() {
            status_fields.push(CsrField::new(name.as_str(), i, status_field_doc(source, name)));
            pending_fields.push(CsrField::new(name.as_str(), i, pending_field_doc(source, name)));
            enable_fields.push(CsrField::new(name.as_str(), i, enable_field_doc(name)));
        }
        let status = CsrRegister::status(STATUS_REG_NAME, STATUS_REG_DOC, status_fields);
        let pending =
            CsrRegister::write_one_to_clear(PENDING_REG_NAME, PENDING_REG_DOC, pending_fields);
        let enable = CsrRegister::storage(ENABLE_REG_NAME, ENABLE_REG_DOC, enable_fields);

        let mut logic = Fragment::new();
        for source in &sources {
            logic.extend(source.fragment().clone());
        }
        logic.extend(enable.fragment().clone());

        let mut irqs = Vec::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            let pending_bit = &pending.bits()[i];
            let enable_bit = &enable.bits()[i];
            let write_one = Expr::from(pending.re()) & &pending.written_bits()[i];
            logic.comb.push(status.bits()[i].drive(source.status()));
            logic.comb.push(pending_bit.drive(source.pending()));
            logic.comb.push(Stmt::when(write_one, vec![source.clear().drive(true)]));
            irqs.push(Expr::from(pending_bit) & enable_bit);
        }
        logic.comb.push(self.irq.drive(Expr::any_of(irqs)));

        info!(
            "event manager finalized: {} sources [{}]",
            fields.len(),
            fields.join(", ")
        );
        self.state = ManagerState::Finalized {
            registers: EventRegisters {
                status,
                pending,
                enable,
            },
            fields,
            logic,
        };
        Ok(())
    }

    /// Field names in bit order; unnamed sources get `eventI`.
    fn field_names(&self) -> EventResult<Vec<String>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(self.sources.len());
        for (i, source) in self.sources.values().enumerate() {
            let name = match source.name() {
                Some(name) => String::from(name),
                None => format!("{FALLBACK_NAME_PREFIX}{i}"),
            };
            if !seen.insert(name.clone()) {
                warn!("event field name `{name}` collides with another source");
                return Err(EventError::NameCollision(name));
            }
            out.push(name);
        }
        Ok(out)
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, ManagerState::Finalized { .. })
    }

    /// Aggregated interrupt. Valid to wire before finalize.
    pub fn irq(&self) -> &Signal {
        &self.irq
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Attached sources in bit order.
    pub fn sources(&self) -> impl Iterator<Item = &EventSource> {
        self.sources.values()
    }

    /// Bit assigned to `source`, once the layout is fixed.
    pub fn bit_of(&self, source: &EventSource) -> EventResult<Option<usize>> {
        if !self.is_finalized() {
            return Err(EventError::NotFinalized);
        }
        Ok(self.sources.keys().position(|id| *id == source.id()))
    }

    pub fn registers(&self) -> EventResult<&EventRegisters> {
        match &self.state {
            ManagerState::Finalized { registers, .. } => Ok(registers),
            ManagerState::Open => Err(EventError::NotFinalized),
        }
    }

    pub fn status(&self) -> EventResult<&CsrRegister> {
        Ok(&self.registers()?.status)
    }

    pub fn pending(&self) -> EventResult<&CsrRegister> {
        Ok(&self.registers()?.pending)
    }

    pub fn enable(&self) -> EventResult<&CsrRegister> {
        Ok(&self.registers()?.enable)
    }

    /// Resolved field names in bit order.
    pub fn field_names_in_order(&self) -> EventResult<&[String]> {
        match &self.state {
            ManagerState::Finalized { fields, .. } => Ok(fields),
            ManagerState::Open => Err(EventError::NotFinalized),
        }
    }

    /// Source latch logic, register storage and manager wiring.
    pub fn fragment(&self) -> EventResult<&Fragment> {
        match &self.state {
            ManagerState::Finalized { logic, .. } => Ok(logic),
            ManagerState::Open => Err(EventError::NotFinalized),
        }
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
