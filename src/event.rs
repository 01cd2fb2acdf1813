//! Event sources.
//!
//! Every source exposes the same four signals: `trigger` (in, driven by the
//! owning block), `status` (out, instantaneous level), `pending` (out, latched
//! event) and `clear` (in, driven by the manager on a write-1 to pending).
//! The [`EventKind`] decides how they relate.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::hdl::{Expr, Fragment, Signal, Stmt};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(0);

/// Creation-order identity of a source. Bit positions are ranked by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Trigger discipline of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Latches on `trigger`, held until cleared. `status` is always 0.
    Pulse,
    /// Latches on the falling edge of `trigger`. `status` mirrors `trigger`.
    Process,
    /// `status` and `pending` both mirror `trigger`; `clear` does nothing.
    Level,
}

impl EventKind {
    /// Sentence describing when a source of this kind fires.
    pub fn trigger_description(self) -> &'static str {
        match self {
            EventKind::Level => "This Event is **level triggered** when the signal is **high**.",
            EventKind::Pulse => "This Event is triggered on a **rising** edge.",
            EventKind::Process => "This Event is triggered on a **falling** edge.",
        }
    }
}

/// Handles to the four signals of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPorts {
    pub trigger: Signal,
    pub status: Signal,
    pub pending: Signal,
    pub clear: Signal,
}

/// A single-bit event producer.
///
/// Clones are handles to the same source: same id, same signals, same
/// attachment claim.
#[derive(Debug, Clone)]
pub struct EventSource {
    id: SourceId,
    kind: EventKind,
    name: Option<String>,
    description: Option<String>,
    ports: EventPorts,
    logic: Fragment,
    claimed: Arc<AtomicBool>,
}

impl EventSource {
    /// Event held after a one-cycle `trigger` until software acknowledges it,
    /// e.g. a UART pulsing `trigger` on character reception.
    pub fn pulse(name: Option<&str>) -> Self {
        Self::new(EventKind::Pulse, name)
    }

    /// Event raised when a held-high `trigger` is released, e.g. a busy line
    /// dropping when a process completes.
    pub fn process(name: Option<&str>) -> Self {
        Self::new(EventKind::Process, name)
    }

    /// Event mirroring `trigger`. The owning block must deassert it.
    pub fn level(name: Option<&str>) -> Self {
        Self::new(EventKind::Level, name)
    }

    pub fn new(kind: EventKind, name: Option<&str>) -> Self {
        let id = SourceId::next();
        let prefix = match name {
            Some(name) => String::from(name),
            None => format!("ev{}", id.0),
        };
        let ports = EventPorts {
            trigger: Signal::new(format!("{prefix}_trigger")),
            status: Signal::new(format!("{prefix}_status")),
            pending: Signal::new(format!("{prefix}_pending")),
            clear: Signal::new(format!("{prefix}_clear")),
        };
        let logic = match kind {
            EventKind::Pulse => pulse_logic(&ports),
            EventKind::Process => process_logic(&ports, Signal::new(format!("{prefix}_old_trigger"))),
            EventKind::Level => level_logic(&ports),
        };
        Self {
            id,
            kind,
            name: name.map(String::from),
            description: None,
            ports,
            logic,
            claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn ports(&self) -> &EventPorts {
        &self.ports
    }

    pub fn trigger(&self) -> &Signal {
        &self.ports.trigger
    }

    pub fn status(&self) -> &Signal {
        &self.ports.status
    }

    pub fn pending(&self) -> &Signal {
        &self.ports.pending
    }

    pub fn clear(&self) -> &Signal {
        &self.ports.clear
    }

    /// Latch logic of this source alone.
    pub fn fragment(&self) -> &Fragment {
        &self.logic
    }

    pub(crate) fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Marks the source as owned by a manager. Fails if already owned.
    pub(crate) fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

fn pulse_logic(p: &EventPorts) -> Fragment {
    Fragment {
        comb: vec![p.status.drive(false)],
        // Set after clear: a trigger in the same cycle as a clear wins.
        sync: vec![
            Stmt::when(&p.clear, vec![p.pending.drive(false)]),
            Stmt::when(&p.trigger, vec![p.pending.drive(true)]),
        ],
    }
}

fn process_logic(p: &EventPorts, old_trigger: Signal) -> Fragment {
    let falling = !Expr::from(&p.trigger) & &old_trigger;
    Fragment {
        comb: vec![p.status.drive(&p.trigger)],
        sync: vec![
            Stmt::when(&p.clear, vec![p.pending.drive(false)]),
            old_trigger.drive(&p.trigger),
            Stmt::when(falling, vec![p.pending.drive(true)]),
        ],
    }
}

fn level_logic(p: &EventPorts) -> Fragment {
    Fragment {
        comb: vec![p.status.drive(&p.trigger), p.pending.drive(&p.trigger)],
        sync: vec![],
    }
}
