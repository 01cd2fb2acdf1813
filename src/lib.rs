//! Interrupt controller generation from declarative event sources.
//!
//! Event sources ([`EventSource`]) are attached to an [`EventManager`]. On
//! [`EventManager::finalize`] each source gets one bit, ranked by creation
//! order, in three registers:
//!
//! - `status`: read-only, the instantaneous trigger level;
//! - `pending`: latched events, write 1 to clear;
//! - `enable`: persistent mask.
//!
//! `irq` is the OR of `pending & enable`. Several managers can share a
//! line through [`SharedIrq`].
//!
//! ```
//! use csr_eventmanager::{EventCsrBank, EventManager, EventSource};
//!
//! let rx = EventSource::pulse(Some("uart_rx"));
//! let mut ev = EventManager::new();
//! let rx = ev.attach(rx).unwrap();
//! ev.finalize().unwrap();
//!
//! let mut bank = EventCsrBank::new(&ev).unwrap();
//! bank.enable_event(0).unwrap();
//! bank.sim_mut().set(&rx.trigger, true);
//! bank.sim_mut().tick();
//! assert!(bank.irq());
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod bank;
mod consts;
pub mod csr;
mod doc;
mod error;
mod event;
pub mod hdl;
mod manager;
mod shared;
pub mod sim;
mod utils;

pub use consts::*;

pub use bank::{EventBits, EventCsrBank};
pub use doc::{render_manager, RegisterDoc};
pub use error::{EventError, EventResult};
pub use event::{EventKind, EventPorts, EventSource, SourceId};
pub use manager::{EventManager, EventRegisters};
pub use shared::SharedIrq;
