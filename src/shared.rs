use alloc::vec;

use log::debug;

use crate::error::{EventError, EventResult};
use crate::hdl::{Expr, Fragment, Signal};
use crate::manager::EventManager;

/// One interrupt line shared by several event managers.
///
/// The managers need not be finalized yet; the merge only reads their `irq`.
pub struct SharedIrq {
    irq: Signal,
    logic: Fragment,
}

impl SharedIrq {
    pub fn new(managers: &[&EventManager]) -> EventResult<Self> {
        if managers.is_empty() {
            return Err(EventError::NoManagers);
        }
        let irq = Signal::new("shared_irq");
        let merged = Expr::any_of(managers.iter().map(|m| m.irq()));
        let logic = Fragment {
            comb: vec![irq.drive(merged)],
            sync: vec![],
        };
        debug!("shared irq over {} event managers", managers.len());
        Ok(Self { irq, logic })
    }

    pub fn irq(&self) -> &Signal {
        &self.irq
    }

    pub fn fragment(&self) -> &Fragment {
        &self.logic
    }
}
