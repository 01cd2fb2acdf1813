//! Cycle simulator for emitted [`Fragment`]s.
//!
//! Inputs are driven with [`Simulator::set`]; nothing is re-evaluated until
//! [`Simulator::settle`] or [`Simulator::tick`] is called.

use alloc::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::consts::MAX_SETTLE_PASSES;
use crate::hdl::{Fragment, Signal, SignalId, Stmt};

type Values = BTreeMap<SignalId, bool>;

pub struct Simulator {
    fragment: Fragment,
    comb_targets: BTreeSet<SignalId>,
    values: Values,
    cycle: u64,
}

impl Simulator {
    /// All signals start at 0. Comb logic is settled once before returning.
    pub fn new(fragment: Fragment) -> Self {
        let comb_targets = fragment.comb_targets();
        let mut sim = Self {
            fragment,
            comb_targets,
            values: Values::new(),
            cycle: 0,
        };
        sim.settle();
        sim
    }

    pub fn get(&self, signal: &Signal) -> bool {
        read(&self.values, signal.id())
    }

    pub fn set(&mut self, signal: &Signal, value: bool) {
        if self.comb_targets.contains(&signal.id()) {
            warn!("sim: {signal} is comb-driven, value will be overwritten on settle");
        }
        self.values.insert(signal.id(), value);
    }

    /// Clock edges applied so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Re-evaluates comb logic until no signal changes.
    ///
    /// Returns `false` if the logic did not converge (a combinational loop).
    pub fn settle(&mut self) -> bool {
        for _ in 0..MAX_SETTLE_PASSES {
            let mut next = self.values.clone();
            for target in &self.comb_targets {
                next.insert(*target, false);
            }
            exec(&self.fragment.comb, &self.values, &mut next);
            if next == self.values {
                return true;
            }
            self.values = next;
        }
        warn!("sim: comb logic did not settle after {MAX_SETTLE_PASSES} passes");
        false
    }

    /// Applies one clock edge: every sync statement sees the pre-edge values.
    pub fn tick(&mut self) {
        self.settle();
        let mut next = self.values.clone();
        exec(&self.fragment.sync, &self.values, &mut next);
        self.values = next;
        self.cycle += 1;
        self.settle();
    }
}

fn read(values: &Values, id: SignalId) -> bool {
    values.get(&id).copied().unwrap_or(false)
}

fn exec(stmts: &[Stmt], current: &Values, next: &mut Values) {
    for stmt in stmts {
        match stmt {
            Stmt::Assign { target, value } => {
                next.insert(*target, value.eval(&|id| read(current, id)));
            }
            Stmt::If { cond, then } => {
                if cond.eval(&|id| read(current, id)) {
                    exec(then, current, next);
                }
            }
        }
    }
}
