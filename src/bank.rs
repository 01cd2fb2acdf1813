//! Firmware-facing CSR bank of a finalized [`EventManager`].
//!
//! Registers are packed as status, pending, enable. Each spans
//! `csr_words(n)` 32-bit words; word W covers bits [W*32, W*32+31].
//! The bank drives the emitted logic through a [`Simulator`], so reads and
//! writes observe exactly what the generated hardware would do. Inputs
//! changed through [`EventCsrBank::sim_mut`] must be settled (or ticked)
//! before the next read.

use axerrno::{AxError, AxResult};
use bitmaps::Bitmap;
use log::trace;

use crate::consts::*;
use crate::csr::{CsrKind, CsrRegister};
use crate::error::EventResult;
use crate::hdl::Signal;
use crate::manager::{EventManager, EventRegisters};
use crate::sim::Simulator;
use crate::utils::*;

/// Whole-register value, bit i = source i.
pub type EventBits = Bitmap<MAX_EVENT_SOURCES>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BankReg {
    Status,
    Pending,
    Enable,
}

pub struct EventCsrBank {
    registers: EventRegisters,
    irq: Signal,
    words: usize,
    sim: Simulator,
}

impl EventCsrBank {
    pub fn new(manager: &EventManager) -> EventResult<Self> {
        let registers = manager.registers()?.clone();
        let sim = Simulator::new(manager.fragment()?.clone());
        Ok(Self {
            words: csr_words(registers.status.width()),
            registers,
            irq: manager.irq().clone(),
            sim,
        })
    }

    /// Bank size in bytes.
    pub fn size(&self) -> usize {
        3 * self.words * CSR_WORD_BYTES
    }

    pub fn status_offset(&self) -> usize {
        0
    }

    pub fn pending_offset(&self) -> usize {
        self.words * CSR_WORD_BYTES
    }

    pub fn enable_offset(&self) -> usize {
        2 * self.words * CSR_WORD_BYTES
    }

    pub fn sim(&self) -> &Simulator {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    /// Current level of the aggregated interrupt line.
    pub fn irq(&self) -> bool {
        self.sim.get(&self.irq)
    }

    fn locate(&self, offset: usize) -> AxResult<(BankReg, usize)> {
        if offset % CSR_WORD_BYTES != 0 {
            return Err(AxError::InvalidInput);
        }
        let pending_base = self.pending_offset();
        let enable_base = self.enable_offset();
        match offset {
            o if o < pending_base => Ok((BankReg::Status, o / CSR_WORD_BYTES)),
            o if o < enable_base => Ok((BankReg::Pending, (o - pending_base) / CSR_WORD_BYTES)),
            o if o < self.size() => Ok((BankReg::Enable, (o - enable_base) / CSR_WORD_BYTES)),
            _ => Err(AxError::InvalidInput),
        }
    }

    fn register(&self, reg: BankReg) -> &CsrRegister {
        match reg {
            BankReg::Status => &self.registers.status,
            BankReg::Pending => &self.registers.pending,
            BankReg::Enable => &self.registers.enable,
        }
    }

    pub fn handle_read(&self, offset: usize) -> AxResult<usize> {
        let (reg, word) = self.locate(offset)?;
        let reg = self.register(reg);
        let val = pack_word(word, reg.width(), |i| self.sim.get(&reg.bits()[i]));
        trace!("event bank read {offset:#x} ({}) = {val:#x}", reg.name());
        Ok(val as usize)
    }

    /// Bus write: places `val` on the written bits of one word and pulses the
    /// register strobe for one cycle. Other words of a storage register keep
    /// their value; other words of status and pending are written as 0, so a
    /// pending write never clears bits outside the addressed word.
    pub fn handle_write(&mut self, offset: usize, val: usize) -> AxResult {
        let (reg, word) = self.locate(offset)?;
        let reg = match reg {
            BankReg::Status => &self.registers.status,
            BankReg::Pending => &self.registers.pending,
            BankReg::Enable => &self.registers.enable,
        };
        trace!("event bank write {offset:#x} ({}) <- {val:#x}", reg.name());
        let keep = reg.kind() == CsrKind::Storage;
        for (index, written) in reg.written_bits().iter().enumerate() {
            let value = match word_bit(val, word, index) {
                Some(bit) => bit,
                None => keep && self.sim.get(&reg.bits()[index]),
            };
            self.sim.set(written, value);
        }
        self.sim.set(reg.re(), true);
        self.sim.tick();
        self.sim.set(reg.re(), false);
        self.sim.settle();
        Ok(())
    }

    /// Word offset (relative to a register base) and mask of event `index`.
    fn event_word(&self, index: usize) -> AxResult<(usize, usize)> {
        if index >= self.registers.status.width() {
            return Err(AxError::InvalidInput);
        }
        Ok((
            (index / CSR_DATA_WIDTH) * CSR_WORD_BYTES,
            1 << (index % CSR_DATA_WIDTH),
        ))
    }

    pub fn enable_event(&mut self, index: usize) -> AxResult {
        let (word, mask) = self.event_word(index)?;
        let offset = self.enable_offset() + word;
        let cur = self.handle_read(offset)?;
        self.handle_write(offset, cur | mask)
    }

    pub fn disable_event(&mut self, index: usize) -> AxResult {
        let (word, mask) = self.event_word(index)?;
        let offset = self.enable_offset() + word;
        let cur = self.handle_read(offset)?;
        self.handle_write(offset, cur & !mask)
    }

    /// Write-1-to-clear on the pending bit of event `index`.
    ///
    /// A level source stays pending while its trigger is high.
    pub fn clear_event(&mut self, index: usize) -> AxResult {
        let (word, mask) = self.event_word(index)?;
        self.handle_write(self.pending_offset() + word, mask)
    }

    pub fn event_enabled(&self, index: usize) -> AxResult<bool> {
        let (word, mask) = self.event_word(index)?;
        Ok(self.handle_read(self.enable_offset() + word)? & mask != 0)
    }

    pub fn event_pending(&self, index: usize) -> AxResult<bool> {
        let (word, mask) = self.event_word(index)?;
        Ok(self.handle_read(self.pending_offset() + word)? & mask != 0)
    }

    /// Status bit of event `index`: the trigger level, always 0 for pulse sources.
    pub fn event_source_input(&self, index: usize) -> AxResult<bool> {
        let (word, mask) = self.event_word(index)?;
        Ok(self.handle_read(self.status_offset() + word)? & mask != 0)
    }

    fn snapshot(&self, reg: &CsrRegister) -> EventBits {
        let mut bits = EventBits::new();
        for (i, signal) in reg.bits().iter().enumerate() {
            bits.set(i, self.sim.get(signal));
        }
        bits
    }

    pub fn events_pending(&self) -> EventBits {
        self.snapshot(&self.registers.pending)
    }

    pub fn events_enabled(&self) -> EventBits {
        self.snapshot(&self.registers.enable)
    }

    /// Lowest event that is both pending and enabled.
    pub fn next_asserted(&self) -> Option<usize> {
        (self.events_pending() & self.events_enabled()).first_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use alloc::vec::Vec;

    fn bank_with(sources: &[EventSource]) -> EventCsrBank {
        let mut mgr = EventManager::new();
        for src in sources {
            mgr.attach(src.clone()).unwrap();
        }
        mgr.finalize().unwrap();
        EventCsrBank::new(&mgr).unwrap()
    }

    #[test]
    fn needs_finalized_manager() {
        assert!(EventCsrBank::new(&EventManager::new()).is_err());
    }

    #[test]
    fn empty_bank_rejects_everything() {
        let mut bank = bank_with(&[]);
        assert_eq!(bank.size(), 0);
        assert_eq!(bank.handle_read(0), Err(AxError::InvalidInput));
        assert_eq!(bank.handle_write(0, 1), Err(AxError::InvalidInput));
        assert_eq!(bank.next_asserted(), None);
        assert!(!bank.irq());
    }

    #[test]
    fn layout_of_single_word_bank() {
        let bank = bank_with(&[EventSource::pulse(None), EventSource::level(None)]);
        assert_eq!(bank.size(), 12);
        assert_eq!(bank.pending_offset(), 4);
        assert_eq!(bank.enable_offset(), 8);
        assert_eq!(bank.handle_read(2), Err(AxError::InvalidInput));
        assert_eq!(bank.handle_read(12), Err(AxError::InvalidInput));
    }

    #[test]
    fn enable_is_persistent_and_word_local() {
        let sources: Vec<EventSource> = (0..40).map(|_| EventSource::level(None)).collect();
        let mut bank = bank_with(&sources);
        assert_eq!(bank.pending_offset(), 8);
        assert_eq!(bank.enable_offset(), 16);

        bank.handle_write(16, 0x8000_0001).unwrap();
        bank.handle_write(20, 0xff).unwrap();
        assert_eq!(bank.handle_read(16), Ok(0x8000_0001));
        // Only 8 bits exist in the second word.
        assert_eq!(bank.handle_read(20), Ok(0xff));
        assert!(bank.event_enabled(39).unwrap());
        assert!(bank.event_enabled(31).unwrap());
        assert!(!bank.event_enabled(30).unwrap());

        bank.disable_event(31).unwrap();
        assert_eq!(bank.handle_read(16), Ok(1));
        assert_eq!(bank.event_enabled(40), Err(AxError::InvalidInput));
    }

    #[test]
    fn status_writes_have_no_effect() {
        let level = EventSource::level(None);
        let mut bank = bank_with(&[level.clone()]);
        bank.handle_write(0, 1).unwrap();
        assert_eq!(bank.handle_read(0), Ok(0));
        bank.sim_mut().set(level.trigger(), true);
        bank.sim_mut().settle();
        assert_eq!(bank.handle_read(0), Ok(1));
    }

    #[test]
    fn pending_write_clears_only_written_ones() {
        let sources = [EventSource::pulse(None), EventSource::pulse(None)];
        let mut bank = bank_with(&sources);
        for src in &sources {
            bank.sim_mut().set(src.trigger(), true);
        }
        bank.sim_mut().tick();
        for src in &sources {
            bank.sim_mut().set(src.trigger(), false);
        }
        bank.sim_mut().tick();
        let pending = bank.pending_offset();
        assert_eq!(bank.handle_read(pending), Ok(0b11));

        bank.handle_write(pending, 0).unwrap();
        assert_eq!(bank.handle_read(pending), Ok(0b11));

        bank.handle_write(pending, 0b10).unwrap();
        assert_eq!(bank.handle_read(pending), Ok(0b01));
        assert_eq!(bank.events_pending().first_index(), Some(0));
    }

    #[test]
    fn next_asserted_picks_lowest() {
        let sources: Vec<EventSource> = (0..3).map(|_| EventSource::level(None)).collect();
        let mut bank = bank_with(&sources);
        for src in &sources[1..] {
            bank.sim_mut().set(src.trigger(), true);
        }
        bank.sim_mut().settle();
        assert_eq!(bank.next_asserted(), None);
        assert!(!bank.irq());

        bank.enable_event(2).unwrap();
        assert_eq!(bank.next_asserted(), Some(2));
        bank.enable_event(1).unwrap();
        assert_eq!(bank.next_asserted(), Some(1));
        assert!(bank.irq());
        assert!(bank.events_pending().get(2));
        assert!(!bank.events_enabled().get(0));
    }
}
