//! Human-readable documentation for generated registers.

use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::csr::CsrRegister;
use crate::error::EventResult;
use crate::event::EventSource;
use crate::manager::EventManager;

pub(crate) const STATUS_REG_DOC: &str = "This register contains the current raw level of the \
     event triggers. Writes to this register have no effect.";
pub(crate) const PENDING_REG_DOC: &str = "When an event occurs, the corresponding bit will be set \
     in this register. To clear the Event, set the corresponding bit in this register.";
pub(crate) const ENABLE_REG_DOC: &str = "This register enables the corresponding events. \
     Write a `0` to this register to disable individual events.";

/// The source's own description, or the level sentence for `name`.
pub(crate) fn status_field_doc(source: &EventSource, name: &str) -> String {
    match source.description() {
        Some(text) => String::from(text),
        None => format!("Level of the `{name}` event"),
    }
}

/// The source's own description, or a sentence built from its name and kind.
pub(crate) fn pending_field_doc(source: &EventSource, name: &str) -> String {
    match source.description() {
        Some(text) => String::from(text),
        None => format!(
            "`1` if a `{name}` event occurred. {}",
            source.kind().trigger_description()
        ),
    }
}

pub(crate) fn enable_field_doc(name: &str) -> String {
    format!("Write a `1` to enable the `{name}` Event")
}

/// Text rendering of one register and its fields.
pub struct RegisterDoc<'a>(pub &'a CsrRegister);

impl fmt::Display for RegisterDoc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.0;
        writeln!(
            f,
            "{} ({}, {} bits)",
            reg.name(),
            reg.kind().access(),
            reg.width()
        )?;
        writeln!(f, "{}", reg.description())?;
        for field in reg.fields() {
            writeln!(f, "  bit {}: {}: {}", field.offset, field.name, field.description)?;
        }
        Ok(())
    }
}

/// Renders status, pending and enable of a finalized manager.
pub fn render_manager(manager: &EventManager) -> EventResult<String> {
    let regs = manager.registers()?;
    let mut out = String::new();
    for reg in [&regs.status, &regs.pending, &regs.enable] {
        out.push_str(&format!("{}\n", RegisterDoc(reg)));
    }
    Ok(out)
}
