//! Elaboration-time errors.
//!
//! Every error here aborts generation: there is no partial-success mode, a
//! manager that failed to finalize must not be used to emit hardware.

use alloc::string::String;

use axerrno::AxError;

/// Errors raised while attaching sources or finalizing a manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// Attach or finalize on a manager whose register layout is already fixed.
    #[error("event manager is already finalized")]
    AlreadyFinalized,
    /// The same source (or a clone of it) was attached a second time.
    #[error("event source #{0} is already attached")]
    DuplicateSource(u64),
    /// Two sources resolve to the same field name.
    #[error("event field name `{0}` is used by more than one source")]
    NameCollision(String),
    /// Register layout was requested before finalization.
    #[error("event manager is not finalized yet")]
    NotFinalized,
    /// A shared IRQ needs at least one manager to merge.
    #[error("shared irq requires at least one event manager")]
    NoManagers,
    /// The manager already holds the maximum number of sources.
    #[error("event manager cannot hold more than {0} sources")]
    TooManySources(usize),
}

/// Result alias used throughout the crate.
pub type EventResult<T = ()> = Result<T, EventError>;

impl From<EventError> for AxError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::AlreadyFinalized | EventError::NotFinalized => AxError::BadState,
            EventError::DuplicateSource(_) | EventError::NameCollision(_) => {
                AxError::AlreadyExists
            }
            EventError::NoManagers => AxError::InvalidInput,
            EventError::TooManySources(_) => AxError::NoMemory,
        }
    }
}
