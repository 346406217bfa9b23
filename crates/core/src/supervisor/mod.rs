//! Provisioning run supervision.
//!
//! This module provides:
//! - [`ProcessSupervisor`], the single-flight owner of the run slot
//! - [`RunHandle`], the slot state machine
//! - [`EventEmitter`], which enforces the event stream invariants
//! - The worker task that drives one run to completion

pub mod emitter;
pub mod error;
pub mod handle;
pub mod manager;
mod worker;

pub use emitter::EventEmitter;
pub use error::{SupervisorError, SupervisorResult};
pub use handle::RunHandle;
pub use manager::{EventStream, ProcessSupervisor, EVENT_BUFFER};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock the run slot.
///
/// Every critical section is a plain state transition, so a poisoned lock
/// still holds a consistent handle.
fn lock(handle: &Mutex<RunHandle>) -> MutexGuard<'_, RunHandle> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
