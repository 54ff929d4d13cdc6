//! BOOT ROM Services
//!
//! This crate implements the firmware-mediated services on top of the
//! `BIOS` capability:
//! - Interrupt vector registry (user and system spaces)
//! - Semaphore bank (32 binary semaphores)
//! - Interrupt mask controller
//! - Clock mode controller
//! - Priority table controller
//! - Secondary boot trigger
//! - Power-on-clear memory
//! - Peripheral presence check
//!
//! Every component borrows the firmware object it is given and depends on
//! nothing else; components never call each other. An application builds
//! whichever ones it needs:
//!
//! ```ignore
//! let bios = unsafe { RomBios::new() };
//! let sems = SemaphoreBank::new(&bios);
//! if let Some(_guard) = sems.try_lock(4)? {
//!     // shared data protected by semaphore 4
//! }
//! ```
//!
//! # Checked builds
//!
//! The firmware validates nothing. With `debug_assertions` or the `checked`
//! feature, misuse (bad ids, a non-zero presence argument, reads past the
//! power-on-clear region) is rejected with a [`BiosError`] and written to
//! the firmware debug log. Otherwise the call goes straight through.

#![no_std]

mod check;

pub mod boot;
pub mod clock;
pub mod mask;
pub mod peripheral;
pub mod power_on_clear;
pub mod priority;
pub mod semaphore;
pub mod vectors;

// Re-export BIOS types
pub use sbios_hal::{
    collaborators, scu, vector, BiosError, ClockMode, Handler, PeripheralStatus, PriorityEntry,
    PriorityTable, RomBios, SemaphoreId, SemaphoreState, VectorId, BIOS as BiosTrait,
};

pub use boot::SecondaryBootTrigger;
pub use check::CHECKED;
pub use clock::ClockModeController;
pub use mask::{InterruptMaskController, MaskGuard};
pub use peripheral::PeripheralPresenceCheck;
pub use power_on_clear::PowerOnClearMemory;
pub use priority::PriorityTableController;
pub use semaphore::{SemaphoreBank, SemaphoreGuard};
pub use vectors::InterruptVectorRegistry;
