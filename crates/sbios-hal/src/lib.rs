//! BOOT ROM capability trait
//!
//! This crate defines the `BIOS` trait: one object standing for "the
//! firmware", passed explicitly to any code that needs a firmware service.
//! Code written against the trait runs unchanged on the console and against
//! a simulated firmware in tests.
//!
//! # Implementations
//!
//! - **RomBios**: The resident BOOT ROM, reached through its published
//!   address map (`rom` module)
//! - **SimBios**: Simulated firmware for emulation and tests
//!   (`sbios-hal-mock` crate)
//! - **TestBios**: Inert stub for tests that never look at firmware state

#![no_std]

extern crate alloc;

pub mod layout;
pub mod rom;
pub mod types;

use core::fmt;

/// Externally supplied `SYS_CheckTrack` / `SYS_Exit`
pub use sbios_unsafe_primitives::ffi as collaborators;

pub use layout::BiosLayout;
pub use rom::RomBios;
pub use types::{
    scu, semaphore_bit, vector, ClockMode, Handler, PeripheralStatus, PriorityEntry, PriorityTable,
    SemaphoreId, SemaphoreState, VectorId, PERIPHERAL_CHECK_ARG, POWER_ON_CLEAR_BASE,
    POWER_ON_CLEAR_LEN, PRIORITY_TABLE_LEN, SEMAPHORE_COUNT, STANDARD_PRIORITY_WORDS,
    SYSTEM_VECTORS, USER_VECTORS,
};

/// BOOT ROM capability
///
/// Every method maps to exactly one firmware access. Implementations must
/// preserve the firmware's atomicity: `test_and_set_semaphore` and
/// `change_interrupt_mask` are indivisible with respect to interrupt
/// delivery and to each other.
///
/// No method validates its arguments. Out-of-range ids, malformed tables
/// and a non-zero presence argument are undefined at this level; the
/// service layer decides whether to check them.
pub trait BIOS: Send + Sync + 'static {
    // === Interrupt Vectors ===

    /// Install `handler` for user vector `id`. `None` clears the vector and
    /// the firmware falls back to its default.
    ///
    /// Takes effect for the very next occurrence of the interrupt.
    fn set_user_vector(&self, id: VectorId, handler: Option<Handler>);

    /// Handler currently installed for user vector `id`
    fn user_vector(&self, id: VectorId) -> Option<Handler>;

    /// Install `handler` for system vector `id`. `None` clears the vector.
    fn set_system_vector(&self, id: VectorId, handler: Option<Handler>);

    /// Handler currently installed for system vector `id`
    fn system_vector(&self, id: VectorId) -> Option<Handler>;

    // === Semaphores ===

    /// Atomically set semaphore `id` and return its previous state
    fn test_and_set_semaphore(&self, id: SemaphoreId) -> SemaphoreState;

    /// Clear semaphore `id` unconditionally
    fn clear_semaphore(&self, id: SemaphoreId);

    // === Interrupt Mask ===

    /// Replace the whole interrupt mask
    fn set_interrupt_mask(&self, mask: u32);

    /// Apply `(mask & and_mask) | or_mask` as one indivisible update
    fn change_interrupt_mask(&self, and_mask: u32, or_mask: u32);

    /// Current interrupt mask
    fn interrupt_mask(&self) -> u32;

    // === Clock Mode ===

    /// Switch the system clock. Video timing changes immediately.
    fn set_clock_mode(&self, mode: ClockMode);

    /// Current system clock
    fn clock_mode(&self) -> ClockMode;

    // === Priority Table ===

    /// Install a priority table. The firmware copies it before returning.
    fn set_priority_table(&self, table: &PriorityTable);

    // === Secondary Boot ===

    /// Enter the firmware's alternate-media boot sequence.
    ///
    /// On hardware this never returns. A simulated firmware returns
    /// `Ok(())` once it has recorded the hand-off, or
    /// `Err(BiosError::NotSupported)` when the medium is absent.
    fn execute_secondary_boot(&self) -> Result<(), BiosError>;

    // === Power-On-Clear Memory ===

    /// Copy `buf.len()` bytes of the power-on-clear region starting at `offset`
    fn read_power_on_clear(&self, offset: usize, buf: &mut [u8]);

    /// Size of the power-on-clear region in bytes
    fn power_on_clear_len(&self) -> usize {
        POWER_ON_CLEAR_LEN
    }

    // === Peripheral Presence ===

    /// Query the optional peripheral. `reserved` must be 0.
    ///
    /// Returns the firmware status code unchanged.
    fn check_peripheral(&self, reserved: i32) -> i32;

    // === Debug ===

    /// Write a debug message to the platform's console/log
    ///
    /// The message arrives unformatted. The ROM has no console, so the
    /// default drops it without formatting or allocating, which keeps the
    /// services callable from interrupt handlers.
    fn debug_write(&self, _args: fmt::Arguments<'_>) {
        // Default: no-op
    }
}

/// BIOS errors
///
/// The firmware has no error channel. These only come from the simulated
/// firmware and from the service layer's checked builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiosError {
    /// Operation not supported on this hardware configuration
    NotSupported,
    /// Vector id outside the documented range
    InvalidVector,
    /// Semaphore id outside 0..=31
    InvalidSemaphore,
    /// Argument the firmware contract forbids
    InvalidArgument,
    /// Read past the end of a firmware region
    OutOfBounds,
}

impl fmt::Display for BiosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NotSupported => "operation not supported on this configuration",
            Self::InvalidVector => "vector id outside the documented range",
            Self::InvalidSemaphore => "semaphore id outside 0..=31",
            Self::InvalidArgument => "argument forbidden by the firmware contract",
            Self::OutOfBounds => "read past the end of the region",
        };
        f.write_str(msg)
    }
}

/// A minimal test BIOS for unit testing
///
/// Every semaphore is always free, every vector empty, the mask and clock
/// read back as zero and the peripheral is absent. Writes are ignored.
#[derive(Default)]
pub struct TestBios;

impl TestBios {
    pub fn new() -> Self {
        Self
    }
}

impl BIOS for TestBios {
    fn set_user_vector(&self, _id: VectorId, _handler: Option<Handler>) {}

    fn user_vector(&self, _id: VectorId) -> Option<Handler> {
        None
    }

    fn set_system_vector(&self, _id: VectorId, _handler: Option<Handler>) {}

    fn system_vector(&self, _id: VectorId) -> Option<Handler> {
        None
    }

    fn test_and_set_semaphore(&self, _id: SemaphoreId) -> SemaphoreState {
        SemaphoreState::Free
    }

    fn clear_semaphore(&self, _id: SemaphoreId) {}

    fn set_interrupt_mask(&self, _mask: u32) {}

    fn change_interrupt_mask(&self, _and_mask: u32, _or_mask: u32) {}

    fn interrupt_mask(&self) -> u32 {
        0
    }

    fn set_clock_mode(&self, _mode: ClockMode) {}

    fn clock_mode(&self) -> ClockMode {
        ClockMode::Low
    }

    fn set_priority_table(&self, _table: &PriorityTable) {}

    fn execute_secondary_boot(&self) -> Result<(), BiosError> {
        Err(BiosError::NotSupported)
    }

    fn read_power_on_clear(&self, _offset: usize, buf: &mut [u8]) {
        buf.fill(0);
    }

    fn check_peripheral(&self, _reserved: i32) -> i32 {
        PeripheralStatus::RAW_ABSENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use core::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_stub_bios_defaults() {
        let bios = TestBios::new();
        assert_eq!(bios.power_on_clear_len(), POWER_ON_CLEAR_LEN);
        assert_eq!(bios.test_and_set_semaphore(0), SemaphoreState::Free);
        assert_eq!(bios.execute_secondary_boot(), Err(BiosError::NotSupported));

        let mut buf = [0xFFu8; 4];
        bios.read_power_on_clear(0, &mut buf);
        assert_eq!(buf, [0; 4]);

        // Default debug sink accepts anything
        bios.debug_write(format_args!("ignored {}", 1));
    }

    /// Display impl that records whether it was ever run
    struct Tripwire(AtomicBool);

    impl fmt::Display for Tripwire {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.store(true, Ordering::SeqCst);
            f.write_str("tripped")
        }
    }

    #[test]
    fn test_default_debug_write_never_formats() {
        let bios = TestBios::new();
        let tripwire = Tripwire(AtomicBool::new(false));

        bios.debug_write(format_args!("[sbios] {}", tripwire));
        assert!(!tripwire.0.load(Ordering::SeqCst));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            BiosError::InvalidSemaphore.to_string(),
            "semaphore id outside 0..=31"
        );
    }
}
