//! Hardware BIOS implementation
//!
//! Every method is exactly one access through the [`BiosLayout`]: one slot
//! call or one register read. Nothing is validated, decomposed or cached,
//! so the firmware's own atomicity guarantees (test-and-set, mask change)
//! hold unchanged.

use sbios_unsafe_primitives::ServiceSlot;

use crate::layout::BiosLayout;
use crate::types::{ClockMode, Handler, PriorityTable, SemaphoreId, SemaphoreState, VectorId};
use crate::{BiosError, BIOS};

/// The BOOT ROM itself
#[derive(Debug)]
pub struct RomBios {
    layout: BiosLayout,
}

impl RomBios {
    /// Use the published address map.
    ///
    /// # Safety
    ///
    /// Must run on hardware where the BOOT ROM is resident and initialized,
    /// with [`BiosLayout::STANDARD`] matching its revision.
    pub const unsafe fn new() -> Self {
        Self::with_layout(BiosLayout::STANDARD)
    }

    /// Use a custom address map.
    ///
    /// # Safety
    ///
    /// Every slot in `layout` must hold an entry point with the documented
    /// call shape, and every register and region must be readable memory.
    pub const unsafe fn with_layout(layout: BiosLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &BiosLayout {
        &self.layout
    }
}

/// Invoke `slot` with call shape `$shape`.
///
/// SAFETY (for every use): `RomBios` can only be built through an unsafe
/// constructor whose contract is that each slot holds the documented shape.
macro_rules! rom_call {
    ($slot:expr, $shape:ty, |$f:ident| $body:expr) => {{
        let slot: ServiceSlot = $slot;
        unsafe { slot.call(|$f: $shape| $body) }
    }};
}

impl BIOS for RomBios {
    fn set_user_vector(&self, id: VectorId, handler: Option<Handler>) {
        rom_call!(self.layout.set_user_vector, extern "C" fn(u32, Option<Handler>), |f| f(id, handler))
    }

    fn user_vector(&self, id: VectorId) -> Option<Handler> {
        rom_call!(self.layout.get_user_vector, extern "C" fn(u32) -> Option<Handler>, |f| f(id))
    }

    fn set_system_vector(&self, id: VectorId, handler: Option<Handler>) {
        rom_call!(self.layout.set_system_vector, extern "C" fn(u32, Option<Handler>), |f| f(id, handler))
    }

    fn system_vector(&self, id: VectorId) -> Option<Handler> {
        rom_call!(self.layout.get_system_vector, extern "C" fn(u32) -> Option<Handler>, |f| f(id))
    }

    fn test_and_set_semaphore(&self, id: SemaphoreId) -> SemaphoreState {
        let raw = rom_call!(self.layout.test_and_set_semaphore, extern "C" fn(u32) -> u32, |f| f(id));
        SemaphoreState::from_raw(raw)
    }

    fn clear_semaphore(&self, id: SemaphoreId) {
        rom_call!(self.layout.clear_semaphore, extern "C" fn(u32), |f| f(id))
    }

    fn set_interrupt_mask(&self, mask: u32) {
        rom_call!(self.layout.set_interrupt_mask, extern "C" fn(u32), |f| f(mask))
    }

    fn change_interrupt_mask(&self, and_mask: u32, or_mask: u32) {
        rom_call!(self.layout.change_interrupt_mask, extern "C" fn(u32, u32), |f| f(and_mask, or_mask))
    }

    fn interrupt_mask(&self) -> u32 {
        // SAFETY: see `with_layout`
        unsafe { self.layout.interrupt_mask.read() }
    }

    fn set_clock_mode(&self, mode: ClockMode) {
        rom_call!(self.layout.set_clock_mode, extern "C" fn(u32), |f| f(mode.raw()))
    }

    fn clock_mode(&self) -> ClockMode {
        // SAFETY: see `with_layout`
        ClockMode::from_raw(unsafe { self.layout.clock_mode.read() })
    }

    fn set_priority_table(&self, table: &PriorityTable) {
        let words = table.as_ptr();
        rom_call!(self.layout.set_priority_table, extern "C" fn(*const u32), |f| f(words))
    }

    fn execute_secondary_boot(&self) -> Result<(), BiosError> {
        // SAFETY: see `with_layout`. Control never comes back.
        let entry: extern "C" fn() -> ! = unsafe { self.layout.execute_secondary_boot.entry() };
        entry()
    }

    fn read_power_on_clear(&self, offset: usize, buf: &mut [u8]) {
        // SAFETY: see `with_layout`; bounds are the caller's responsibility
        unsafe { self.layout.power_on_clear.read_into(offset, buf) }
    }

    fn power_on_clear_len(&self) -> usize {
        self.layout.power_on_clear.len()
    }

    fn check_peripheral(&self, reserved: i32) -> i32 {
        rom_call!(self.layout.check_peripheral, extern "C" fn(i32) -> i32, |f| f(reserved))
    }
}

// ============================================================================
// Tests (ROM backed by host memory)
// ============================================================================
