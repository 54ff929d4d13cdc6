//! Simulated BOOT ROM
//!
//! This provides a simulated implementation of the BIOS trait that can be
//! used for emulation and for unit testing code above the firmware without
//! console hardware. It reproduces the observable return values and side
//! effects of the ROM for the supported services.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "loom"))]
mod loom_tests;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use sbios_hal::{
    scu, semaphore_bit, BiosError, ClockMode, Handler, PeripheralStatus, PriorityTable,
    SemaphoreId, SemaphoreState, VectorId, BIOS, POWER_ON_CLEAR_LEN, PRIORITY_TABLE_LEN,
    SYSTEM_VECTORS, USER_VECTORS,
};
use serde::{Deserialize, Serialize};
use spin::Mutex;

/// Mask word the simulated ROM starts with: every source masked
pub const INITIAL_INTERRUPT_MASK: u32 = 0xFFFF_FFFF;

/// Sources still deliverable while `scu::ABUS` is masked
const EXTERNAL_SOURCES_GATED: u32 = 0x0000_FFFF;

/// Simulated BOOT ROM
///
/// Semaphores, mask and clock are atomics, vector tables and the priority
/// table sit behind spin locks, so the simulator keeps the ROM's atomicity
/// guarantees even when driven from several host threads.
pub struct SimBios {
    /// User-vector table (documented range only)
    user_vectors: Mutex<BTreeMap<VectorId, Handler>>,
    /// System-vector table (documented range only)
    system_vectors: Mutex<BTreeMap<VectorId, Handler>>,
    /// One bit per semaphore, set = held
    semaphores: AtomicU32,
    /// Interrupt mask, set bit = source masked
    interrupt_mask: AtomicU32,
    /// Raw clock-mode register
    clock_mode: AtomicU32,
    /// Installed priority table
    priority_table: Mutex<PriorityTable>,
    /// Power-on-clear contents, fixed at construction
    power_on_clear: Vec<u8>,
    /// Code returned by the presence check
    peripheral_status: AtomicI32,
    /// Whether the alternate boot medium is fitted
    secondary_medium: AtomicBool,
    /// Number of accepted secondary-boot hand-offs
    boot_requests: AtomicU32,
    /// Captured debug messages
    debug_log: Mutex<Vec<String>>,
}

/// One interrupt the simulated ROM would deliver, in delivery order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    /// Mask bit / priority-table index of the source
    pub source: usize,
    /// Level from the installed priority table
    pub level: u8,
    /// User vector the source is delivered through
    pub vector: VectorId,
    /// Handler installed on that vector
    pub handler: Option<Handler>,
}

/// Serializable copy of the simulated firmware state.
///
/// Handler addresses are only meaningful inside the process image that
/// took the snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiosSnapshot {
    pub user_vectors: Vec<(VectorId, usize)>,
    pub system_vectors: Vec<(VectorId, usize)>,
    pub semaphores: u32,
    pub interrupt_mask: u32,
    pub clock_mode: ClockMode,
    pub priority_table: PriorityTable,
    pub peripheral_status: i32,
    pub secondary_medium: bool,
}

impl SimBios {
    /// Create a simulated ROM in its power-on state
    pub fn new() -> Self {
        Self {
            user_vectors: Mutex::new(BTreeMap::new()),
            system_vectors: Mutex::new(BTreeMap::new()),
            semaphores: AtomicU32::new(0),
            interrupt_mask: AtomicU32::new(INITIAL_INTERRUPT_MASK),
            clock_mode: AtomicU32::new(ClockMode::Low.raw()),
            priority_table: Mutex::new(PriorityTable::DEFAULT),
            power_on_clear: vec![0; POWER_ON_CLEAR_LEN],
            peripheral_status: AtomicI32::new(PeripheralStatus::RAW_ABSENT),
            secondary_medium: AtomicBool::new(false),
            boot_requests: AtomicU32::new(0),
            debug_log: Mutex::new(Vec::new()),
        }
    }

    /// Attach the optional peripheral reporting `status`
    pub fn with_peripheral(self, status: PeripheralStatus) -> Self {
        self.peripheral_status.store(status.raw(), Ordering::SeqCst);
        self
    }

    /// Fit the alternate boot medium
    pub fn with_secondary_medium(self) -> Self {
        self.secondary_medium.store(true, Ordering::SeqCst);
        self
    }

    /// Preload the power-on-clear region. Longer input is truncated, shorter
    /// input leaves the rest zero.
    pub fn with_power_on_clear(mut self, bytes: &[u8]) -> Self {
        let n = bytes.len().min(POWER_ON_CLEAR_LEN);
        self.power_on_clear[..n].copy_from_slice(&bytes[..n]);
        self
    }

    // === Simulation controls ===

    /// Change what the presence check reports
    pub fn set_peripheral_status(&self, status: PeripheralStatus) {
        self.peripheral_status.store(status.raw(), Ordering::SeqCst);
    }

    /// Fit or remove the alternate boot medium
    pub fn set_secondary_medium(&self, fitted: bool) {
        self.secondary_medium.store(fitted, Ordering::SeqCst);
    }

    /// Number of accepted secondary-boot hand-offs
    pub fn boot_requests(&self) -> u32 {
        self.boot_requests.load(Ordering::SeqCst)
    }

    /// Raw semaphore word, bit `n` set = semaphore `n` held
    pub fn semaphore_bits(&self) -> u32 {
        self.semaphores.load(Ordering::SeqCst)
    }

    /// Copy of the installed priority table
    pub fn priority_table(&self) -> PriorityTable {
        *self.priority_table.lock()
    }

    /// User vector a mask bit is delivered through, if any.
    ///
    /// Bit 14 is unused and bit 15 (`scu::ABUS`) is the gate over all
    /// external sources rather than a source of its own, so neither has a
    /// vector.
    pub fn source_vector(source: usize) -> Option<VectorId> {
        match source {
            0..=13 => Some(0x40 + source as VectorId),
            16..=31 => Some(0x50 + (source - 16) as VectorId),
            _ => None,
        }
    }

    /// Order in which the ROM would deliver the `pending` sources.
    ///
    /// Masked sources and sources at level 0 are never delivered, and
    /// masking `scu::ABUS` holds back every external source. The rest are
    /// ordered by their installed level, highest first; equal levels go to
    /// the lower source number first.
    pub fn dispatch_order(&self, pending: u32) -> Vec<Dispatch> {
        let mask = self.interrupt_mask.load(Ordering::SeqCst);
        let mut deliverable = pending & !mask;
        if mask & scu::ABUS != 0 {
            deliverable &= EXTERNAL_SOURCES_GATED;
        }
        let table = self.priority_table();
        let users = self.user_vectors.lock();

        let mut order: Vec<Dispatch> = (0..PRIORITY_TABLE_LEN)
            .filter(|&source| deliverable & (1 << source) != 0)
            .filter_map(|source| {
                let vector = Self::source_vector(source)?;
                let level = table.get(source)?.level();
                (level > 0).then(|| Dispatch {
                    source,
                    level,
                    vector,
                    handler: users.get(&vector).copied(),
                })
            })
            .collect();

        order.sort_by(|a, b| b.level.cmp(&a.level).then(a.source.cmp(&b.source)));
        order
    }

    // === Snapshots ===

    /// Capture the current firmware state
    pub fn snapshot(&self) -> BiosSnapshot {
        let flatten = |table: &BTreeMap<VectorId, Handler>| -> Vec<(VectorId, usize)> {
            table.iter().map(|(id, h)| (*id, h.addr())).collect()
        };
        BiosSnapshot {
            user_vectors: flatten(&self.user_vectors.lock()),
            system_vectors: flatten(&self.system_vectors.lock()),
            semaphores: self.semaphores.load(Ordering::SeqCst),
            interrupt_mask: self.interrupt_mask.load(Ordering::SeqCst),
            clock_mode: ClockMode::from_raw(self.clock_mode.load(Ordering::SeqCst)),
            priority_table: self.priority_table(),
            peripheral_status: self.peripheral_status.load(Ordering::SeqCst),
            secondary_medium: self.secondary_medium.load(Ordering::SeqCst),
        }
    }

    /// Replace the firmware state with `snapshot`
    pub fn restore(&self, snapshot: &BiosSnapshot) {
        let expand = |entries: &[(VectorId, usize)]| {
            entries
                .iter()
                .filter_map(|(id, addr)| Handler::new(*addr).map(|h| (*id, h)))
                .collect::<BTreeMap<_, _>>()
        };
        *self.user_vectors.lock() = expand(&snapshot.user_vectors);
        *self.system_vectors.lock() = expand(&snapshot.system_vectors);
        self.semaphores.store(snapshot.semaphores, Ordering::SeqCst);
        self.interrupt_mask.store(snapshot.interrupt_mask, Ordering::SeqCst);
        self.clock_mode.store(snapshot.clock_mode.raw(), Ordering::SeqCst);
        *self.priority_table.lock() = snapshot.priority_table;
        self.peripheral_status.store(snapshot.peripheral_status, Ordering::SeqCst);
        self.secondary_medium.store(snapshot.secondary_medium, Ordering::SeqCst);
        self.log(String::from("[sim-bios] Restored snapshot"));
    }

    // === Debug log ===

    /// Get all captured debug messages
    pub fn debug_log(&self) -> Vec<String> {
        self.debug_log.lock().clone()
    }

    /// Clear the debug log
    pub fn clear_debug_log(&self) {
        self.debug_log.lock().clear();
    }

    /// Check if a specific message was logged
    pub fn has_log_containing(&self, substr: &str) -> bool {
        self.debug_log.lock().iter().any(|msg| msg.contains(substr))
    }

    /// Get the number of debug messages
    pub fn debug_log_count(&self) -> usize {
        self.debug_log.lock().len()
    }

    fn log(&self, msg: String) {
        self.debug_log.lock().push(msg);
    }

    fn store_vector(
        &self,
        table: &Mutex<BTreeMap<VectorId, Handler>>,
        space: &str,
        valid: bool,
        id: VectorId,
        handler: Option<Handler>,
    ) {
        if !valid {
            // The ROM ignores vectors outside its table
            self.log(alloc::format!("[sim-bios] Ignored {} vector {:#x}", space, id));
            return;
        }
        let mut table = table.lock();
        match handler {
            Some(h) => {
                table.insert(id, h);
            }
            None => {
                table.remove(&id);
            }
        }
    }
}

impl Default for SimBios {
    fn default() -> Self {
        Self::new()
    }
}

impl BIOS for SimBios {
    fn set_user_vector(&self, id: VectorId, handler: Option<Handler>) {
        self.store_vector(&self.user_vectors, "user", USER_VECTORS.contains(&id), id, handler);
    }

    fn user_vector(&self, id: VectorId) -> Option<Handler> {
        self.user_vectors.lock().get(&id).copied()
    }

    fn set_system_vector(&self, id: VectorId, handler: Option<Handler>) {
        self.store_vector(&self.system_vectors, "system", SYSTEM_VECTORS.contains(&id), id, handler);
    }

    fn system_vector(&self, id: VectorId) -> Option<Handler> {
        self.system_vectors.lock().get(&id).copied()
    }

    fn test_and_set_semaphore(&self, id: SemaphoreId) -> SemaphoreState {
        let Some(bit) = semaphore_bit(id) else {
            // Never grant a semaphore that does not exist
            self.log(alloc::format!("[sim-bios] Test-and-set on missing semaphore {}", id));
            return SemaphoreState::Held;
        };
        let prior = self.semaphores.fetch_or(bit, Ordering::SeqCst);
        SemaphoreState::from_raw(prior & bit)
    }

    fn clear_semaphore(&self, id: SemaphoreId) {
        let Some(bit) = semaphore_bit(id) else {
            self.log(alloc::format!("[sim-bios] Clear on missing semaphore {}", id));
            return;
        };
        self.semaphores.fetch_and(!bit, Ordering::SeqCst);
    }

    fn set_interrupt_mask(&self, mask: u32) {
        self.interrupt_mask.store(mask, Ordering::SeqCst);
    }

    fn change_interrupt_mask(&self, and_mask: u32, or_mask: u32) {
        // One read-modify-write: no observer sees the AND without the OR
        let mut current = self.interrupt_mask.load(Ordering::SeqCst);
        loop {
            let next = scu::apply_change(current, and_mask, or_mask);
            match self.interrupt_mask.compare_exchange_weak(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    fn interrupt_mask(&self) -> u32 {
        self.interrupt_mask.load(Ordering::SeqCst)
    }

    fn set_clock_mode(&self, mode: ClockMode) {
        let prior = self.clock_mode.swap(mode.raw(), Ordering::SeqCst);
        if prior != mode.raw() {
            self.log(alloc::format!("[sim-bios] Clock mode {:?} -> {:?}", ClockMode::from_raw(prior), mode));
        }
    }

    fn clock_mode(&self) -> ClockMode {
        ClockMode::from_raw(self.clock_mode.load(Ordering::SeqCst))
    }

    fn set_priority_table(&self, table: &PriorityTable) {
        *self.priority_table.lock() = *table;
    }

    fn execute_secondary_boot(&self) -> Result<(), BiosError> {
        if !self.secondary_medium.load(Ordering::SeqCst) {
            self.log(String::from("[sim-bios] Secondary boot without medium"));
            return Err(BiosError::NotSupported);
        }
        let n = self.boot_requests.fetch_add(1, Ordering::SeqCst) + 1;
        self.log(alloc::format!("[sim-bios] Secondary boot hand-off #{}", n));
        Ok(())
    }

    fn read_power_on_clear(&self, offset: usize, buf: &mut [u8]) {
        // Bytes past the region read as zero
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = offset
                .checked_add(i)
                .and_then(|at| self.power_on_clear.get(at))
                .copied()
                .unwrap_or(0);
        }
    }

    fn check_peripheral(&self, reserved: i32) -> i32 {
        if reserved != 0 {
            self.log(alloc::format!("[sim-bios] Presence check with argument {}", reserved));
        }
        self.peripheral_status.load(Ordering::SeqCst)
    }

    fn debug_write(&self, args: fmt::Arguments<'_>) {
        self.log(alloc::fmt::format(args));
    }
}
