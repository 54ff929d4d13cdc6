//! Firmware data types
//!
//! Pure data shared by the capability trait, the hardware implementation
//! and the simulator. Numeric encodings follow the ROM's own conventions and
//! must not be reinterpreted.

use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

pub use sbios_unsafe_primitives::CodeAddr as Handler;

// ============================================================================
// Interrupt vectors
// ============================================================================

/// Interrupt vector number
pub type VectorId = u32;

/// Documented user-vector numbers (SCU sources and the slave CPU block)
pub const USER_VECTORS: RangeInclusive<VectorId> = 0x40..=0x7F;

/// Documented system-vector numbers (the full CPU vector table)
pub const SYSTEM_VECTORS: RangeInclusive<VectorId> = 0x00..=0x7F;

/// SCU interrupt vector numbers in the user-vector space
pub mod vector {
    use super::VectorId;

    pub const VBLANK_IN: VectorId = 0x40;
    pub const VBLANK_OUT: VectorId = 0x41;
    pub const HBLANK_IN: VectorId = 0x42;
    pub const TIMER0: VectorId = 0x43;
    pub const TIMER1: VectorId = 0x44;
    pub const DSP_END: VectorId = 0x45;
    pub const SOUND_REQUEST: VectorId = 0x46;
    pub const SYSTEM_MANAGER: VectorId = 0x47;
    pub const PAD: VectorId = 0x48;
    pub const DMA2_END: VectorId = 0x49;
    pub const DMA1_END: VectorId = 0x4A;
    pub const DMA0_END: VectorId = 0x4B;
    pub const DMA_ILLEGAL: VectorId = 0x4C;
    pub const SPRITE_DRAW_END: VectorId = 0x4D;

    /// External (A-Bus) interrupt `n`, 0..=15
    pub const fn external(n: u32) -> VectorId {
        0x50 + (n & 0xF)
    }
}

// ============================================================================
// Semaphores
// ============================================================================

/// Semaphore number, 0..=31
pub type SemaphoreId = u32;

/// Number of semaphores in the bank
pub const SEMAPHORE_COUNT: u32 = 32;

/// Bit of semaphore `id` in the bank word, `None` past the last semaphore
pub const fn semaphore_bit(id: SemaphoreId) -> Option<u32> {
    if id < SEMAPHORE_COUNT {
        Some(1 << id)
    } else {
        None
    }
}

/// State of a semaphore *before* a test-and-set.
///
/// `Free` means the caller now holds it. `Held` means somebody else does.
#[must_use = "test-and-set may fail; branch on the previous state"]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemaphoreState {
    /// Was clear, caller acquired it
    Free,
    /// Was already set
    Held,
}

impl SemaphoreState {
    /// Decode the firmware's return value (0 = was clear).
    pub fn from_raw(raw: u32) -> Self {
        if raw == 0 {
            Self::Free
        } else {
            Self::Held
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Free => 0,
            Self::Held => 1,
        }
    }

    pub fn acquired(self) -> bool {
        self == Self::Free
    }
}

// ============================================================================
// Interrupt mask
// ============================================================================

/// SCU interrupt mask bits.
///
/// Firmware polarity: a set bit masks (disables) the source, a clear bit
/// enables it. Bit `n` corresponds to priority-table entry `n`.
pub mod scu {
    pub const VBLANK_IN: u32 = 1 << 0;
    pub const VBLANK_OUT: u32 = 1 << 1;
    pub const HBLANK_IN: u32 = 1 << 2;
    pub const TIMER0: u32 = 1 << 3;
    pub const TIMER1: u32 = 1 << 4;
    pub const DSP_END: u32 = 1 << 5;
    pub const SOUND_REQUEST: u32 = 1 << 6;
    pub const SYSTEM_MANAGER: u32 = 1 << 7;
    pub const PAD: u32 = 1 << 8;
    pub const DMA2_END: u32 = 1 << 9;
    pub const DMA1_END: u32 = 1 << 10;
    pub const DMA0_END: u32 = 1 << 11;
    pub const DMA_ILLEGAL: u32 = 1 << 12;
    pub const SPRITE_DRAW_END: u32 = 1 << 13;
    pub const ABUS: u32 = 1 << 15;

    /// Every source masked
    pub const ALL: u32 = 0xFFFF_FFFF;
    /// Every source enabled
    pub const NONE: u32 = 0x0000_0000;

    /// Mask bit of external interrupt `n`, 0..=15
    pub const fn external(n: u32) -> u32 {
        1 << (16 + (n & 0xF))
    }

    /// Mask after a change-mask call: `(current & and_mask) | or_mask`
    pub const fn apply_change(current: u32, and_mask: u32, or_mask: u32) -> u32 {
        (current & and_mask) | or_mask
    }
}

// ============================================================================
// Clock mode
// ============================================================================

/// System clock selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ClockMode {
    /// 26 MHz: 320/640 pixel horizontal resolution
    Low = 0,
    /// 28 MHz: 352/704 pixel horizontal resolution
    High = 1,
}

impl ClockMode {
    /// Decode the clock-mode register. Any non-zero value selects `High`.
    pub fn from_raw(raw: u32) -> Self {
        if raw == 0 {
            Self::Low
        } else {
            Self::High
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }

    /// Dot clock in Hz (NTSC)
    pub fn pixel_clock_hz(self) -> u32 {
        match self {
            Self::Low => 26_874_100,
            Self::High => 28_636_360,
        }
    }

    /// (normal, hi-res) active horizontal resolution
    pub fn horizontal_resolutions(self) -> (u16, u16) {
        match self {
            Self::Low => (320, 640),
            Self::High => (352, 704),
        }
    }
}

// ============================================================================
// Priority table
// ============================================================================

/// Number of entries in the SCU priority table
pub const PRIORITY_TABLE_LEN: usize = 32;

/// One priority word.
///
/// The upper halfword is the status-register image loaded while the source
/// is serviced, so the CPU interrupt level (0..=15) sits in word bits
/// 20..=23. The lower halfword is the SCU mask applied meanwhile. The
/// firmware copies the word verbatim; no other bit is interpreted here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PriorityEntry(pub u32);

impl PriorityEntry {
    pub const fn new(level: u8, scu_mask: u16) -> Self {
        Self((((level & 0xF) as u32) << 20) | scu_mask as u32)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn level(self) -> u8 {
        ((self.0 >> 20) & 0xF) as u8
    }

    pub const fn scu_mask(self) -> u16 {
        self.0 as u16
    }
}

/// The ROM's own table, as published with the change-priority service
pub const STANDARD_PRIORITY_WORDS: [u32; PRIORITY_TABLE_LEN] = [
    0x00F0_FFFF, 0x00E0_FFFE, 0x00D0_FFFC, 0x00C0_FFF8, // VBI VBO HBI T0
    0x00B0_FFF0, 0x00A0_FFE0, 0x0090_FFC0, 0x0080_FF80, // T1 DSP SND SMPC
    0x0080_FF80, 0x0070_FE00, 0x0070_FE00, 0x0070_FE00, // PAD DMA2 DMA1 DMA0
    0x0070_FE00, 0x0070_FE00, 0x0070_FE00, 0x0070_FE00, // ILL SPR - ABUS
    0x0070_FE00, 0x0070_FE00, 0x0070_FE00, 0x0070_FE00, // external 0..=3
    0x0070_FE00, 0x0070_FE00, 0x0070_FE00, 0x0070_FE00, // external 4..=7
    0x0070_FE00, 0x0070_FE00, 0x0070_FE00, 0x0070_FE00, // external 8..=11
    0x0070_FE00, 0x0070_FE00, 0x0070_FE00, 0x0070_FE00, // external 12..=15
];

/// The full 32-entry table handed to the firmware.
///
/// Entry `n` belongs to the source with mask bit `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PriorityTable(pub [PriorityEntry; PRIORITY_TABLE_LEN]);

impl PriorityTable {
    /// Power-on table: V-Blank in highest at level 15, each source masking
    /// itself and everything below it.
    pub const DEFAULT: Self = {
        let mut entries = [PriorityEntry(0); PRIORITY_TABLE_LEN];
        let mut i = 0;
        while i < PRIORITY_TABLE_LEN {
            entries[i] = PriorityEntry(STANDARD_PRIORITY_WORDS[i]);
            i += 1;
        }
        Self(entries)
    };

    pub const fn new(entries: [PriorityEntry; PRIORITY_TABLE_LEN]) -> Self {
        Self(entries)
    }

    pub fn from_raw(words: [u32; PRIORITY_TABLE_LEN]) -> Self {
        Self(words.map(PriorityEntry))
    }

    pub fn entries(&self) -> &[PriorityEntry; PRIORITY_TABLE_LEN] {
        &self.0
    }

    pub fn get(&self, source: usize) -> Option<PriorityEntry> {
        self.0.get(source).copied()
    }

    pub fn set(&mut self, source: usize, entry: PriorityEntry) {
        if let Some(slot) = self.0.get_mut(source) {
            *slot = entry;
        }
    }

    /// Pointer to the first word, as the firmware expects it.
    pub fn as_ptr(&self) -> *const u32 {
        self.0.as_ptr() as *const u32
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// Power-on-clear memory
// ============================================================================

/// Start of the power-on-clear region
pub const POWER_ON_CLEAR_BASE: usize = 0x0600_0210;

/// Size of the power-on-clear region in bytes
pub const POWER_ON_CLEAR_LEN: usize = 0x5C;

// ============================================================================
// Peripheral presence
// ============================================================================

/// The only argument the presence check accepts
pub const PERIPHERAL_CHECK_ARG: i32 = 0;

/// Result of the peripheral presence check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeripheralStatus {
    /// No peripheral (raw 0)
    Absent,
    /// Peripheral present and its check complete (raw 1)
    Present,
    /// Any other firmware code, preserved verbatim
    Other(i32),
}

impl PeripheralStatus {
    pub const RAW_ABSENT: i32 = 0;
    pub const RAW_PRESENT: i32 = 1;

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::RAW_ABSENT => Self::Absent,
            Self::RAW_PRESENT => Self::Present,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Absent => Self::RAW_ABSENT,
            Self::Present => Self::RAW_PRESENT,
            Self::Other(code) => code,
        }
    }
}

// ============================================================================
// Kani Proofs
// ============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: valid ids map to exactly one bit, and no two ids share it
    #[kani::proof]
    fn semaphore_bits_are_distinct() {
        let a: SemaphoreId = kani::any();
        let b: SemaphoreId = kani::any();

        match (semaphore_bit(a), semaphore_bit(b)) {
            (Some(x), Some(y)) => {
                kani::assert(x.count_ones() == 1, "one bit per semaphore");
                kani::assert((x == y) == (a == b), "distinct ids, distinct bits");
            }
            (None, _) => kani::assert(a >= SEMAPHORE_COUNT, "only missing ids rejected"),
            (_, None) => kani::assert(b >= SEMAPHORE_COUNT, "only missing ids rejected"),
        }
    }

    /// Proof: masking or unmasking a set of sources leaves every other bit alone
    #[kani::proof]
    fn change_touches_only_selected_bits() {
        let current: u32 = kani::any();
        let bits: u32 = kani::any();

        let masked = scu::apply_change(current, !0, bits);
        let unmasked = scu::apply_change(current, !bits, 0);

        kani::assert(masked & !bits == current & !bits, "mask keeps other bits");
        kani::assert(masked & bits == bits, "mask sets selected bits");
        kani::assert(unmasked & !bits == current & !bits, "unmask keeps other bits");
        kani::assert(unmasked & bits == 0, "unmask clears selected bits");
    }
}
