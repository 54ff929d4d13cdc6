//! Interrupt mask controller
//!
//! Bit polarity is the firmware's: a set bit masks (disables) the source.
//! Every update is exactly one firmware call, so the firmware's guarantee
//! that no interrupt is delivered under a half-applied mask holds.

use sbios_hal::BIOS;

/// Reads and updates the SCU interrupt mask
pub struct InterruptMaskController<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> InterruptMaskController<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    /// Replace the whole mask
    pub fn set_mask(&self, mask: u32) {
        self.bios.set_interrupt_mask(mask);
    }

    /// `mask = (mask & and_mask) | or_mask`, as one indivisible update
    pub fn change_mask(&self, and_mask: u32, or_mask: u32) {
        self.bios.change_interrupt_mask(and_mask, or_mask);
    }

    /// Current mask
    pub fn mask(&self) -> u32 {
        self.bios.interrupt_mask()
    }

    /// Mask (disable) the sources in `bits`, leaving the others alone
    pub fn mask_sources(&self, bits: u32) {
        self.change_mask(!0, bits);
    }

    /// Unmask (enable) the sources in `bits`, leaving the others alone
    pub fn unmask_sources(&self, bits: u32) {
        self.change_mask(!bits, 0);
    }

    /// Whether every source in `bits` is currently enabled
    pub fn is_enabled(&self, bits: u32) -> bool {
        self.mask() & bits == 0
    }

    /// Mask `bits` until the guard drops, then put those bits back as they
    /// were. Bits outside `bits` are never touched.
    ///
    /// The prior state is read before masking; a handler that changes the
    /// same bits in that window has its change undone on drop.
    pub fn mask_guard(&self, bits: u32) -> MaskGuard<'a, B> {
        let prior = self.mask() & bits;
        self.mask_sources(bits);
        MaskGuard {
            bios: self.bios,
            bits,
            prior,
        }
    }
}

/// Sources masked for a scope
#[must_use = "the sources are restored as soon as the guard is dropped"]
pub struct MaskGuard<'a, B: BIOS> {
    bios: &'a B,
    bits: u32,
    prior: u32,
}

impl<B: BIOS> MaskGuard<'_, B> {
    /// The sources this guard masked
    pub fn bits(&self) -> u32 {
        self.bits
    }
}

impl<B: BIOS> Drop for MaskGuard<'_, B> {
    fn drop(&mut self) {
        self.bios.change_interrupt_mask(!self.bits, self.prior);
    }
}
