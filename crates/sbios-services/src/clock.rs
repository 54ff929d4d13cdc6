//! Clock mode controller
//!
//! Switching the clock reconfigures the video timing at once. No V-blank
//! synchronization happens here: callers that need a clean switch wait for
//! a blanking interval themselves before calling `set_mode`.

use sbios_hal::{ClockMode, BIOS};

/// Switches and queries the system clock
pub struct ClockModeController<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> ClockModeController<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    pub fn set_mode(&self, mode: ClockMode) {
        self.bios.set_clock_mode(mode);
        let (normal, hires) = mode.horizontal_resolutions();
        self.bios.debug_write(format_args!(
            "[sbios] Clock mode {:?} ({}/{} px)",
            mode,
            normal,
            hires
        ));
    }

    pub fn mode(&self) -> ClockMode {
        self.bios.clock_mode()
    }

    /// Switch to the other mode and return it
    pub fn toggle(&self) -> ClockMode {
        let next = self.mode().toggled();
        self.set_mode(next);
        next
    }
}
