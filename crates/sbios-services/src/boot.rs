//! Secondary boot trigger
//!
//! Hands the machine to the firmware's alternate-media boot sequence. On the
//! console control never comes back: nothing after `execute` runs, no
//! destructor included. Callers quiesce their own state first.

use sbios_hal::{BiosError, BIOS};

pub struct SecondaryBootTrigger<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> SecondaryBootTrigger<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    /// Enter secondary boot.
    ///
    /// Only returns under a simulated firmware: `Ok(())` once the hand-off
    /// was recorded, `Err(BiosError::NotSupported)` with no medium fitted.
    pub fn execute(&self) -> Result<(), BiosError> {
        self.bios.debug_write(format_args!("[sbios] Entering secondary boot"));
        self.bios.execute_secondary_boot()
    }
}
