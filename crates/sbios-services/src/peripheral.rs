//! Peripheral presence check
//!
//! Asks the system library whether the optional peripheral is attached. The
//! firmware entry takes one argument that must be zero; its meaning beyond
//! 0 (absent) and 1 (present) is undocumented, so other codes pass through
//! as `PeripheralStatus::Other`.

use sbios_hal::{BiosError, PeripheralStatus, BIOS, PERIPHERAL_CHECK_ARG};

use crate::check::ensure;

pub struct PeripheralPresenceCheck<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> PeripheralPresenceCheck<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    /// Query with an explicit argument. Anything but 0 is outside the
    /// firmware contract.
    pub fn check(&self, reserved: i32) -> Result<PeripheralStatus, BiosError> {
        ensure(
            self.bios,
            reserved == PERIPHERAL_CHECK_ARG,
            BiosError::InvalidArgument,
            format_args!("presence check argument {}", reserved),
        )?;
        Ok(PeripheralStatus::from_raw(self.bios.check_peripheral(reserved)))
    }

    /// Query with the required zero argument
    pub fn status(&self) -> PeripheralStatus {
        PeripheralStatus::from_raw(self.bios.check_peripheral(PERIPHERAL_CHECK_ARG))
    }

    pub fn is_present(&self) -> bool {
        self.status() == PeripheralStatus::Present
    }
}
