//! Power-on-clear memory
//!
//! A small firmware-reserved RAM region that is zeroed at cold power-on but
//! survives a soft reset. It is exposed read-only; the firmware owns its
//! layout and contents.

use sbios_hal::{BiosError, BIOS};

use crate::check::ensure;

/// Read-only view of the power-on-clear region
pub struct PowerOnClearMemory<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> PowerOnClearMemory<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    /// Region size in bytes
    pub fn len(&self) -> usize {
        self.bios.power_on_clear_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` from the region starting at `offset`
    pub fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), BiosError> {
        let end = offset.checked_add(buf.len());
        ensure(
            self.bios,
            end.is_some_and(|end| end <= self.len()),
            BiosError::OutOfBounds,
            format_args!("power-on-clear read {:#x}+{}", offset, buf.len()),
        )?;
        self.bios.read_power_on_clear(offset, buf);
        Ok(())
    }

    pub fn read_byte(&self, offset: usize) -> Result<u8, BiosError> {
        let mut buf = [0u8; 1];
        self.read(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Big-endian halfword at `offset`, the console's native byte order
    pub fn read_u16_be(&self, offset: usize) -> Result<u16, BiosError> {
        let mut buf = [0u8; 2];
        self.read(offset, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Big-endian word at `offset`
    pub fn read_u32_be(&self, offset: usize) -> Result<u32, BiosError> {
        let mut buf = [0u8; 4];
        self.read(offset, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }
}
