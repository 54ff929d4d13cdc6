//! Interrupt vector registry
//!
//! Two independent tables: user vectors (`0x40..=0x7F`, SCU sources and the
//! slave CPU block) and system vectors (`0x00..=0x7F`, the CPU table).
//! Writing one never touches the other.
//!
//! A change is live immediately: the next occurrence of the interrupt,
//! including one preempting this call at a higher level, uses the new
//! handler. Handlers stay owned by the caller; the registry only stores the
//! address, and a handler read back may be replaced by other code at any
//! time.

use sbios_hal::{BiosError, Handler, VectorId, BIOS, SYSTEM_VECTORS, USER_VECTORS};

use crate::check::ensure;

/// Installs and queries interrupt handlers
pub struct InterruptVectorRegistry<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> InterruptVectorRegistry<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    /// Install `handler` on user vector `id`; `None` restores the firmware default
    pub fn set_user_vector(&self, id: VectorId, handler: Option<Handler>) -> Result<(), BiosError> {
        self.check_user(id)?;
        self.bios.set_user_vector(id, handler);
        self.bios.debug_write(format_args!(
            "[sbios] User vector {:#x} -> {:?}",
            id,
            handler
        ));
        Ok(())
    }

    /// Handler currently on user vector `id`
    pub fn user_vector(&self, id: VectorId) -> Result<Option<Handler>, BiosError> {
        self.check_user(id)?;
        Ok(self.bios.user_vector(id))
    }

    /// Install `handler` on system vector `id`; `None` restores the firmware default
    pub fn set_system_vector(&self, id: VectorId, handler: Option<Handler>) -> Result<(), BiosError> {
        self.check_system(id)?;
        self.bios.set_system_vector(id, handler);
        self.bios.debug_write(format_args!(
            "[sbios] System vector {:#x} -> {:?}",
            id,
            handler
        ));
        Ok(())
    }

    /// Handler currently on system vector `id`
    pub fn system_vector(&self, id: VectorId) -> Result<Option<Handler>, BiosError> {
        self.check_system(id)?;
        Ok(self.bios.system_vector(id))
    }

    /// Install `handler` on user vector `id` and return the one it replaced.
    ///
    /// Two firmware calls; an interrupt context changing the same vector in
    /// between is not detected.
    pub fn replace_user_vector(
        &self,
        id: VectorId,
        handler: Option<Handler>,
    ) -> Result<Option<Handler>, BiosError> {
        let previous = self.user_vector(id)?;
        self.set_user_vector(id, handler)?;
        Ok(previous)
    }

    fn check_user(&self, id: VectorId) -> Result<(), BiosError> {
        ensure(
            self.bios,
            USER_VECTORS.contains(&id),
            BiosError::InvalidVector,
            format_args!("user vector {:#x}", id),
        )
    }

    fn check_system(&self, id: VectorId) -> Result<(), BiosError> {
        ensure(
            self.bios,
            SYSTEM_VECTORS.contains(&id),
            BiosError::InvalidVector,
            format_args!("system vector {:#x}", id),
        )
    }
}
