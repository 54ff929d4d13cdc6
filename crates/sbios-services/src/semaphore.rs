//! Semaphore bank
//!
//! 32 binary semaphores owned by the firmware. There is no shadow copy: every
//! query is a firmware call, so the answer is always the live state shared
//! with interrupt handlers.
//!
//! The bank enforces no ownership. Clearing a semaphore somebody else holds
//! is allowed by the mechanism and is the caller's bug.

use sbios_hal::{BiosError, SemaphoreId, SemaphoreState, BIOS, SEMAPHORE_COUNT};

use crate::check::ensure;

/// Test-and-set / clear access to the firmware semaphores
pub struct SemaphoreBank<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> SemaphoreBank<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    /// Atomically set semaphore `id` and return its previous state.
    ///
    /// `Free` means the caller now holds it.
    pub fn test_and_set(&self, id: SemaphoreId) -> Result<SemaphoreState, BiosError> {
        self.check(id)?;
        Ok(self.bios.test_and_set_semaphore(id))
    }

    /// Clear semaphore `id`. Clearing a clear semaphore does nothing.
    pub fn clear(&self, id: SemaphoreId) -> Result<(), BiosError> {
        self.check(id)?;
        self.bios.clear_semaphore(id);
        Ok(())
    }

    /// Try to take semaphore `id`, releasing it when the guard drops.
    ///
    /// Returns `Ok(None)` when it is already held.
    pub fn try_lock(&self, id: SemaphoreId) -> Result<Option<SemaphoreGuard<'a, B>>, BiosError> {
        Ok(match self.test_and_set(id)? {
            SemaphoreState::Free => Some(SemaphoreGuard { bios: self.bios, id }),
            SemaphoreState::Held => None,
        })
    }

    fn check(&self, id: SemaphoreId) -> Result<(), BiosError> {
        ensure(
            self.bios,
            id < SEMAPHORE_COUNT,
            BiosError::InvalidSemaphore,
            format_args!("semaphore {}", id),
        )
    }
}

/// A held semaphore, cleared on drop
#[must_use = "the semaphore is released as soon as the guard is dropped"]
pub struct SemaphoreGuard<'a, B: BIOS> {
    bios: &'a B,
    id: SemaphoreId,
}

impl<B: BIOS> SemaphoreGuard<'_, B> {
    pub fn id(&self) -> SemaphoreId {
        self.id
    }
}

impl<B: BIOS> Drop for SemaphoreGuard<'_, B> {
    fn drop(&mut self) {
        self.bios.clear_semaphore(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbios_hal_mock::SimBios;

    #[test]
    fn test_test_and_set_then_held() {
        let bios = SimBios::new();
        let sems = SemaphoreBank::new(&bios);

        assert_eq!(sems.test_and_set(0).unwrap(), SemaphoreState::Free);
        assert_eq!(sems.test_and_set(0).unwrap(), SemaphoreState::Held);
        sems.clear(0).unwrap();
        assert_eq!(sems.test_and_set(0).unwrap(), SemaphoreState::Free);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let bios = SimBios::new();
        let sems = SemaphoreBank::new(&bios);

        sems.clear(9).unwrap();
        sems.clear(9).unwrap();
        assert_eq!(bios.semaphore_bits(), 0);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let bios = SimBios::new();
        let sems = SemaphoreBank::new(&bios);

        {
            let guard = sems.try_lock(12).unwrap().expect("semaphore should be free");
            assert_eq!(guard.id(), 12);
            assert!(sems.try_lock(12).unwrap().is_none());
        }
        assert_eq!(bios.semaphore_bits(), 0);
        assert!(sems.try_lock(12).unwrap().is_some());
    }

    #[cfg(any(debug_assertions, feature = "checked"))]
    #[test]
    fn test_missing_semaphore_rejected() {
        let bios = SimBios::new();
        let sems = SemaphoreBank::new(&bios);

        assert_eq!(sems.test_and_set(32), Err(BiosError::InvalidSemaphore));
        assert_eq!(sems.clear(32), Err(BiosError::InvalidSemaphore));
        assert!(sems.try_lock(99).is_err());
    }
}
