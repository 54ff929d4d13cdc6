//! Jump slots, volatile registers and ROM regions
//!
//! The BOOT ROM publishes its services at fixed absolute addresses. Each
//! address is one of:
//!
//! - a **jump slot**: the address names a word that holds the entry point of
//!   the service. A call is two hops, constant address -> slot contents -> code.
//! - a **register**: the address names a scalar owned by the firmware, read
//!   or written directly.
//! - a **region**: a byte range populated by the firmware before the
//!   application starts.
//!
//! # Safety Invariants
//!
//! 1. **Volatile only**: Slot contents, registers and region bytes are loaded
//!    with `read_volatile` so the optimizer can neither cache nor elide them.
//! 2. **Fenced calls**: A compiler fence brackets every slot call so memory
//!    effects of the firmware are never reordered across it.
//! 3. **No validation**: A wrong address or a firmware revision mismatch is
//!    undefined behavior at the hardware boundary, not a reportable error.

use core::fmt;
use core::marker::PhantomData;
use core::mem::{size_of, transmute_copy};
use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};

// ============================================================================
// Jump slots
// ============================================================================

/// A firmware entry point reached through a fixed-address jump slot.
///
/// The layer never allocates or frees a slot. It only addresses a word the
/// firmware already owns.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ServiceSlot(usize);

impl ServiceSlot {
    /// Name the slot at `addr`.
    pub const fn at(addr: usize) -> Self {
        Self(addr)
    }

    /// Absolute address of the slot.
    pub const fn addr(self) -> usize {
        self.0
    }

    /// Load the entry point stored in the slot as call shape `F`.
    ///
    /// # Safety
    ///
    /// - The slot address must be readable and pointer-aligned.
    /// - The slot must hold the entry point of code whose ABI is exactly `F`.
    /// - `F` must be a bare `extern "C" fn` pointer type.
    #[inline(always)]
    pub unsafe fn entry<F: Copy>(self) -> F {
        debug_assert_eq!(
            size_of::<F>(),
            size_of::<usize>(),
            "call shape must be a bare function pointer"
        );
        compiler_fence(Ordering::SeqCst);
        let code = ptr::read_volatile(self.0 as *const usize);
        debug_assert!(code != 0, "empty jump slot at {:#x}", self.0);
        transmute_copy::<usize, F>(&code)
    }

    /// Load the entry point and call it through `invoke`.
    ///
    /// ```ignore
    /// let prior = SLOT.call(|f: extern "C" fn(u32) -> u32| f(id));
    /// ```
    ///
    /// # Safety
    ///
    /// Same requirements as [`ServiceSlot::entry`]. Arguments passed by
    /// `invoke` must satisfy the firmware's contract for the service.
    #[inline(always)]
    pub unsafe fn call<F: Copy, R>(self, invoke: impl FnOnce(F) -> R) -> R {
        let entry = self.entry::<F>();
        let result = invoke(entry);
        compiler_fence(Ordering::SeqCst);
        result
    }
}

impl fmt::Debug for ServiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceSlot({:#x})", self.0)
    }
}

// ============================================================================
// Registers
// ============================================================================

/// A firmware-owned scalar at a fixed address.
#[repr(transparent)]
pub struct Register<T> {
    addr: usize,
    _ty: PhantomData<fn() -> T>,
}

impl<T: Copy> Register<T> {
    /// Name the register at `addr`.
    pub const fn at(addr: usize) -> Self {
        Self {
            addr,
            _ty: PhantomData,
        }
    }

    /// Absolute address of the register.
    pub const fn addr(&self) -> usize {
        self.addr
    }

    /// Volatile read.
    ///
    /// # Safety
    ///
    /// The address must be readable and aligned for `T`.
    #[inline(always)]
    pub unsafe fn read(&self) -> T {
        ptr::read_volatile(self.addr as *const T)
    }

    /// Volatile write.
    ///
    /// # Safety
    ///
    /// The address must be writable and aligned for `T`, and the firmware
    /// must accept direct writes to it.
    #[inline(always)]
    pub unsafe fn write(&self, value: T) {
        ptr::write_volatile(self.addr as *mut T, value)
    }
}

impl<T> Clone for Register<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Register<T> {}

impl<T> PartialEq for Register<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for Register<T> {}

impl<T> fmt::Debug for Register<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Register({:#x})", self.addr)
    }
}

// ============================================================================
// Regions
// ============================================================================

/// A read-only byte range written by the firmware before application start.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RomRegion {
    base: usize,
    len: usize,
}

impl RomRegion {
    /// Name the region `[base, base + len)`.
    pub const fn new(base: usize, len: usize) -> Self {
        Self { base, len }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `count` bytes starting at `offset` lie inside the region.
    pub const fn contains(&self, offset: usize, count: usize) -> bool {
        match offset.checked_add(count) {
            Some(end) => end <= self.len,
            None => false,
        }
    }

    /// Volatile read of one byte.
    ///
    /// # Safety
    ///
    /// `base + offset` must be readable memory. No bounds check is made.
    #[inline(always)]
    pub unsafe fn read_byte(&self, offset: usize) -> u8 {
        ptr::read_volatile((self.base + offset) as *const u8)
    }

    /// Volatile byte-wise copy of `buf.len()` bytes starting at `offset`.
    ///
    /// # Safety
    ///
    /// The whole range `base + offset .. base + offset + buf.len()` must be
    /// readable memory. No bounds check is made.
    pub unsafe fn read_into(&self, offset: usize, buf: &mut [u8]) {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(offset + i);
        }
    }
}

impl fmt::Debug for RomRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RomRegion({:#x}..{:#x})", self.base, self.base.wrapping_add(self.len))
    }
}

// ============================================================================
// Kani Proofs
// ============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: `contains` never accepts a range that ends past the region,
    /// including when `offset + count` overflows.
    #[kani::proof]
    fn contains_is_sound() {
        let base: usize = kani::any();
        let len: usize = kani::any();
        let offset: usize = kani::any();
        let count: usize = kani::any();

        let region = RomRegion::new(base, len);
        if region.contains(offset, count) {
            kani::assert(offset <= len, "offset must be inside region");
            kani::assert(count <= len - offset, "range must end inside region");
        }
    }

    /// Proof: every single in-bounds byte is accepted
    #[kani::proof]
    fn contains_accepts_each_byte() {
        let len: usize = kani::any();
        let offset: usize = kani::any();
        kani::assume(offset < len);

        let region = RomRegion::new(0x0600_0210, len);
        kani::assert(region.contains(offset, 1), "in-bounds byte must be accepted");
    }
}

// ============================================================================
// Tests
// ============================================================================
