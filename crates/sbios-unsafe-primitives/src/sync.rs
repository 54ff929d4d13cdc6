//! Send/Sync code address wrapper
//!
//! Interrupt handlers are plain code addresses handed to the firmware. A raw
//! pointer is neither `Send` nor `Sync`, but a code address is immutable
//! data: the layer never dereferences it, it only stores it in or loads it
//! from the firmware's vector tables.
//!
//! # Safety Invariants
//!
//! 1. The wrapped pointer is never null (`Option<CodeAddr>` uses the null
//!    niche, so it has exactly the layout of a C function pointer).
//! 2. The layer never calls or dereferences the address; the firmware does,
//!    when the interrupt fires.

use core::fmt;
use core::ptr::NonNull;

/// A non-null code address that is Send + Sync.
///
/// `Option<CodeAddr>` is FFI-compatible with a nullable `void *` and is how
/// "no handler" crosses the firmware boundary.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeAddr {
    ptr: NonNull<()>,
}

impl CodeAddr {
    /// Address of an `extern "C"` function.
    pub fn from_fn(f: extern "C" fn()) -> Self {
        // SAFETY: function pointers are never null
        Self {
            ptr: unsafe { NonNull::new_unchecked(f as *mut ()) },
        }
    }

    /// Wrap a raw code address, returning None if null.
    pub fn new(addr: usize) -> Option<Self> {
        NonNull::new(addr as *mut ()).map(|ptr| Self { ptr })
    }

    /// Wrap a raw pointer, returning None if null.
    pub fn from_raw(ptr: *const ()) -> Option<Self> {
        NonNull::new(ptr as *mut ()).map(|ptr| Self { ptr })
    }

    /// The numeric address.
    pub fn addr(self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// The raw pointer.
    pub fn as_ptr(self) -> *const () {
        self.ptr.as_ptr()
    }
}

// SAFETY: the address is immutable and never dereferenced by this layer
unsafe impl Send for CodeAddr {}

// SAFETY: same invariants as Send
unsafe impl Sync for CodeAddr {}

impl fmt::Debug for CodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeAddr({:#x})", self.addr())
    }
}

// ============================================================================
// Tests
// ============================================================================
