//! BOOT ROM Unsafe Primitives - Consolidated Unsafe Code TCB
//!
//! This crate contains ALL raw memory access of the BOOT ROM service layer,
//! consolidated into a single auditable location. Every other crate in the
//! workspace goes through the narrow types exported here and never touches
//! an absolute address itself.
//!
//! # Design Principles
//!
//! 1. **Address-exact**: Every access is volatile, never cached or elided
//! 2. **No validation**: The ROM cannot be asked whether a slot is valid
//! 3. **Auditable**: Small, focused modules for security review
//! 4. **Verified**: Kani proofs where applicable
//!
//! # Module Organization
//!
//! - `slot` - Jump slots, volatile registers and the read-only ROM region
//! - `sync` - Send/Sync code address wrapper used for interrupt handlers
//! - `ffi` - External collaborators (`SYS_CheckTrack`, `SYS_Exit`)
//!
//! # Verification
//!
//! 1. **Kani proofs** (`cargo kani`): Region bounds arithmetic
//! 2. **Unit tests**: Slots and registers backed by host memory

#![no_std]

pub mod ffi;
pub mod slot;
pub mod sync;

// Re-export commonly used items
pub use slot::{Register, RomRegion, ServiceSlot};
pub use sync::CodeAddr;
