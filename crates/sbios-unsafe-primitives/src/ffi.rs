//! External collaborators
//!
//! `SYS_CheckTrack` and `SYS_Exit` are supplied by the system library the
//! application links against, not by the BOOT ROM address map. This layer
//! only declares them and wraps them safely.
//!
//! With the `rom` feature the real symbols are linked. Host builds get inert
//! stand-ins so the rest of the workspace can be tested without them.

// ============================================================================
// FFI Declarations (unsafe)
// ============================================================================

#[cfg(feature = "rom")]
#[allow(non_snake_case)]
extern "C" {
    /// Check that the disc track `track` is readable.
    ///
    /// # Safety
    /// - Must only be called after the system library has initialized the CD block
    fn SYS_CheckTrack(track: i32);

    /// Leave the application with `code`.
    ///
    /// Declared without a return type by the library, like any C `void`
    /// function. Any state not flushed before the call is lost.
    fn SYS_Exit(code: i32);
}

// ============================================================================
// Safe Wrappers
// ============================================================================

/// Check a disc track (safe wrapper).
///
/// The library reports nothing back; a bad track is handled inside it.
#[cfg(feature = "rom")]
pub fn check_track(track: i32) {
    // SAFETY: the argument is a plain integer; the library validates it
    unsafe { SYS_CheckTrack(track) }
}

#[cfg(not(feature = "rom"))]
pub fn check_track(_track: i32) {
    // Mock for host builds
}

/// Exit the application (safe wrapper).
#[cfg(feature = "rom")]
pub fn exit(code: i32) -> ! {
    // SAFETY: plain integer argument
    unsafe { SYS_Exit(code) };
    // The library does not return from exit; park if it ever does
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(not(feature = "rom"))]
pub fn exit(code: i32) -> ! {
    panic!("SYS_Exit({}) without the system library linked", code)
}

// ============================================================================
// Tests
// ============================================================================
