//! Misuse checks for checked builds

use core::fmt;
use sbios_hal::{BiosError, BIOS};

/// Whether this build rejects misuse instead of passing it to the firmware
pub const CHECKED: bool = cfg!(any(debug_assertions, feature = "checked"));

/// Fail with `err` when `ok` is false in a checked build.
///
/// The rejection is written to the firmware debug log.
pub(crate) fn ensure<B: BIOS>(
    bios: &B,
    ok: bool,
    err: BiosError,
    what: fmt::Arguments<'_>,
) -> Result<(), BiosError> {
    if CHECKED && !ok {
        bios.debug_write(format_args!("[sbios] Rejected {}: {}", what, err));
        return Err(err);
    }
    Ok(())
}
