//! BOOT ROM address catalog
//!
//! | Address   | Kind     | Service |
//! |-----------|----------|---------|
//! | 0x6000210 | region   | power-on-clear memory |
//! | 0x600026C | slot     | execute secondary boot |
//! | 0x6000274 | slot     | peripheral presence check |
//! | 0x6000280 | slot     | set priority table |
//! | 0x6000300 | slot     | set user vector |
//! | 0x6000304 | slot     | get user vector |
//! | 0x6000310 | slot     | set system vector |
//! | 0x6000314 | slot     | get system vector |
//! | 0x6000320 | slot     | set clock mode |
//! | 0x6000324 | register | clock mode |
//! | 0x6000330 | slot     | semaphore test-and-set |
//! | 0x6000334 | slot     | semaphore clear |
//! | 0x6000340 | slot     | set interrupt mask |
//! | 0x6000344 | slot     | change interrupt mask |
//! | 0x6000348 | register | interrupt mask |

use sbios_unsafe_primitives::{Register, RomRegion, ServiceSlot};

use crate::types::{POWER_ON_CLEAR_BASE, POWER_ON_CLEAR_LEN};

/// Raw addresses of the standard ROM
pub mod addr {
    pub const POWER_ON_CLEAR: usize = super::POWER_ON_CLEAR_BASE;
    pub const EXECUTE_SECONDARY_BOOT: usize = 0x0600_026C;
    pub const CHECK_PERIPHERAL: usize = 0x0600_0274;
    pub const SET_PRIORITY_TABLE: usize = 0x0600_0280;
    pub const SET_USER_VECTOR: usize = 0x0600_0300;
    pub const GET_USER_VECTOR: usize = 0x0600_0304;
    pub const SET_SYSTEM_VECTOR: usize = 0x0600_0310;
    pub const GET_SYSTEM_VECTOR: usize = 0x0600_0314;
    pub const SET_CLOCK_MODE: usize = 0x0600_0320;
    pub const CLOCK_MODE: usize = 0x0600_0324;
    pub const TEST_AND_SET_SEMAPHORE: usize = 0x0600_0330;
    pub const CLEAR_SEMAPHORE: usize = 0x0600_0334;
    pub const SET_INTERRUPT_MASK: usize = 0x0600_0340;
    pub const CHANGE_INTERRUPT_MASK: usize = 0x0600_0344;
    pub const INTERRUPT_MASK: usize = 0x0600_0348;
}

/// Where every service of one firmware revision lives.
///
/// [`BiosLayout::STANDARD`] is the published map. Other layouts exist for
/// firmware revisions that moved a slot and for host-side harnesses that
/// back the slots with ordinary memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiosLayout {
    pub set_user_vector: ServiceSlot,
    pub get_user_vector: ServiceSlot,
    pub set_system_vector: ServiceSlot,
    pub get_system_vector: ServiceSlot,
    pub test_and_set_semaphore: ServiceSlot,
    pub clear_semaphore: ServiceSlot,
    pub set_interrupt_mask: ServiceSlot,
    pub change_interrupt_mask: ServiceSlot,
    pub interrupt_mask: Register<u32>,
    pub set_clock_mode: ServiceSlot,
    pub clock_mode: Register<u32>,
    pub set_priority_table: ServiceSlot,
    pub execute_secondary_boot: ServiceSlot,
    pub power_on_clear: RomRegion,
    pub check_peripheral: ServiceSlot,
}

impl BiosLayout {
    /// The published address map
    pub const STANDARD: Self = Self {
        set_user_vector: ServiceSlot::at(addr::SET_USER_VECTOR),
        get_user_vector: ServiceSlot::at(addr::GET_USER_VECTOR),
        set_system_vector: ServiceSlot::at(addr::SET_SYSTEM_VECTOR),
        get_system_vector: ServiceSlot::at(addr::GET_SYSTEM_VECTOR),
        test_and_set_semaphore: ServiceSlot::at(addr::TEST_AND_SET_SEMAPHORE),
        clear_semaphore: ServiceSlot::at(addr::CLEAR_SEMAPHORE),
        set_interrupt_mask: ServiceSlot::at(addr::SET_INTERRUPT_MASK),
        change_interrupt_mask: ServiceSlot::at(addr::CHANGE_INTERRUPT_MASK),
        interrupt_mask: Register::at(addr::INTERRUPT_MASK),
        set_clock_mode: ServiceSlot::at(addr::SET_CLOCK_MODE),
        clock_mode: Register::at(addr::CLOCK_MODE),
        set_priority_table: ServiceSlot::at(addr::SET_PRIORITY_TABLE),
        execute_secondary_boot: ServiceSlot::at(addr::EXECUTE_SECONDARY_BOOT),
        power_on_clear: RomRegion::new(addr::POWER_ON_CLEAR, POWER_ON_CLEAR_LEN),
        check_peripheral: ServiceSlot::at(addr::CHECK_PERIPHERAL),
    };
}

impl Default for BiosLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}
