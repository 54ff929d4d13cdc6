//! Priority table controller
//!
//! The firmware copies the table before the call returns, so the caller's
//! table can be changed or dropped right after. Entry contents are not
//! validated.

use sbios_hal::{PriorityEntry, PriorityTable, BIOS, PRIORITY_TABLE_LEN};

/// Installs SCU interrupt priority tables
pub struct PriorityTableController<'a, B: BIOS> {
    bios: &'a B,
}

impl<'a, B: BIOS> PriorityTableController<'a, B> {
    pub fn new(bios: &'a B) -> Self {
        Self { bios }
    }

    pub fn set_priority_table(&self, table: &PriorityTable) {
        self.bios.set_priority_table(table);
        self.bios.debug_write(format_args!("[sbios] Priority table installed"));
    }

    /// Install a table built from bare levels, with no auxiliary mask bits
    pub fn set_levels(&self, levels: &[u8; PRIORITY_TABLE_LEN]) {
        let table = PriorityTable::new(levels.map(|level| PriorityEntry::new(level, 0)));
        self.set_priority_table(&table);
    }
}
