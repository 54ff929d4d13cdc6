//! Service integration tests
//!
//! Every component driven against one simulated ROM, checking the
//! firmware-level properties an application relies on.

use sbios_hal::TestBios;
use sbios_hal_mock::SimBios;
use sbios_services::{
    scu, vector, BiosError, BiosTrait, ClockMode, ClockModeController, Handler,
    InterruptMaskController, InterruptVectorRegistry, PeripheralPresenceCheck, PeripheralStatus,
    PowerOnClearMemory, PriorityEntry, PriorityTable, PriorityTableController,
    SecondaryBootTrigger, SemaphoreBank, SemaphoreState,
};

extern "C" fn on_vblank_in() {}
extern "C" fn on_timer0() {}
extern "C" fn on_pad() {}

// ============================================================================
// Semaphores
// ============================================================================

#[test]
fn test_every_semaphore_cycles() {
    let bios = SimBios::new();
    let sems = SemaphoreBank::new(&bios);

    for id in 0..32 {
        assert_eq!(sems.test_and_set(id).unwrap(), SemaphoreState::Free, "sem {}", id);
        assert_eq!(sems.test_and_set(id).unwrap(), SemaphoreState::Held, "sem {}", id);
    }
    assert_eq!(bios.semaphore_bits(), 0xFFFF_FFFF);

    for id in 0..32 {
        sems.clear(id).unwrap();
        assert_eq!(sems.test_and_set(id).unwrap(), SemaphoreState::Free, "sem {}", id);
        sems.clear(id).unwrap();
    }
    assert_eq!(bios.semaphore_bits(), 0);
}

#[test]
fn test_semaphores_are_independent() {
    let bios = SimBios::new();
    let sems = SemaphoreBank::new(&bios);

    let _guard = sems.try_lock(3).unwrap().expect("semaphore 3 should be free");
    assert_eq!(sems.test_and_set(4).unwrap(), SemaphoreState::Free);
    sems.clear(4).unwrap();
    assert_eq!(sems.test_and_set(3).unwrap(), SemaphoreState::Held);
}

#[test]
fn test_semaphores_shared_across_threads() {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    let bios = Arc::new(SimBios::new());
    let winners = Arc::new(AtomicU32::new(0));

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let bios = Arc::clone(&bios);
            let winners = Arc::clone(&winners);
            std::thread::spawn(move || {
                let sems = SemaphoreBank::new(&*bios);
                if sems.test_and_set(17).unwrap().acquired() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Interrupt Mask
// ============================================================================

#[test]
fn test_change_mask_identity_patterns() {
    let bios = SimBios::new();
    let mask = InterruptMaskController::new(&bios);

    for initial in [0x0000_0000, 0xFFFF_FFFF, 0x0000_BFFF, 0xA5A5_5A5A] {
        mask.set_mask(initial);

        // AND all-ones / OR zero leaves the mask alone
        mask.change_mask(0xFFFF_FFFF, 0);
        assert_eq!(mask.mask(), initial);

        // AND zero / OR pattern replaces it
        mask.change_mask(0, 0x1234_5678);
        assert_eq!(mask.mask(), 0x1234_5678);
    }
}

#[test]
fn test_set_mask_extremes() {
    let bios = SimBios::new();
    let mask = InterruptMaskController::new(&bios);

    mask.set_mask(scu::NONE);
    assert!(mask.is_enabled(scu::ALL));
    mask.set_mask(scu::ALL);
    assert_eq!(mask.mask(), 0xFFFF_FFFF);
    assert!(!mask.is_enabled(scu::external(15)));
}

// ============================================================================
// Vectors
// ============================================================================

#[test]
fn test_vector_spaces_do_not_alias() {
    let bios = SimBios::new();
    let vectors = InterruptVectorRegistry::new(&bios);
    let user = Handler::from_fn(on_vblank_in);
    let system = Handler::from_fn(on_timer0);

    for id in 0x40..=0x7F {
        vectors.set_user_vector(id, Some(user)).unwrap();
        vectors.set_system_vector(id, Some(system)).unwrap();
    }
    for id in 0x40..=0x7F {
        assert_eq!(vectors.user_vector(id).unwrap(), Some(user));
        assert_eq!(vectors.system_vector(id).unwrap(), Some(system));
    }

    vectors.set_system_vector(vector::PAD, None).unwrap();
    assert_eq!(vectors.user_vector(vector::PAD).unwrap(), Some(user));
}

#[test]
fn test_rejected_vector_leaves_firmware_untouched() {
    let bios = SimBios::new();
    let vectors = InterruptVectorRegistry::new(&bios);

    let result = vectors.set_user_vector(0x10, Some(Handler::from_fn(on_pad)));
    if sbios_services::CHECKED {
        assert_eq!(result, Err(BiosError::InvalidVector));
        assert_eq!(bios.user_vector(0x10), None);
    }
}

// ============================================================================
// Clock
// ============================================================================

#[test]
fn test_clock_toggle_alternates() {
    let bios = SimBios::new();
    let clock = ClockModeController::new(&bios);

    clock.set_mode(ClockMode::Low);
    assert_eq!(clock.toggle(), ClockMode::High);
    assert_eq!(clock.mode().pixel_clock_hz(), 28_636_360);
    assert_eq!(clock.toggle(), ClockMode::Low);
    assert_eq!(clock.mode().pixel_clock_hz(), 26_874_100);
}

// ============================================================================
// Priority Table
// ============================================================================

#[test]
fn test_installed_priorities_drive_delivery() {
    let bios = SimBios::new();
    let vectors = InterruptVectorRegistry::new(&bios);
    let mask = InterruptMaskController::new(&bios);
    let prio = PriorityTableController::new(&bios);

    let vblank = Handler::from_fn(on_vblank_in);
    let timer = Handler::from_fn(on_timer0);
    vectors.set_user_vector(vector::VBLANK_IN, Some(vblank)).unwrap();
    vectors.set_user_vector(vector::TIMER0, Some(timer)).unwrap();

    let mut table = PriorityTable::DEFAULT;
    table.set(0, PriorityEntry::new(3, 0));
    table.set(3, PriorityEntry::new(12, 0));
    table.set(8, PriorityEntry::new(0, 0));
    prio.set_priority_table(&table);

    mask.set_mask(scu::ALL);
    mask.unmask_sources(scu::VBLANK_IN | scu::TIMER0 | scu::PAD);

    let pending = scu::VBLANK_IN | scu::TIMER0 | scu::PAD | scu::TIMER1;
    let order = bios.dispatch_order(pending);

    // TIMER1 is masked, PAD sits at level 0
    assert_eq!(order.len(), 2);
    assert_eq!(order[0].vector, vector::TIMER0);
    assert_eq!(order[0].handler, Some(timer));
    assert_eq!(order[1].vector, vector::VBLANK_IN);
    assert_eq!(order[1].handler, Some(vblank));

    // Swapping levels swaps delivery
    table.set(0, PriorityEntry::new(14, 0));
    prio.set_priority_table(&table);
    let order = bios.dispatch_order(pending);
    assert_eq!(order[0].vector, vector::VBLANK_IN);
}

#[test]
fn test_published_priority_words_deliver_every_level() {
    let bios = SimBios::new();
    let prio = PriorityTableController::new(&bios);
    let mask = InterruptMaskController::new(&bios);

    prio.set_priority_table(&PriorityTable::from_raw([
        0x00f0ffff, 0x00e0fffe, 0x00d0fffc, 0x00c0fff8,
        0x00b0fff0, 0x00a0ffe0, 0x0090ffc0, 0x0080ff80,
        0x0080ff80, 0x0070fe00, 0x0070fe00, 0x0070fe00,
        0x0070fe00, 0x0070fe00, 0x0070fe00, 0x0070fe00,
        0x0070fe00, 0x0070fe00, 0x0070fe00, 0x0070fe00,
        0x0070fe00, 0x0070fe00, 0x0070fe00, 0x0070fe00,
        0x0070fe00, 0x0070fe00, 0x0070fe00, 0x0070fe00,
        0x0070fe00, 0x0070fe00, 0x0070fe00, 0x0070fe00,
    ]));
    mask.set_mask(scu::NONE);

    let installed = bios.priority_table();
    let levels: Vec<u8> = installed.entries().iter().take(10).map(|e| e.level()).collect();
    assert_eq!(levels, vec![15, 14, 13, 12, 11, 10, 9, 8, 8, 7]);
    let masks: Vec<u16> = installed.entries().iter().take(3).map(|e| e.scu_mask()).collect();
    assert_eq!(masks, vec![0xFFFF, 0xFFFE, 0xFFFC]);

    let pending = scu::VBLANK_IN | scu::VBLANK_OUT | scu::DMA2_END | scu::SPRITE_DRAW_END;
    let order: Vec<(u32, u8)> =
        bios.dispatch_order(pending).iter().map(|d| (d.vector, d.level)).collect();
    assert_eq!(
        order,
        vec![
            (vector::VBLANK_IN, 15),
            (vector::VBLANK_OUT, 14),
            (vector::DMA2_END, 7),
            (vector::SPRITE_DRAW_END, 7),
        ]
    );
}

#[test]
fn test_masking_under_guard_blocks_delivery() {
    let bios = SimBios::new();
    let mask = InterruptMaskController::new(&bios);
    PriorityTableController::new(&bios).set_levels(&[7; 32]);
    mask.set_mask(scu::NONE);

    {
        let _guard = mask.mask_guard(scu::VBLANK_IN);
        assert!(bios.dispatch_order(scu::VBLANK_IN).is_empty());
    }
    assert_eq!(bios.dispatch_order(scu::VBLANK_IN).len(), 1);
}

// ============================================================================
// Boot / Power-On-Clear / Peripheral
// ============================================================================

#[test]
fn test_secondary_boot_hand_off() {
    let bios = SimBios::new().with_secondary_medium();
    SecondaryBootTrigger::new(&bios).execute().unwrap();
    assert_eq!(bios.boot_requests(), 1);
}

#[test]
fn test_power_on_clear_survives_snapshot_restore() {
    let bios = SimBios::new().with_power_on_clear(&[0xCA, 0xFE]);
    let poc = PowerOnClearMemory::new(&bios);
    assert_eq!(poc.read_u16_be(0).unwrap(), 0xCAFE);

    bios.set_interrupt_mask(0x0F);
    let snap = bios.snapshot();
    bios.set_interrupt_mask(0xF0);
    bios.restore(&snap);

    assert_eq!(bios.interrupt_mask(), 0x0F);
    assert_eq!(poc.read_u16_be(0).unwrap(), 0xCAFE);
}

#[test]
fn test_peripheral_absent_then_present() {
    let bios = SimBios::new();
    let check = PeripheralPresenceCheck::new(&bios);

    assert_eq!(check.check(0).unwrap(), PeripheralStatus::Absent);
    bios.set_peripheral_status(PeripheralStatus::Present);
    assert_eq!(check.check(0).unwrap(), PeripheralStatus::Present);
    assert!(check.is_present());
}

// ============================================================================
// Stub Firmware
// ============================================================================

#[test]
fn test_services_run_on_stub_firmware() {
    let bios = TestBios::new();

    let vectors = InterruptVectorRegistry::new(&bios);
    vectors.set_user_vector(vector::VBLANK_IN, Some(Handler::from_fn(on_vblank_in))).unwrap();
    // The stub keeps nothing
    assert_eq!(vectors.user_vector(vector::VBLANK_IN).unwrap(), None);

    let check = PeripheralPresenceCheck::new(&bios);
    assert_eq!(check.check(0).unwrap(), PeripheralStatus::Absent);
    assert!(!check.is_present());

    let sems = SemaphoreBank::new(&bios);
    assert_eq!(sems.test_and_set(0).unwrap(), SemaphoreState::Free);
    assert_eq!(SecondaryBootTrigger::new(&bios).execute(), Err(BiosError::NotSupported));

    if sbios_services::CHECKED {
        assert_eq!(check.check(7), Err(BiosError::InvalidArgument));
    }
}
