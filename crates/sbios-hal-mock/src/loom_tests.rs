//! Loom tests for the simulator's atomic firmware state
//!
//! Loom explores every interleaving of the concurrent operations. The models
//! below use the exact read-modify-write sequences `SimBios` uses for the
//! semaphore bank and the interrupt mask, with the main program and an
//! interrupt context played by two loom threads.
//!
//! # Running Loom Tests
//!
//! ```bash
//! cargo test --package sbios-hal-mock --features loom -- --test-threads=1 loom
//! ```

#[cfg(all(test, feature = "loom"))]
mod tests {
    use loom::sync::atomic::{AtomicU32, Ordering};
    use loom::sync::Arc;
    use loom::thread;

    /// Semaphore word as `SimBios` keeps it
    struct LoomSemaphores {
        bits: AtomicU32,
    }

    impl LoomSemaphores {
        fn new() -> Self {
            Self {
                bits: AtomicU32::new(0),
            }
        }

        /// Returns true when the caller acquired the semaphore
        fn test_and_set(&self, id: u32) -> bool {
            let bit = 1 << id;
            self.bits.fetch_or(bit, Ordering::SeqCst) & bit == 0
        }

        fn clear(&self, id: u32) {
            self.bits.fetch_and(!(1 << id), Ordering::SeqCst);
        }
    }

    /// Interrupt mask as `SimBios` keeps it
    struct LoomMask {
        word: AtomicU32,
    }

    impl LoomMask {
        fn new(initial: u32) -> Self {
            Self {
                word: AtomicU32::new(initial),
            }
        }

        fn change(&self, and_mask: u32, or_mask: u32) {
            let mut current = self.word.load(Ordering::SeqCst);
            loop {
                let next = sbios_hal::scu::apply_change(current, and_mask, or_mask);
                match self
                    .word
                    .compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::SeqCst)
                {
                    Ok(_) => break,
                    Err(actual) => current = actual,
                }
            }
        }

        fn get(&self) -> u32 {
            self.word.load(Ordering::SeqCst)
        }
    }

    /// Test: Two contenders never both see "was free"
    #[test]
    fn loom_test_and_set_single_winner() {
        loom::model(|| {
            let sems = Arc::new(LoomSemaphores::new());

            let s1 = sems.clone();
            let s2 = sems.clone();

            let t1 = thread::spawn(move || s1.test_and_set(3));
            let t2 = thread::spawn(move || s2.test_and_set(3));

            let won1 = t1.join().unwrap();
            let won2 = t2.join().unwrap();

            assert!(won1 ^ won2, "exactly one contender must acquire");
            assert_eq!(sems.bits.load(Ordering::SeqCst), 1 << 3);
        });
    }

    /// Test: Different semaphores never interfere
    #[test]
    fn loom_independent_semaphores() {
        loom::model(|| {
            let sems = Arc::new(LoomSemaphores::new());

            let s1 = sems.clone();
            let s2 = sems.clone();

            let t1 = thread::spawn(move || {
                let won = s1.test_and_set(0);
                s1.clear(0);
                won
            });
            let t2 = thread::spawn(move || s2.test_and_set(31));

            assert!(t1.join().unwrap());
            assert!(t2.join().unwrap());
            assert_eq!(sems.bits.load(Ordering::SeqCst), 1 << 31);
        });
    }

    /// Test: Concurrent mask changes are never lost
    #[test]
    fn loom_change_mask_no_lost_update() {
        loom::model(|| {
            let mask = Arc::new(LoomMask::new(0x0000_00FF));

            let m1 = mask.clone();
            let m2 = mask.clone();

            // Main program unmasks bit 0 and masks bit 8
            let t1 = thread::spawn(move || m1.change(!0x0000_0001, 0x0000_0100));
            // Interrupt context unmasks bit 1 and masks bit 9
            let t2 = thread::spawn(move || m2.change(!0x0000_0002, 0x0000_0200));

            t1.join().unwrap();
            t2.join().unwrap();

            assert_eq!(mask.get(), 0x0000_03FC);
        });
    }

    /// Test: An observer only ever sees whole updates
    #[test]
    fn loom_change_mask_never_half_applied() {
        loom::model(|| {
            let mask = Arc::new(LoomMask::new(0x0000_000F));

            let writer = mask.clone();
            let reader = mask.clone();

            let t1 = thread::spawn(move || writer.change(0xFFFF_FFF0, 0x0000_0F00));
            let t2 = thread::spawn(move || reader.get());

            t1.join().unwrap();
            let seen = t2.join().unwrap();

            // Either before or after, never the AND without the OR
            assert!(seen == 0x0000_000F || seen == 0x0000_0F00, "saw {:#x}", seen);
        });
    }
}
