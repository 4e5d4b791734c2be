//! Sense-reversing counting spin barrier
//!
//! The building block behind named barriers. Threads rendezvous by
//! incrementing an arrival counter and spinning on an epoch word; the last
//! arriver resets the counter and bumps the epoch, releasing the spinners.
//! No OS blocking primitives are involved: participants are assumed to be
//! concurrently running threads, so busy-waiting is the low-latency choice.
//!
//! The party count is supplied per call rather than stored, mirroring the
//! hardware named-barrier instruction where the thread count is an operand.
//! All callers rendezvousing on the same instance must pass the same count.

use std::hint;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

/// Spins before a waiter starts yielding its timeslice. The hardware
/// primitive never yields; the OS-thread emulation must once the host is
/// oversubscribed, or preempted spinners stall every rendezvous.
const SPIN_YIELD_THRESHOLD: u32 = 1 << 14;

/// One wait iteration: busy-spin first, yield once the threshold is passed.
#[inline]
pub(crate) fn relax(spins: &mut u32) {
    if *spins < SPIN_YIELD_THRESHOLD {
        *spins += 1;
        hint::spin_loop();
    } else {
        thread::yield_now();
    }
}

/// Reusable counting barrier driven purely by atomics.
///
/// A single instance supports an unbounded number of sequential rounds
/// without reset. The epoch word disambiguates rounds: a late thread from
/// round N spins on the round-N epoch value and cannot be confused with an
/// arrival for round N+1.
#[derive(Debug)]
pub struct SpinBarrier {
    /// Threads arrived in the current round.
    arrived: AtomicU32,
    /// Round counter. Incremented once per completed rendezvous.
    epoch: AtomicU32,
}

impl SpinBarrier {
    /// Create a new barrier with no arrivals.
    pub const fn new() -> Self {
        Self {
            arrived: AtomicU32::new(0),
            epoch: AtomicU32::new(0),
        }
    }

    /// Rendezvous with `parties - 1` other threads.
    ///
    /// Blocks (spinning) until `parties` threads have called `wait` in the
    /// current round. Establishes a happens-before edge from every
    /// participant's prior writes to every participant's subsequent reads:
    /// the arrival increments form an acquire-release chain that the last
    /// arriver folds into the epoch release, which every spinner acquires.
    ///
    /// `parties` must be identical across all participants of a round and
    /// at least 1. A `parties` of 1 returns immediately.
    pub fn wait(&self, parties: u32) {
        debug_assert!(parties >= 1);
        let pass = self.epoch.load(Ordering::Acquire);
        if self.arrived.fetch_add(1, Ordering::AcqRel) == parties - 1 {
            // Last arriver: recycle the counter before releasing, so the
            // next round starts from zero.
            self.arrived.store(0, Ordering::Relaxed);
            self.epoch.fetch_add(1, Ordering::Release);
        } else {
            let mut spins = 0;
            while self.epoch.load(Ordering::Acquire) == pass {
                relax(&mut spins);
            }
        }
    }

    /// Current round number. Diagnostic only; racy by nature.
    pub fn rounds(&self) -> u32 {
        self.epoch.load(Ordering::Relaxed)
    }
}

impl Default for SpinBarrier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_single_party_returns_immediately() {
        let bar = SpinBarrier::new();
        bar.wait(1);
        bar.wait(1);
        assert_eq!(bar.rounds(), 2);
    }

    #[test]
    fn test_rendezvous_four_threads() {
        let bar = Arc::new(SpinBarrier::new());
        let before = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let bar = bar.clone();
                let before = before.clone();
                thread::spawn(move || {
                    before.fetch_add(1, Ordering::SeqCst);
                    bar.wait(4);
                    // Every thread must observe all four pre-barrier
                    // increments after the rendezvous.
                    before.load(Ordering::SeqCst)
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 4);
        }
    }

    #[test]
    fn test_reuse_many_rounds() {
        let bar = Arc::new(SpinBarrier::new());
        let rounds = 100;

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let bar = bar.clone();
                thread::spawn(move || {
                    for _ in 0..rounds {
                        bar.wait(3);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(bar.rounds(), rounds);
    }

    #[test]
    fn test_back_to_back_rounds_do_not_collide() {
        // Two threads hammer consecutive rounds with no delay between them;
        // a round-confusion bug would deadlock or lose a rendezvous.
        let bar = Arc::new(SpinBarrier::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let bar = bar.clone();
                let counter = counter.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        counter.fetch_add(1, Ordering::SeqCst);
                        bar.wait(2);
                        // After round i, exactly 2 * (i + 1) increments
                        // must be visible.
                        assert_eq!(counter.load(Ordering::SeqCst), 2 * (i + 1));
                        bar.wait(2);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1000);
    }
}
