//! Named barrier file — per-block table of independent barriers
//!
//! Emulates the hardware named-barrier mechanism (PTX `barrier.sync id,
//! count`): a small table of barriers addressable by integer id, so
//! multiple independent rendezvous can coexist within one block. Id 0 is
//! used by whole-block synchronization; the upper half of the id space is
//! reserved for partial-block warp-group barriers (see
//! [`crate::sync::sync_warps`]).
//!
//! One extra table of per-warp barriers backs the single-warp rendezvous
//! (`__syncwarp` equivalent), which on real hardware is not a named barrier
//! at all.

use crate::arch::{MAX_WARPS_PER_BLOCK, NUM_NAMED_BARRIERS, WARP_LANES};
use crate::sync::spin::SpinBarrier;

/// The barrier resources of one thread block: the named barrier table plus
/// per-warp barriers. Shared by every thread of the block via `Arc`.
#[derive(Debug)]
pub struct NamedBarrierFile {
    named: [SpinBarrier; NUM_NAMED_BARRIERS as usize],
    warps: [SpinBarrier; MAX_WARPS_PER_BLOCK as usize],
}

impl NamedBarrierFile {
    /// Create a fresh barrier file with all slots idle.
    pub const fn new() -> Self {
        const SLOT: SpinBarrier = SpinBarrier::new();
        Self {
            named: [SLOT; NUM_NAMED_BARRIERS as usize],
            warps: [SLOT; MAX_WARPS_PER_BLOCK as usize],
        }
    }

    /// Rendezvous `parties` threads on named barrier `id`.
    ///
    /// All threads synchronizing on the same id must pass the same party
    /// count, and distinct concurrent groups must use distinct ids — the
    /// same contract the hardware instruction imposes.
    pub fn sync(&self, id: u32, parties: u32) {
        debug_assert!(id < NUM_NAMED_BARRIERS, "named barrier id out of range");
        self.named[id as usize].wait(parties);
    }

    /// Rendezvous the full warp `warp` (all [`WARP_LANES`] lanes).
    pub fn sync_warp(&self, warp: u32) {
        debug_assert!(warp < MAX_WARPS_PER_BLOCK, "warp index out of range");
        self.warps[warp as usize].wait(WARP_LANES);
    }
}

impl Default for NamedBarrierFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_distinct_ids_are_independent() {
        // Group A (2 threads on id 8) must complete even though group B
        // (2 threads on id 9) is held up.
        let file = Arc::new(NamedBarrierFile::new());

        let a: Vec<_> = (0..2)
            .map(|_| {
                let file = file.clone();
                thread::spawn(move || file.sync(8, 2))
            })
            .collect();

        let b: Vec<_> = (0..2)
            .map(|i| {
                let file = file.clone();
                thread::spawn(move || {
                    if i == 0 {
                        thread::sleep(Duration::from_millis(50));
                    }
                    file.sync(9, 2);
                })
            })
            .collect();

        for h in a {
            h.join().unwrap();
        }
        for h in b {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_same_id_reusable() {
        let file = Arc::new(NamedBarrierFile::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let file = file.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        file.sync(3, 4);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_sync_warp() {
        let file = Arc::new(NamedBarrierFile::new());
        let handles: Vec<_> = (0..WARP_LANES)
            .map(|_| {
                let file = file.clone();
                thread::spawn(move || file.sync_warp(0))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
