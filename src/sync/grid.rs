//! Cross-block barrier
//!
//! Synchronizes every block of a cooperative launch without a host round
//! trip. The shared state is a caller-allocated [`GridBarrier`] visible to
//! all blocks; the protocol is a lock-free counting barrier whose counter
//! alternates direction between rounds (add, then subtract), with an epoch
//! toggle so that back-to-back calls on the same state never collide.
//!
//! Guarantees: every write issued by any participating thread before its
//! block's call is visible to every thread on every block after the
//! matching call returns.

use std::sync::atomic::{fence, AtomicU32, Ordering};

use crate::runtime::{sync_threads, thread};
use crate::sync::spin::relax;

/// Shared state of one cross-block barrier.
///
/// Allocate one zero-initialized instance per cooperative task, in memory
/// reachable by all participating blocks, and pass the same instance into
/// every [`sync_gpu`] call of that launch. The state is reusable across an
/// unbounded number of rounds without reset and is only deallocated when
/// the launch completes.
#[derive(Debug)]
pub struct GridBarrier {
    /// Arrival signal for the current round. 1 iff all blocks have arrived
    /// in the add half-cycle; cleared only once all blocks have departed.
    flag: AtomicU32,
    /// Arrived-block counter, always in `[0, BLOCK_NUM]`.
    count: AtomicU32,
    /// Which half-cycle the next round runs: 0 means the next round adds,
    /// 1 means it subtracts.
    epoch: AtomicU32,
}

impl GridBarrier {
    /// Create a zero-initialized barrier state.
    pub const fn new() -> Self {
        Self {
            flag: AtomicU32::new(0),
            count: AtomicU32::new(0),
            epoch: AtomicU32::new(0),
        }
    }

    /// Current flag value. Cold diagnostic; racy while a round is in flight.
    pub fn flag(&self) -> u32 {
        self.flag.load(Ordering::Relaxed)
    }

    /// Current arrival count. Cold diagnostic; racy while a round is in
    /// flight.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Current epoch. Cold diagnostic.
    pub fn epoch(&self) -> u32 {
        self.epoch.load(Ordering::Relaxed)
    }
}

impl Default for GridBarrier {
    fn default() -> Self {
        Self::new()
    }
}

/// Synchronize all `BLOCK_NUM` blocks of a cooperative launch.
///
/// Every thread of every participating block must call this the same number
/// of times at the same logical point; `BLOCK_NUM` must equal the number of
/// concurrently resident blocks. Violating either is undefined behavior at
/// the protocol level — deadlock or silently racy synchronization. There is
/// no timeout: a participant that never arrives hangs the whole barrier.
///
/// The call is a full rendezvous with a device-wide happens-before edge:
/// all pre-call writes on any block are visible post-call on every block.
pub fn sync_gpu<const BLOCK_NUM: u32>(state: &GridBarrier) {
    const {
        assert!(BLOCK_NUM >= 1, "cooperative launch needs at least one block");
    }

    // Local rendezvous first: after this, every block-mate's writes are
    // visible to the designated thread, and only that one thread needs to
    // touch the shared state.
    sync_threads();
    if BLOCK_NUM == 1 {
        return;
    }
    if thread::rank() == 0 {
        // Publish this block's writes before signalling arrival.
        fence(Ordering::SeqCst);
        let is_add = state.epoch.load(Ordering::Relaxed) ^ 1;
        if is_add == 1 {
            if state.count.fetch_add(1, Ordering::AcqRel) == BLOCK_NUM - 1 {
                state.flag.store(1, Ordering::Release);
            }
            let mut spins = 0;
            while state.flag.load(Ordering::Acquire) == 0 {
                relax(&mut spins);
            }
        } else {
            if state.count.fetch_sub(1, Ordering::AcqRel) == 1 {
                state.flag.store(0, Ordering::Release);
            }
            let mut spins = 0;
            while state.flag.load(Ordering::Acquire) == 1 {
                relax(&mut spins);
            }
        }
        state.epoch.store(is_add, Ordering::Relaxed);
    }
    // A single thread observed the flip; the rest of the block must not
    // proceed until it has.
    sync_threads();
}
