//! Warp-group barrier
//!
//! Synchronizes a statically-sized contiguous group of warps within the
//! current block, leaving the other warp groups undisturbed. This replaces
//! whole-block synchronization in kernels that pack several tiles into one
//! block: each tile's warps rendezvous among themselves on a named barrier
//! id derived from their position, so groups never interfere.
//!
//! Group sizes are compile-time constants validated at build time; an
//! unsupported size is a compile error, never a runtime fallback.

use crate::arch::{
    FIRST_PARTIAL_BARRIER, MAX_THREADS_PER_BLOCK, NUM_PARTIAL_BARRIERS, WARP_LANES,
};
use crate::runtime::with_block;

/// Synchronize the `NUM_WARPS` contiguous warps the calling thread belongs
/// to.
///
/// `NUM_WARPS` must be a power of two in 1..=32 and the group must fit the
/// block. `BLOCK_THREADS` is the block's compile-time thread count; it
/// bounds the number of groups so every group maps to a distinct named
/// barrier id. With 8 reserved partial-barrier ids, a 2-warp group is only
/// valid for blocks of at most 512 threads — larger configurations are
/// rejected at build time. Targets with a different named-barrier budget
/// must adjust [`NUM_PARTIAL_BARRIERS`] rather than these call sites.
///
/// All warps of a group must execute the identical call at the identical
/// logical point; divergence hangs the group. Matching `BLOCK_THREADS` to
/// the actual launch block size is a caller obligation (checked only in
/// debug builds).
///
/// Requesting a group size that is not a supported power of two fails to
/// build:
///
/// ```compile_fail
/// tilesync::sync::sync_warps::<3, 256>();
/// ```
///
/// So does a 2-warp group in a block beyond the 512-thread ceiling:
///
/// ```compile_fail
/// tilesync::sync::sync_warps::<2, 1024>();
/// ```
pub fn sync_warps<const NUM_WARPS: u32, const BLOCK_THREADS: u32>() {
    const {
        assert!(
            NUM_WARPS.is_power_of_two() && NUM_WARPS <= 32,
            "warp group size must be a power of two in 1..=32"
        );
        assert!(
            BLOCK_THREADS % WARP_LANES == 0 && BLOCK_THREADS <= MAX_THREADS_PER_BLOCK,
            "block thread count must be a multiple of the warp size, at most 1024"
        );
        assert!(
            NUM_WARPS * WARP_LANES <= BLOCK_THREADS,
            "warp group does not fit in the block"
        );
        assert!(
            NUM_WARPS * WARP_LANES == BLOCK_THREADS
                || NUM_WARPS == 1
                || BLOCK_THREADS / (NUM_WARPS * WARP_LANES) <= NUM_PARTIAL_BARRIERS,
            "block has more warp groups than reserved named barrier ids \
             (a 2-warp barrier supports blocks of at most 512 threads)"
        );
    }

    let group_threads = NUM_WARPS * WARP_LANES;
    with_block(|rank, block| {
        debug_assert_eq!(
            block.threads, BLOCK_THREADS,
            "BLOCK_THREADS does not match the launched block size"
        );
        if NUM_WARPS == 1 {
            // Single warp: cheapest same-warp rendezvous, no barrier id
            // needed.
            block.barriers.sync_warp(rank >> crate::arch::WARP_LANES_LOG2);
        } else if group_threads == BLOCK_THREADS {
            // The group is the whole block: one group only, so the first
            // reserved id is used without an offset.
            block.barriers.sync(FIRST_PARTIAL_BARRIER, group_threads);
        } else {
            let id = rank / group_threads + FIRST_PARTIAL_BARRIER;
            block.barriers.sync(id, group_threads);
        }
    });
}

#[cfg(test)]
mod tests {
    // Multi-thread coverage lives in tests/warp_group_tests.rs; here we only
    // pin the no-context behavior.
    use super::*;

    #[test]
    fn test_noop_outside_launch() {
        // Outside a kernel there is no block context; the call must return
        // rather than spin.
        sync_warps::<4, 256>();
        sync_warps::<1, 32>();
    }
}
