//! Hardware topology constants and derived thread identifiers
//!
//! Describes the fixed two-level thread hierarchy the runtime virtualizes
//! over: warps of lanes, blocks of warps. Everything here is read-only for
//! the lifetime of the process; the derivation functions are `const fn` so
//! kernel code can use them in constant positions.

use crate::runtime::thread;

/// Number of lanes per warp. Must be a power of two.
pub const WARP_LANES: u32 = 32;

/// `log2(WARP_LANES)`, used to derive warp indices with a shift instead of
/// a division.
pub const WARP_LANES_LOG2: u32 = log2_pow2(WARP_LANES);

/// Maximum number of threads in one block.
pub const MAX_THREADS_PER_BLOCK: u32 = 1024;

/// Maximum number of warps in one block.
pub const MAX_WARPS_PER_BLOCK: u32 = MAX_THREADS_PER_BLOCK / WARP_LANES;

/// Number of named barrier slots available per block.
pub const NUM_NAMED_BARRIERS: u32 = 16;

/// Named barrier id used by whole-block synchronization
/// ([`crate::runtime::sync_threads`]).
pub const BLOCK_BARRIER_ID: u32 = 0;

/// First named barrier id reserved for partial-block (warp-group) barriers.
pub const FIRST_PARTIAL_BARRIER: u32 = 8;

/// Number of named barrier ids reserved for partial-block barriers.
pub const NUM_PARTIAL_BARRIERS: u32 = NUM_NAMED_BARRIERS - FIRST_PARTIAL_BARRIER;

/// Base-2 logarithm of a power of two. Fails the build when evaluated in a
/// const context with a non-power-of-two operand.
pub const fn log2_pow2(x: u32) -> u32 {
    assert!(x.is_power_of_two(), "operand must be a power of two");
    x.trailing_zeros()
}

const _: () = assert!(WARP_LANES.is_power_of_two());
const _: () = assert!(MAX_THREADS_PER_BLOCK % WARP_LANES == 0);
const _: () = assert!(FIRST_PARTIAL_BARRIER < NUM_NAMED_BARRIERS);

/// Warp index of a flat thread index within its block.
pub const fn warp_of(flat_thread: u32) -> u32 {
    flat_thread >> WARP_LANES_LOG2
}

/// Lane index of a flat thread index within its warp.
pub const fn lane_of(flat_thread: u32) -> u32 {
    flat_thread & (WARP_LANES - 1)
}

/// Warp index of the calling kernel thread.
///
/// Reads the flat thread rank from the active kernel context; returns 0
/// when called outside a kernel launch.
pub fn warp_id() -> u32 {
    warp_of(thread::rank())
}

/// Lane index of the calling kernel thread within its warp.
pub fn lane_id() -> u32 {
    lane_of(thread::rank())
}
