//! Reduction-style ordering test
//!
//! The canonical consumer of the cross-block barrier: a two-phase sum where
//! each block stages a partial result, the grid synchronizes, and one block
//! combines the partials. Correctness hinges on the barrier ordering the
//! staging writes before the dependent reads on another block.

use std::sync::Arc;

use tilesync::memory::SharedSlice;
use tilesync::runtime::{
    launch_cooperative, sync_threads, Block, Grid, KernelFunction, LaunchConfig, ThreadContext,
};
use tilesync::sync::{sync_gpu, GridBarrier};

const BLOCKS: u32 = 4;
const BLOCK_THREADS: u32 = 64;
const N: usize = (BLOCKS * BLOCK_THREADS) as usize;

struct ReduceKernel {
    state: Arc<GridBarrier>,
    input: Arc<SharedSlice<u64>>,
    partials: Arc<SharedSlice<u64>>,
    output: Arc<SharedSlice<u64>>,
    checks: Arc<SharedSlice<u64>>,
}

impl KernelFunction<()> for ReduceKernel {
    fn execute(&self, _args: (), ctx: ThreadContext) {
        let block = ctx.block_rank();
        let rank = ctx.thread_rank();

        // Phase 1: each thread stages its element, then the block leader
        // folds the block's segment into one partial.
        let gid = ctx.global_thread_id();
        unsafe { self.input.write(gid, gid as u64) };
        sync_threads();
        if rank == 0 {
            let base = (block * BLOCK_THREADS) as usize;
            let partial: u64 = (base..base + BLOCK_THREADS as usize)
                .map(|i| unsafe { self.input.read(i) })
                .sum();
            unsafe { self.partials.write(block as usize, partial) };
        }

        // Phase 2: all partials must be staged before block 0 reads them.
        sync_gpu::<BLOCKS>(&self.state);
        if block == 0 && rank == 0 {
            let total: u64 = (0..BLOCKS as usize)
                .map(|b| unsafe { self.partials.read(b) })
                .sum();
            unsafe { self.output.write(0, total) };
        }

        // Phase 3: the combined result becomes visible to every thread.
        sync_gpu::<BLOCKS>(&self.state);
        unsafe { self.checks.write(gid, self.output.read(0)) };
    }

    fn name(&self) -> &str {
        "grid_reduce"
    }
}

#[test]
fn test_two_phase_grid_reduction() {
    let _ = env_logger::builder().is_test(true).try_init();

    let state = Arc::new(GridBarrier::new());
    let checks = Arc::new(SharedSlice::new(N));
    let kernel = ReduceKernel {
        state: state.clone(),
        input: Arc::new(SharedSlice::new(N)),
        partials: Arc::new(SharedSlice::new(BLOCKS as usize)),
        output: Arc::new(SharedSlice::new(1)),
        checks: checks.clone(),
    };
    let config = LaunchConfig::new(Grid::new(BLOCKS), Block::new(BLOCK_THREADS));
    launch_cooperative(kernel, config, ()).unwrap();

    let expected: u64 = (0..N as u64).sum();
    for (i, got) in checks.to_vec().into_iter().enumerate() {
        assert_eq!(got, expected, "thread {i} read a stale total");
    }

    // Two rounds leave the barrier state back at zero.
    assert_eq!(state.count(), 0);
    assert_eq!(state.flag(), 0);
    assert_eq!(state.epoch(), 0);
}
