//! Cooperative kernel launch
//!
//! Emulates a cooperative launch by giving every GPU thread its own OS
//! thread, so all blocks of the grid are concurrently resident for the
//! whole launch — the precondition cross-block barriers rely on. Kernel
//! arguments are cloned per thread; shared state goes through `Arc` or
//! caller-owned buffers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use log::debug;
use parking_lot::Mutex;

use crate::arch::WARP_LANES;
use crate::error::{Result, TilesyncError};
use crate::launch_error;
use crate::runtime::context::{with_kernel_context, BlockShared, ThreadContext};
use crate::runtime::grid::{Block, Grid};

/// Upper bound on emulated threads per launch. One OS thread is spawned
/// per GPU thread, so grids are expected to stay small.
pub const MAX_EMULATED_THREADS: u32 = 4096;

/// Kernel launch configuration.
#[derive(Debug, Clone, Copy)]
pub struct LaunchConfig {
    pub grid: Grid,
    pub block: Block,
}

impl LaunchConfig {
    pub fn new(grid: Grid, block: Block) -> Self {
        Self { grid, block }
    }
}

/// A kernel body executed once per thread of the launch.
pub trait KernelFunction<Args>: Send + Sync {
    /// Execute the kernel for a single thread.
    fn execute(&self, args: Args, ctx: ThreadContext);

    /// Kernel name, used in logs and panic reports.
    fn name(&self) -> &str {
        "kernel"
    }
}

/// Launch `kernel` cooperatively: every block of `config.grid` runs
/// concurrently until all threads return.
///
/// Block threads must be a multiple of [`WARP_LANES`] — the synchronization
/// layer is warp-granular. Returns once every thread has finished; a thread
/// panic is reported as [`TilesyncError::KernelPanic`]. Note that a panic
/// in one thread does not release its peers: if the remaining threads are
/// parked at a barrier the launch deadlocks, just as a trapped GPU thread
/// would hang its kernel.
pub fn launch_cooperative<K, Args>(kernel: K, config: LaunchConfig, args: Args) -> Result<()>
where
    K: KernelFunction<Args>,
    Args: Clone + Send,
{
    config.grid.validate()?;
    config.block.validate()?;

    let num_blocks = config.grid.num_blocks();
    let block_threads = config.block.num_threads();

    if block_threads % WARP_LANES != 0 {
        return Err(launch_error!(
            "block has {} threads, must be a multiple of the warp size ({})",
            block_threads,
            WARP_LANES
        ));
    }
    let total = num_blocks as u64 * block_threads as u64;
    if total > MAX_EMULATED_THREADS as u64 {
        return Err(launch_error!(
            "launch needs {} emulated threads, limit is {}",
            total,
            MAX_EMULATED_THREADS
        ));
    }

    debug!(
        "launching kernel `{}`: {} block(s) x {} thread(s)",
        kernel.name(),
        num_blocks,
        block_threads
    );

    // One barrier file per block, shared by that block's threads only.
    let blocks: Vec<Arc<BlockShared>> = (0..num_blocks)
        .map(|_| Arc::new(BlockShared::new(block_threads)))
        .collect();

    let panics: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let kernel = &kernel;
    let panics_ref = &panics;

    thread::scope(|scope| {
        for block_rank in 0..num_blocks {
            let block_shared = blocks[block_rank as usize].clone();
            for thread_rank in 0..block_threads {
                let args = args.clone();
                let block_shared = block_shared.clone();
                scope.spawn(move || {
                    let ctx = ThreadContext {
                        thread_idx: config.block.dim.unflatten(thread_rank),
                        block_idx: config.grid.dim.unflatten(block_rank),
                        block_dim: config.block.dim,
                        grid_dim: config.grid.dim,
                        block: block_shared,
                    };
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        let body_ctx = ctx.clone();
                        with_kernel_context(ctx, || kernel.execute(args, body_ctx));
                    }));
                    if let Err(payload) = outcome {
                        let msg = payload
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| payload.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "unknown panic".to_string());
                        panics_ref.lock().push(format!(
                            "kernel `{}` block {} thread {}: {}",
                            kernel.name(),
                            block_rank,
                            thread_rank,
                            msg
                        ));
                    }
                });
            }
        }
    });

    let panics = panics.into_inner();
    if let Some(first) = panics.into_iter().next() {
        return Err(TilesyncError::KernelPanic(first));
    }
    Ok(())
}
