//! Per-thread kernel execution context
//!
//! Each emulated GPU thread carries a [`ThreadContext`] mirroring CUDA's
//! built-in variables (`threadIdx`, `blockIdx`, `blockDim`, `gridDim`) plus
//! a handle to its block's barrier resources. The launcher installs the
//! context in thread-local storage so synchronization primitives can be
//! called without threading a handle through every function, matching the
//! source-level shape of real kernel code.

use std::cell::RefCell;
use std::sync::Arc;

use crate::arch::BLOCK_BARRIER_ID;
use crate::runtime::grid::Dim3;
use crate::sync::NamedBarrierFile;

/// Barrier resources shared by all threads of one block.
#[derive(Debug)]
pub struct BlockShared {
    /// Number of threads in the block.
    pub threads: u32,
    /// The block's named barrier file and per-warp barriers.
    pub barriers: NamedBarrierFile,
}

impl BlockShared {
    pub fn new(threads: u32) -> Self {
        Self {
            threads,
            barriers: NamedBarrierFile::new(),
        }
    }
}

/// Execution context of one kernel thread.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    /// Thread index within the block (CUDA `threadIdx`).
    pub thread_idx: Dim3,
    /// Block index within the grid (CUDA `blockIdx`).
    pub block_idx: Dim3,
    /// Block dimensions (CUDA `blockDim`).
    pub block_dim: Dim3,
    /// Grid dimensions (CUDA `gridDim`).
    pub grid_dim: Dim3,
    /// The block's shared barrier resources.
    pub block: Arc<BlockShared>,
}

impl ThreadContext {
    /// Flat thread rank within the block (x fastest).
    pub fn thread_rank(&self) -> u32 {
        self.block_dim.flatten(self.thread_idx)
    }

    /// Flat block rank within the grid.
    pub fn block_rank(&self) -> u32 {
        self.grid_dim.flatten(self.block_idx)
    }

    /// Globally unique flat thread id across the whole grid.
    pub fn global_thread_id(&self) -> usize {
        (self.block_rank() * self.block_dim.count() + self.thread_rank()) as usize
    }
}

thread_local! {
    static KERNEL_CONTEXT: RefCell<Option<ThreadContext>> = const { RefCell::new(None) };
}

/// Install `ctx` as the current thread's kernel context.
pub fn set_kernel_context(ctx: ThreadContext) {
    KERNEL_CONTEXT.with(|c| {
        *c.borrow_mut() = Some(ctx);
    });
}

/// Clear the current thread's kernel context.
pub fn clear_kernel_context() {
    KERNEL_CONTEXT.with(|c| {
        *c.borrow_mut() = None;
    });
}

/// Run `f` with `ctx` installed, clearing the context afterwards.
pub fn with_kernel_context<F, R>(ctx: ThreadContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_kernel_context(ctx);
    let result = f();
    clear_kernel_context();
    result
}

/// Run `f` with the calling thread's rank and block resources, or do
/// nothing when no kernel context is installed.
///
/// Synchronization outside a launch has nothing to rendezvous with, so
/// host-side calls fall through silently.
pub fn with_block<F>(f: F)
where
    F: FnOnce(u32, &BlockShared),
{
    KERNEL_CONTEXT.with(|c| {
        if let Some(ref ctx) = *c.borrow() {
            f(ctx.thread_rank(), &ctx.block);
        }
    });
}

/// Thread index access (analogous to CUDA `threadIdx`).
pub mod thread {
    use super::KERNEL_CONTEXT;
    use crate::runtime::grid::Dim3;

    /// Current thread index, or the origin if no context is set.
    pub fn index() -> Dim3 {
        KERNEL_CONTEXT.with(|c| {
            c.borrow()
                .as_ref()
                .map(|ctx| ctx.thread_idx)
                .unwrap_or(Dim3 { x: 0, y: 0, z: 0 })
        })
    }

    /// Flat thread rank within the block, or 0 if no context is set.
    pub fn rank() -> u32 {
        KERNEL_CONTEXT.with(|c| {
            c.borrow().as_ref().map(|ctx| ctx.thread_rank()).unwrap_or(0)
        })
    }
}

/// Block index and dimension access (analogous to CUDA `blockIdx` /
/// `blockDim`).
pub mod block {
    use super::KERNEL_CONTEXT;
    use crate::runtime::grid::Dim3;

    /// Current block index, or the origin if no context is set.
    pub fn index() -> Dim3 {
        KERNEL_CONTEXT.with(|c| {
            c.borrow()
                .as_ref()
                .map(|ctx| ctx.block_idx)
                .unwrap_or(Dim3 { x: 0, y: 0, z: 0 })
        })
    }

    /// Flat block rank within the grid, or 0 if no context is set.
    pub fn rank() -> u32 {
        KERNEL_CONTEXT.with(|c| {
            c.borrow().as_ref().map(|ctx| ctx.block_rank()).unwrap_or(0)
        })
    }

    /// Current block dimensions, or `1 x 1 x 1` if no context is set.
    pub fn dim() -> Dim3 {
        KERNEL_CONTEXT.with(|c| {
            c.borrow()
                .as_ref()
                .map(|ctx| ctx.block_dim)
                .unwrap_or(Dim3 { x: 1, y: 1, z: 1 })
        })
    }
}

/// Grid dimension access (analogous to CUDA `gridDim`).
pub mod grid_dim {
    use super::KERNEL_CONTEXT;
    use crate::runtime::grid::Dim3;

    /// Current grid dimensions, or `1 x 1 x 1` if no context is set.
    pub fn dim() -> Dim3 {
        KERNEL_CONTEXT.with(|c| {
            c.borrow()
                .as_ref()
                .map(|ctx| ctx.grid_dim)
                .unwrap_or(Dim3 { x: 1, y: 1, z: 1 })
        })
    }
}

/// Synchronize all threads of the current block (CUDA `__syncthreads()`).
///
/// Rendezvous on the block's whole-block barrier id. Every thread of the
/// block must reach the call; divergent control flow that lets some threads
/// skip it hangs the block. Outside a launch this is a no-op.
pub fn sync_threads() {
    with_block(|_, block| {
        block.barriers.sync(BLOCK_BARRIER_ID, block.threads);
    });
}
