//! Emulation runtime: launch geometry, per-thread context, cooperative
//! launcher
//!
//! One OS thread per GPU thread, a thread-local [`ThreadContext`] mirroring
//! CUDA's built-in variables, and a launcher that keeps every block of the
//! grid concurrently resident — the cooperative-launch guarantee the
//! cross-block barrier depends on.

pub mod context;
pub mod grid;
pub mod launch;

pub use context::{
    block, clear_kernel_context, grid_dim, set_kernel_context, sync_threads, thread, with_block,
    with_kernel_context, BlockShared, ThreadContext,
};
pub use grid::{Block, Dim3, Grid};
pub use launch::{launch_cooperative, KernelFunction, LaunchConfig, MAX_EMULATED_THREADS};
