//! # tilesync
//!
//! Device-side synchronization layer for tile-virtualized GPU kernel
//! runtimes, with a CPU thread emulation backend.
//!
//! A conventional kernel assumes one block per unit of work and a single
//! whole-block barrier. This runtime instead packs multiple tiles per block
//! and multiple cooperating blocks per logical task, which needs two harder
//! primitives:
//!
//! - [`sync::sync_gpu`] — rendezvous an entire cooperating set of thread
//!   blocks through caller-allocated [`sync::GridBarrier`] state, with no
//!   host round trip and full cross-block memory visibility.
//! - [`sync::sync_warps`] — rendezvous only a statically-sized group of
//!   warps inside one block, leaving the block's other warp groups (working
//!   on unrelated tiles) undisturbed.
//!
//! Both are lock-free, live entirely in shared memory, and compose across
//! repeated calls without reset. The crate also carries the minimal
//! emulation runtime ([`runtime`]) needed to exercise them: a cooperative
//! launcher that runs one OS thread per GPU thread, so all blocks are
//! concurrently resident for the lifetime of a launch.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tilesync::runtime::{launch_cooperative, Block, Grid, KernelFunction,
//!                         LaunchConfig, ThreadContext};
//! use tilesync::sync::{sync_gpu, GridBarrier};
//!
//! struct Exchange {
//!     state: Arc<GridBarrier>,
//!     slots: Arc<[std::sync::atomic::AtomicU32; 2]>,
//! }
//!
//! impl KernelFunction<()> for Exchange {
//!     fn execute(&self, _args: (), ctx: ThreadContext) {
//!         use std::sync::atomic::Ordering;
//!         let me = ctx.block_rank() as usize;
//!         if ctx.thread_rank() == 0 {
//!             self.slots[me].store(me as u32 + 1, Ordering::Relaxed);
//!         }
//!         sync_gpu::<2>(&self.state);
//!         // Both blocks' writes are now visible everywhere.
//!         assert_eq!(
//!             self.slots[0].load(Ordering::Relaxed)
//!                 + self.slots[1].load(Ordering::Relaxed),
//!             3
//!         );
//!     }
//! }
//!
//! let kernel = Exchange {
//!     state: Arc::new(GridBarrier::new()),
//!     slots: Arc::new(Default::default()),
//! };
//! let config = LaunchConfig::new(Grid::new(2u32), Block::new(32u32));
//! launch_cooperative(kernel, config, ()).unwrap();
//! ```

pub mod arch;
pub mod error;
pub mod memory;
pub mod runtime;
pub mod sync;

pub use error::{Result, TilesyncError};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quick initialization check used by smoke tests.
pub fn init() -> Result<()> {
    log::debug!("tilesync v{} initialized", VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
