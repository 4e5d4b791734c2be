//! Synchronization primitives
//!
//! The core of the runtime: barriers that virtualize many units of work
//! ("tiles") inside one kernel launch. [`sync_gpu`] rendezvous all blocks
//! of a cooperative launch through caller-allocated [`GridBarrier`] state;
//! [`sync_warps`] rendezvous only a warp group within one block, leaving
//! the block's other groups free to run. Both are lock-free and busy-wait
//! by design: participants are concurrently resident hardware threads, not
//! preemptible tasks.

pub mod grid;
pub mod named;
pub mod spin;
pub mod warp_group;

pub use grid::{sync_gpu, GridBarrier};
pub use named::NamedBarrierFile;
pub use spin::SpinBarrier;
pub use warp_group::sync_warps;
