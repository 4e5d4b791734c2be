//! Grid and block dimension types
//!
//! Mirrors the CUDA launch geometry: a grid of blocks, each block a set of
//! threads. Dimensions are three-component but the synchronization layer
//! works on flattened indices throughout.

use crate::arch::MAX_THREADS_PER_BLOCK;
use crate::error::Result;
use crate::launch_error;

/// Three-component dimension, analogous to CUDA `dim3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    /// Total element count.
    pub fn count(&self) -> u32 {
        self.x * self.y * self.z
    }

    /// Flatten a coordinate within these dimensions (x fastest).
    pub fn flatten(&self, idx: Dim3) -> u32 {
        (idx.z * self.y + idx.y) * self.x + idx.x
    }

    /// Inverse of [`flatten`](Self::flatten).
    pub fn unflatten(&self, flat: u32) -> Dim3 {
        Dim3 {
            x: flat % self.x,
            y: (flat / self.x) % self.y,
            z: flat / (self.x * self.y),
        }
    }
}

impl From<u32> for Dim3 {
    fn from(x: u32) -> Self {
        Dim3 { x, y: 1, z: 1 }
    }
}

impl From<(u32, u32)> for Dim3 {
    fn from((x, y): (u32, u32)) -> Self {
        Dim3 { x, y, z: 1 }
    }
}

impl From<(u32, u32, u32)> for Dim3 {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Dim3 { x, y, z }
    }
}

/// Grid of thread blocks.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    pub dim: Dim3,
}

impl Grid {
    pub fn new(dim: impl Into<Dim3>) -> Self {
        Self { dim: dim.into() }
    }

    /// Total number of blocks in the grid.
    pub fn num_blocks(&self) -> u32 {
        self.dim.count()
    }

    /// Check the grid dimensions are launchable.
    pub fn validate(&self) -> Result<()> {
        if self.num_blocks() == 0 {
            return Err(launch_error!("grid must contain at least one block"));
        }
        Ok(())
    }
}

/// Dimensions of one thread block.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub dim: Dim3,
}

impl Block {
    pub fn new(dim: impl Into<Dim3>) -> Self {
        Self { dim: dim.into() }
    }

    /// Total number of threads in the block.
    pub fn num_threads(&self) -> u32 {
        self.dim.count()
    }

    /// Check the block dimensions are launchable.
    pub fn validate(&self) -> Result<()> {
        let threads = self.num_threads();
        if threads == 0 {
            return Err(launch_error!("block must contain at least one thread"));
        }
        if threads > MAX_THREADS_PER_BLOCK {
            return Err(launch_error!(
                "block has {} threads, limit is {}",
                threads,
                MAX_THREADS_PER_BLOCK
            ));
        }
        Ok(())
    }
}
