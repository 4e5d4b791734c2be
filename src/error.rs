//! Error types for the tilesync runtime
//!
//! Barrier primitives themselves are infallible by design: they either
//! return after the rendezvous completes or they spin forever on a broken
//! caller contract. Errors therefore only arise on the cold paths — launch
//! configuration validation and kernel panic collection.

use thiserror::Error;

/// Errors produced by the emulation runtime.
#[derive(Error, Debug)]
pub enum TilesyncError {
    /// Invalid launch configuration (bad grid/block dimensions).
    #[error("launch error: {0}")]
    LaunchError(String),

    /// A kernel thread panicked during execution.
    #[error("kernel panic: {0}")]
    KernelPanic(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, TilesyncError>;

/// Construct a [`TilesyncError::LaunchError`] from format arguments.
#[macro_export]
macro_rules! launch_error {
    ($($arg:tt)*) => {
        $crate::error::TilesyncError::LaunchError(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_display() {
        let err = launch_error!("block dim {} exceeds limit {}", 2048, 1024);
        assert_eq!(
            err.to_string(),
            "launch error: block dim 2048 exceeds limit 1024"
        );
    }

    #[test]
    fn test_kernel_panic_display() {
        let err = TilesyncError::KernelPanic("index out of bounds".into());
        assert!(err.to_string().contains("index out of bounds"));
    }
}
