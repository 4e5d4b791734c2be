//! Device-global memory emulation
//!
//! [`SharedSlice`] stands in for a device-memory buffer reachable by every
//! block of a launch: a heap allocation with unsynchronized element access.
//! Kernels write it with plain stores and rely on the barrier primitives
//! for ordering, exactly as device code relies on fences rather than
//! per-access atomics. The accessors are `unsafe` because the caller must
//! supply that ordering.

use std::cell::UnsafeCell;

/// Fixed-size buffer shared across all threads of a launch.
pub struct SharedSlice<T> {
    data: UnsafeCell<Box<[T]>>,
}

// Safety: cross-thread access is the whole point; races are excluded by the
// caller's barrier discipline, not by this type.
unsafe impl<T: Send> Send for SharedSlice<T> {}
unsafe impl<T: Send> Sync for SharedSlice<T> {}

impl<T: Copy + Default> SharedSlice<T> {
    /// Allocate `len` default-initialized elements.
    pub fn new(len: usize) -> Self {
        Self {
            data: UnsafeCell::new(vec![T::default(); len].into_boxed_slice()),
        }
    }
}

impl<T: Copy> SharedSlice<T> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        unsafe { (&(*self.data.get())).len() }
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read element `idx` with a plain load.
    ///
    /// # Safety
    /// No thread may be writing `idx` concurrently; a barrier (or other
    /// happens-before edge) must separate this read from the write that
    /// produced the value.
    pub unsafe fn read(&self, idx: usize) -> T {
        (*self.data.get())[idx]
    }

    /// Write element `idx` with a plain store.
    ///
    /// # Safety
    /// No other thread may be accessing `idx` concurrently; a barrier must
    /// separate this write from any read of it on another thread.
    pub unsafe fn write(&self, idx: usize, value: T) {
        (*self.data.get())[idx] = value;
    }

    /// Copy the buffer out. Host-side use, after the launch has completed.
    pub fn to_vec(&self) -> Vec<T> {
        unsafe { (*self.data.get()).to_vec() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_default_initialized() {
        let buf: SharedSlice<u32> = SharedSlice::new(8);
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.to_vec(), vec![0; 8]);
    }

    #[test]
    fn test_read_write() {
        let buf: SharedSlice<u32> = SharedSlice::new(4);
        unsafe {
            buf.write(2, 99);
            assert_eq!(buf.read(2), 99);
        }
        assert_eq!(buf.to_vec(), vec![0, 0, 99, 0]);
    }
}
