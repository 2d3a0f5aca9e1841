//! Fixed-capacity byte storage for a FIFO device
//!
//! The buffer is a shifting queue: valid data always starts at offset 0,
//! writes append after the last valid byte and reads consume from the front,
//! moving the remainder down. It has no locking of its own; the owning device
//! serializes access.

use std::fmt;

use super::user::{UserFault, UserSink, UserSource};

/// Byte storage with a fixed capacity
///
/// # Invariant
///
/// `len() <= capacity()`. Bytes in `[len(), capacity())` are stale and never
/// observed through the public API.
///
/// # Example
///
/// ```
/// use globalfifo::io::FifoBuffer;
///
/// let mut buffer = FifoBuffer::new(8);
/// assert_eq!(buffer.push(&b"hello"[..]).unwrap(), 5);
///
/// let mut out = [0u8; 2];
/// assert_eq!(buffer.pop(&mut out[..], usize::MAX).unwrap(), 2);
/// assert_eq!(&out, b"he");
/// assert_eq!(buffer.data(), b"llo");
/// ```
pub struct FifoBuffer {
    mem: Box<[u8]>,
    len: usize,
}

impl FifoBuffer {
    /// Create an empty, zeroed buffer
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Self {
            mem: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    /// Number of valid bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.mem.len()
    }

    /// Free space in bytes
    #[must_use]
    pub fn spare(&self) -> usize {
        self.mem.len() - self.len
    }

    /// Valid bytes, front first
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.mem[..self.len]
    }

    /// Append as much of `src` as fits
    ///
    /// Returns the number of bytes appended. If the copy from `src` faults,
    /// the length is left unchanged; the stale region may hold partial data,
    /// which is never observable.
    pub fn push<S>(&mut self, src: &S) -> Result<usize, UserFault>
    where
        S: UserSource + ?Sized,
    {
        let count = src.len().min(self.spare());
        let end = self.len + count;
        src.copy_to(&mut self.mem[self.len..end])?;
        self.len = end;
        Ok(count)
    }

    /// Move up to `limit` bytes from the front into `dst`
    ///
    /// Returns the number of bytes moved, bounded by `limit`, `dst.len()` and
    /// `len()`. On a faulting copy nothing is consumed.
    pub fn pop<S>(&mut self, dst: &mut S, limit: usize) -> Result<usize, UserFault>
    where
        S: UserSink + ?Sized,
    {
        let count = dst.len().min(limit).min(self.len);
        dst.copy_from(&self.mem[..count])?;
        self.mem.copy_within(count..self.len, 0);
        self.len -= count;
        Ok(count)
    }

    /// Drop all data and zero the storage
    pub fn clear(&mut self) {
        self.mem.fill(0);
        self.len = 0;
    }
}

impl fmt::Debug for FifoBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FifoBuffer(len={}, capacity={})", self.len, self.mem.len())
    }
}
