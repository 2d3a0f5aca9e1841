//! Bounded blocking FIFO device
//!
//! A fixed-capacity byte queue shared by every handle opened on it:
//! - Writers append at the end, readers consume from the front
//! - Both sides block (or fail with `WouldBlock`) at the full/empty edges
//! - Coordination via one mutex and two condition variables, one per
//!   direction

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::control::Command;
use crate::error::FifoError;
use crate::file::FifoFile;
use crate::interrupt::Interrupt;
use crate::io::{FifoBuffer, UserSink, UserSource};

/// Blocking behaviour of a call, the `O_NONBLOCK` analogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    /// Sleep until the operation can make progress
    #[default]
    Blocking,
    /// Fail with [`FifoError::WouldBlock`] instead of sleeping
    NonBlocking,
}

impl IoMode {
    #[must_use]
    pub fn from_nonblocking(nonblocking: bool) -> Self {
        if nonblocking {
            IoMode::NonBlocking
        } else {
            IoMode::Blocking
        }
    }

    #[must_use]
    pub fn is_nonblocking(self) -> bool {
        self == IoMode::NonBlocking
    }
}

/// State guarded by the device lock
struct FifoState {
    buffer: FifoBuffer,
    blocked_readers: usize,
    blocked_writers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

impl Direction {
    fn must_wait(self, state: &FifoState) -> bool {
        match self {
            Direction::Read => state.buffer.is_empty(),
            Direction::Write => state.buffer.is_full(),
        }
    }

    fn sleepers(self, state: &mut FifoState) -> &mut usize {
        match self {
            Direction::Read => &mut state.blocked_readers,
            Direction::Write => &mut state.blocked_writers,
        }
    }
}

/// One FIFO device instance
///
/// # Thread Safety
///
/// The device is shared through `Arc` by the pool and by every open handle.
/// All access to the buffer goes through one `parking_lot::Mutex`; a caller
/// that has to wait sleeps on a `Condvar`, which releases the mutex for the
/// duration of the sleep. So a blocked reader never stops a writer from
/// making room for it, and vice versa.
///
/// Waiters of the same kind are woken together and race for the lock; there
/// is no FIFO fairness among them.
pub struct FifoDevice {
    minor: usize,
    capacity: usize,
    this: Weak<FifoDevice>,
    state: Mutex<FifoState>,
    /// Signalled when the buffer became non-empty
    readable: Condvar,
    /// Signalled when the buffer became non-full
    writable: Condvar,
}

impl FifoDevice {
    /// Create an empty device
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(minor: usize, capacity: usize) -> Arc<Self> {
        let buffer = FifoBuffer::new(capacity);
        Arc::new_cyclic(|this| Self {
            minor,
            capacity,
            this: this.clone(),
            state: Mutex::new(FifoState {
                buffer,
                blocked_readers: 0,
                blocked_writers: 0,
            }),
            readable: Condvar::new(),
            writable: Condvar::new(),
        })
    }

    /// Open a new handle on this device
    ///
    /// Never blocks and never touches the buffer.
    #[must_use]
    pub fn open(self: &Arc<Self>, mode: IoMode) -> FifoFile {
        FifoFile::new(Arc::clone(self), mode)
    }

    #[must_use]
    pub fn minor(&self) -> usize {
        self.minor
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently buffered
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.state.lock().buffer.is_full()
    }

    /// Copy of the buffered bytes, front first
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.state.lock().buffer.data().to_vec()
    }

    /// Number of callers sleeping until data arrives
    #[must_use]
    pub fn blocked_readers(&self) -> usize {
        self.state.lock().blocked_readers
    }

    /// Number of callers sleeping until space frees up
    #[must_use]
    pub fn blocked_writers(&self) -> usize {
        self.state.lock().blocked_writers
    }

    /// Consume up to `dst.len()` bytes from the front of the queue
    ///
    /// `pos` is the caller's position cursor. A cursor past the capacity
    /// reads nothing; otherwise the request is clamped to `capacity - pos`
    /// and the cursor advances by the number of bytes read.
    ///
    /// Returns the number of bytes copied into `dst`, which may be less than
    /// requested. With [`IoMode::Blocking`] an empty queue puts the caller
    /// to sleep until a writer adds data or `interrupt` is raised.
    ///
    /// # Errors
    ///
    /// - [`FifoError::WouldBlock`]: queue empty in non-blocking mode
    /// - [`FifoError::Interrupted`]: interrupted while sleeping
    /// - [`FifoError::InvalidBuffer`]: `dst` faulted; nothing was consumed
    pub fn read<S>(
        &self,
        pos: &mut u64,
        dst: &mut S,
        mode: IoMode,
        interrupt: &Interrupt,
    ) -> Result<usize, FifoError>
    where
        S: UserSink + ?Sized,
    {
        let p = *pos;
        let Some(remaining) = self.remaining_from(p) else {
            return Ok(0);
        };
        let count = dst.len().min(remaining);
        if count == 0 {
            return Ok(0);
        }

        let mut state = self.state.lock();
        self.wait_until_ready(&mut state, Direction::Read, mode, interrupt)?;

        let n = state
            .buffer
            .pop(dst, count)
            .map_err(|_| FifoError::InvalidBuffer)?;
        drop(state);

        *pos = p + n as u64;
        self.writable.notify_all();
        log::debug!("globalfifo{}: read {n} bytes from {p}", self.minor);
        Ok(n)
    }

    /// Append up to `src.len()` bytes at the end of the queue
    ///
    /// `pos` is the caller's position cursor; past the capacity nothing is
    /// written. Data always goes to the end of the queue regardless of `pos`.
    ///
    /// Returns the number of bytes taken from `src`, which is less than
    /// requested when the queue has less room. With [`IoMode::Blocking`] a
    /// full queue puts the caller to sleep until a reader (or a clear)
    /// frees space or `interrupt` is raised.
    ///
    /// # Errors
    ///
    /// - [`FifoError::WouldBlock`]: queue full in non-blocking mode
    /// - [`FifoError::Interrupted`]: interrupted while sleeping
    /// - [`FifoError::InvalidBuffer`]: `src` faulted; nothing was appended
    pub fn write<S>(
        &self,
        pos: u64,
        src: &S,
        mode: IoMode,
        interrupt: &Interrupt,
    ) -> Result<usize, FifoError>
    where
        S: UserSource + ?Sized,
    {
        if self.remaining_from(pos).is_none() {
            return Ok(0);
        }
        if src.is_empty() {
            // Empty writes must not wake readers
            return Ok(0);
        }

        let mut state = self.state.lock();
        self.wait_until_ready(&mut state, Direction::Write, mode, interrupt)?;

        let n = state
            .buffer
            .push(src)
            .map_err(|_| FifoError::InvalidBuffer)?;
        drop(state);

        self.readable.notify_all();
        log::debug!("globalfifo{}: write {n} bytes from {pos}", self.minor);
        Ok(n)
    }

    /// Discard all buffered data and zero the storage
    ///
    /// Writers sleeping on a full queue are woken, since the whole capacity
    /// is free again.
    pub fn clear(&self) {
        self.state.lock().buffer.clear();
        self.writable.notify_all();
        log::info!("globalfifo{} is set to zero", self.minor);
    }

    /// Execute a control command
    ///
    /// # Errors
    ///
    /// [`FifoError::InvalidCommand`] for an unknown opcode.
    pub fn ioctl(&self, cmd: u32) -> Result<(), FifoError> {
        match Command::try_from(cmd)? {
            Command::Clear => self.clear(),
        }
        Ok(())
    }

    /// Bytes addressable from `pos`, or `None` past the end of the device
    fn remaining_from(&self, pos: u64) -> Option<usize> {
        let capacity = self.capacity as u64;
        if pos > capacity {
            return None;
        }
        Some(usize::try_from(capacity - pos).unwrap_or(self.capacity))
    }

    /// Sleep until `direction` can make progress
    ///
    /// Precondition: `state` is the held device lock.
    /// Post-condition: the lock is held again, and on `Ok` the queue is
    /// non-empty (read) or non-full (write).
    fn wait_until_ready(
        &self,
        state: &mut MutexGuard<'_, FifoState>,
        direction: Direction,
        mode: IoMode,
        interrupt: &Interrupt,
    ) -> Result<(), FifoError> {
        if !direction.must_wait(state) {
            return Ok(());
        }
        if mode.is_nonblocking() {
            return Err(FifoError::WouldBlock);
        }

        let this = self.this.clone();
        let armed = interrupt.arm(move || {
            if let Some(device) = this.upgrade() {
                device.wake_all();
            }
        });

        *direction.sleepers(state) += 1;
        let result = loop {
            if !direction.must_wait(state) {
                break Ok(());
            }
            if armed.take() {
                log::debug!("globalfifo{}: {direction:?} interrupted", self.minor);
                break Err(FifoError::Interrupted);
            }
            match direction {
                Direction::Read => self.readable.wait(state),
                Direction::Write => self.writable.wait(state),
            }
        };
        *direction.sleepers(state) -= 1;
        result
    }

    fn wake_all(&self) {
        let _state = self.state.lock();
        self.readable.notify_all();
        self.writable.notify_all();
    }
}

impl fmt::Debug for FifoDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        write!(
            f,
            "FifoDevice(minor={}, len={}, capacity={}, blocked_readers={}, blocked_writers={})",
            self.minor,
            state.buffer.len(),
            self.capacity,
            state.blocked_readers,
            state.blocked_writers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_capacity_eight() {
        let device = FifoDevice::new(0, 8);
        let interrupt = Interrupt::new();
        let mut pos = 0;

        assert_eq!(
            device.write(0, &b"ABCDEFGH"[..], IoMode::Blocking, &interrupt),
            Ok(8)
        );
        assert_eq!(
            device.write(0, &b"X"[..], IoMode::NonBlocking, &interrupt),
            Err(FifoError::WouldBlock)
        );

        let mut out = [0u8; 4];
        assert_eq!(
            device.read(&mut pos, &mut out[..], IoMode::Blocking, &interrupt),
            Ok(4)
        );
        assert_eq!(&out, b"ABCD");
        assert_eq!(device.len(), 4);
        assert_eq!(pos, 4);

        assert_eq!(
            device.write(0, &b"IJ"[..], IoMode::Blocking, &interrupt),
            Ok(2)
        );
        assert_eq!(device.snapshot(), b"EFGHIJ");
        assert_eq!(device.len(), 6);
    }

    #[test]
    fn test_remaining_from() {
        let device = FifoDevice::new(0, 16);
        assert_eq!(device.remaining_from(0), Some(16));
        assert_eq!(device.remaining_from(10), Some(6));
        assert_eq!(device.remaining_from(16), Some(0));
        assert_eq!(device.remaining_from(17), None);
    }

    #[test]
    fn test_ioctl_clear_and_invalid() {
        let device = FifoDevice::new(0, 8);
        let interrupt = Interrupt::new();
        device
            .write(0, &b"abc"[..], IoMode::Blocking, &interrupt)
            .unwrap();

        assert_eq!(device.ioctl(0x1234), Err(FifoError::InvalidCommand(0x1234)));
        assert_eq!(device.len(), 3);

        device.ioctl(crate::control::FIFO_CLEAR).unwrap();
        assert!(device.is_empty());
    }

    #[test]
    fn test_io_mode() {
        assert_eq!(IoMode::default(), IoMode::Blocking);
        assert!(IoMode::from_nonblocking(true).is_nonblocking());
        assert!(!IoMode::from_nonblocking(false).is_nonblocking());
    }
}
