//! Open handle on a FIFO device
//!
//! A handle carries what the device does not share between opens: the
//! position cursor, the blocking mode and the interrupt source of whoever
//! uses it. The buffer itself is shared by every handle on the device.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::error::FifoError;
use crate::fifo::{FifoDevice, IoMode};
use crate::interrupt::Interrupt;
use crate::io::{UserSink, UserSource};

/// Handle returned by [`FifoDevice::open`] and [`crate::FifoPool::open`]
///
/// # Thread Safety
///
/// - **Not shared**: `read()`/`write()` take `&mut self`, so a single handle
///   is used by one thread at a time. Open one handle per thread instead;
///   all handles on a device see the same buffer.
/// - **Interruptible**: [`FifoFile::interrupter`] hands out a clone of the
///   handle's interrupt source, which another thread can raise to abort a
///   blocked call with [`FifoError::Interrupted`].
pub struct FifoFile {
    pub(crate) device: Arc<FifoDevice>,
    pub(crate) pos: u64,
    pub(crate) mode: IoMode,
    interrupt: Interrupt,
}

impl FifoFile {
    pub(crate) fn new(device: Arc<FifoDevice>, mode: IoMode) -> Self {
        Self {
            device,
            pos: 0,
            mode,
            interrupt: Interrupt::new(),
        }
    }

    /// The device this handle is bound to
    #[must_use]
    pub fn device(&self) -> &Arc<FifoDevice> {
        &self.device
    }

    #[must_use]
    pub fn mode(&self) -> IoMode {
        self.mode
    }

    /// Switch between blocking and non-blocking mode (`fcntl(F_SETFL)`)
    pub fn set_nonblocking(&mut self, nonblocking: bool) {
        self.mode = IoMode::from_nonblocking(nonblocking);
    }

    /// Current position cursor
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move the position cursor
    ///
    /// Positions past the device capacity are accepted; reads and writes
    /// there transfer nothing.
    pub fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Interrupt source that aborts this handle's blocked calls
    #[must_use]
    pub fn interrupter(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Read into `buf`, see [`FifoDevice::read`]
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::read`].
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FifoError> {
        self.read_into(buf)
    }

    /// Read into any caller sink
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::read`].
    pub fn read_into<S>(&mut self, dst: &mut S) -> Result<usize, FifoError>
    where
        S: UserSink + ?Sized,
    {
        self.device
            .read(&mut self.pos, dst, self.mode, &self.interrupt)
    }

    /// Read up to `max_len` bytes and return them
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::read`].
    pub fn read_vec(&mut self, max_len: usize) -> Result<Vec<u8>, FifoError> {
        let mut buf = vec![0u8; max_len];
        let n = self.read(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Write from `data`, see [`FifoDevice::write`]
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::write`].
    pub fn write(&mut self, data: &[u8]) -> Result<usize, FifoError> {
        self.write_from(data)
    }

    /// Write from any caller source
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::write`].
    pub fn write_from<S>(&mut self, src: &S) -> Result<usize, FifoError>
    where
        S: UserSource + ?Sized,
    {
        self.device.write(self.pos, src, self.mode, &self.interrupt)
    }

    /// Execute a control command on the device
    ///
    /// # Errors
    ///
    /// [`FifoError::InvalidCommand`] for an unknown opcode.
    pub fn ioctl(&self, cmd: u32) -> Result<(), FifoError> {
        self.device.ioctl(cmd)
    }

    /// Discard the device's buffered data
    pub fn clear(&self) {
        self.device.clear();
    }

    /// Release the handle
    ///
    /// Buffered data stays in the device for the next opener.
    pub fn close(self) {}
}

impl fmt::Debug for FifoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FifoFile(minor={}, pos={}, mode={:?})",
            self.device.minor(),
            self.pos,
            self.mode
        )
    }
}

/// `std::io` view of the handle
///
/// [`FifoError::Interrupted`] maps to [`io::ErrorKind::Interrupted`], which
/// `read_to_end`, `read_exact` and `io::copy` retry on their own. A raised
/// interrupter is consumed by the aborted call, so those helpers go back to
/// sleep; drive the handle with plain `read` calls when it must stay
/// cancellable.
impl io::Read for FifoFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FifoFile::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for FifoFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        FifoFile::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl embedded_io::ErrorType for FifoFile {
    type Error = FifoError;
}

impl embedded_io::Read for FifoFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        FifoFile::read(self, buf)
    }
}

impl embedded_io::Write for FifoFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        FifoFile::write(self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
