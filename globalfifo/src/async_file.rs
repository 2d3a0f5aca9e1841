//! Async adapters for FIFO handles
//!
//! The device blocks the calling thread, so async callers run the blocking
//! call on tokio's blocking pool. Each call gets its own [`Interrupt`]; if
//! the returned future is dropped before it completes (a `select!` branch
//! losing, a timeout), the interrupt is raised and the blocked call returns
//! early instead of pinning a blocking thread.
//!
//! Cancellation is clean while the call is still sleeping: nothing has been
//! transferred yet. Bytes consumed by a read that completed just as its
//! future was dropped are lost, as with any cancelled read.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::FifoError;
use crate::fifo::FifoDevice;
use crate::file::FifoFile;
use crate::interrupt::Interrupt;

/// Raises the interrupt on drop unless disarmed
struct InterruptOnDrop {
    interrupt: Interrupt,
    armed: bool,
}

impl InterruptOnDrop {
    fn new(interrupt: Interrupt) -> Self {
        Self {
            interrupt,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if self.armed {
            trace!("async fifo call dropped, interrupting");
            self.interrupt.raise();
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, FifoError>
where
    T: Send + 'static,
    F: FnOnce(&Interrupt) -> Result<T, FifoError> + Send + 'static,
{
    let interrupt = Interrupt::new();
    let mut guard = InterruptOnDrop::new(interrupt.clone());
    let task = tokio::task::spawn_blocking(move || f(&interrupt));
    let result = match task.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        // Runtime shutting down
        Err(_) => Err(FifoError::Interrupted),
    };
    guard.disarm();
    result
}

impl FifoFile {
    /// Async version of [`FifoFile::read_vec`]
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::read`].
    pub async fn read_async(&mut self, max_len: usize) -> Result<Vec<u8>, FifoError> {
        let device: Arc<FifoDevice> = Arc::clone(&self.device);
        let mode = self.mode;
        let mut pos = self.pos;
        debug!(minor = device.minor(), max_len, "async read");

        let (data, pos) = run_blocking(move |interrupt| {
            let mut buf = vec![0u8; max_len];
            let n = device.read(&mut pos, &mut buf[..], mode, interrupt)?;
            buf.truncate(n);
            Ok((buf, pos))
        })
        .await?;

        self.pos = pos;
        Ok(data)
    }

    /// Async version of [`FifoFile::write`]
    ///
    /// # Errors
    ///
    /// See [`FifoDevice::write`].
    pub async fn write_async(&mut self, data: &[u8]) -> Result<usize, FifoError> {
        let device: Arc<FifoDevice> = Arc::clone(&self.device);
        let mode = self.mode;
        let pos = self.pos;
        let data = data.to_vec();
        debug!(minor = device.minor(), len = data.len(), "async write");

        run_blocking(move |interrupt| device.write(pos, &data[..], mode, interrupt)).await
    }

    /// Write `data`, waiting for room as needed
    ///
    /// Returns the number of bytes written: all of `data`, unless the
    /// cursor is past the end of the device and nothing is accepted.
    ///
    /// # Errors
    ///
    /// The first error from [`FifoFile::write_async`]; bytes written before
    /// it stay in the device.
    pub async fn write_all_async(&mut self, data: &[u8]) -> Result<usize, FifoError> {
        let mut written = 0;
        while written < data.len() {
            let n = self.write_async(&data[written..]).await?;
            if n == 0 {
                break;
            }
            written += n;
        }
        Ok(written)
    }
}
