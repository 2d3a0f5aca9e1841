//! Error type shared by the FIFO devices, their handles and the pool

use std::io;

/// Errors returned by FIFO operations
///
/// Every variant has a Linux errno analogue (see [`FifoError::errno`]), so a
/// boundary layer that speaks errno can translate without guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FifoError {
    /// Non-blocking call whose condition cannot be satisfied right now
    #[error("operation would block")]
    WouldBlock,

    /// Blocking call was interrupted while waiting; no data was transferred
    #[error("interrupted while waiting")]
    Interrupted,

    /// Unrecognized control command
    #[error("invalid control command {0:#x}")]
    InvalidCommand(u32),

    /// Copy between the caller's memory and the device failed
    #[error("bad caller buffer")]
    InvalidBuffer,

    /// No device with this minor number
    #[error("no such device: minor {0}")]
    NoDevice(usize),
}

impl FifoError {
    /// Linux errno for this error
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub fn errno(&self) -> i32 {
        match self {
            FifoError::WouldBlock => 11,        // EAGAIN
            FifoError::Interrupted => 4,        // EINTR
            FifoError::InvalidCommand(_) => 22, // EINVAL
            FifoError::InvalidBuffer => 14,     // EFAULT
            FifoError::NoDevice(_) => 19,       // ENODEV
        }
    }

    /// Whether retrying the same call later can succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, FifoError::WouldBlock | FifoError::Interrupted)
    }
}

impl From<FifoError> for io::Error {
    fn from(e: FifoError) -> Self {
        let kind = match e {
            FifoError::WouldBlock => io::ErrorKind::WouldBlock,
            FifoError::Interrupted => io::ErrorKind::Interrupted,
            FifoError::InvalidCommand(_) => io::ErrorKind::InvalidInput,
            FifoError::InvalidBuffer => io::ErrorKind::InvalidData,
            FifoError::NoDevice(_) => io::ErrorKind::NotFound,
        };
        io::Error::new(kind, e)
    }
}

impl embedded_io::Error for FifoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            // embedded_io has no would-block kind
            FifoError::WouldBlock => embedded_io::ErrorKind::Other,
            FifoError::Interrupted => embedded_io::ErrorKind::Interrupted,
            FifoError::InvalidCommand(_) => embedded_io::ErrorKind::InvalidInput,
            FifoError::InvalidBuffer => embedded_io::ErrorKind::InvalidData,
            FifoError::NoDevice(_) => embedded_io::ErrorKind::NotFound,
        }
    }
}
