//! Bounded blocking FIFO devices
//!
//! A [`FifoPool`] owns a fixed set of [`FifoDevice`]s. Each device is a
//! fixed-capacity byte queue: writers append, readers consume from the front,
//! and both sides either sleep or fail with [`FifoError::WouldBlock`] when
//! the queue is full or empty. Handles ([`FifoFile`]) carry the per-open
//! state: position cursor, blocking mode and interrupt source.
//!
//! ```
//! use globalfifo::{FifoPool, IoMode};
//!
//! let pool = FifoPool::default();
//! let mut writer = pool.open(0, IoMode::Blocking).unwrap();
//! let mut reader = pool.open(0, IoMode::NonBlocking).unwrap();
//!
//! assert_eq!(writer.write(b"hello").unwrap(), 5);
//! assert_eq!(reader.read_vec(16).unwrap(), b"hello");
//! assert!(reader.read_vec(16).is_err()); // empty, would block
//! ```

pub mod async_file;
pub mod config;
pub mod control;
pub mod error;
pub mod fifo;
pub mod file;
pub mod interrupt;
pub mod io;
pub mod pool;

pub use config::{ConfigError, FifoConfig, DEVICE_NUM, FIFO_SIZE};
pub use control::{Command, FIFO_CLEAR, GLOBALFIFO_MAGIC};
pub use error::FifoError;
pub use fifo::{FifoDevice, IoMode};
pub use file::FifoFile;
pub use interrupt::Interrupt;
pub use io::{FifoBuffer, UserFault, UserSink, UserSource};
pub use pool::FifoPool;
