//! Storage and caller-memory primitives used by the FIFO devices
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  FifoDevice (coordination layer)    │
//! │  - mutex + two condvars             │
//! │  - blocking / non-blocking waits    │
//! └─────────────────────────────────────┘
//!          ▲
//!          │ uses FifoBuffer for storage
//!          ▼
//! ┌─────────────────────────────────────┐
//! │  FifoBuffer (fixed storage)         │
//! │  - push() appends at the end        │
//! │  - pop() consumes from the front    │
//! └─────────────────────────────────────┘
//!          ▲
//!          │ copies through
//!          ▼
//! ┌─────────────────────────────────────┐
//! │  UserSource / UserSink              │
//! │  - caller memory, may fault         │
//! └─────────────────────────────────────┘
//! ```

pub mod buffer;
pub mod user;

pub use buffer::FifoBuffer;
pub use user::{UserFault, UserSink, UserSource};
