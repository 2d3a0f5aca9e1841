//! Control commands (ioctl opcodes)
//!
//! Opcodes follow the Linux `_IO(type, nr)` encoding: no data direction and
//! no argument size, so only the magic type byte and the command number are
//! set.

use crate::error::FifoError;

/// Magic type byte shared by all FIFO commands
pub const GLOBALFIFO_MAGIC: u8 = b'g';

/// Encode an argument-less command, like the `_IO` macro
#[must_use]
pub const fn io(ty: u8, nr: u8) -> u32 {
    ((ty as u32) << 8) | nr as u32
}

/// Discard all buffered data
pub const FIFO_CLEAR: u32 = io(GLOBALFIFO_MAGIC, 0);

/// Decoded control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Clear,
}

impl Command {
    #[must_use]
    pub fn opcode(self) -> u32 {
        match self {
            Command::Clear => FIFO_CLEAR,
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = FifoError;

    fn try_from(cmd: u32) -> Result<Self, Self::Error> {
        match cmd {
            FIFO_CLEAR => Ok(Command::Clear),
            other => Err(FifoError::InvalidCommand(other)),
        }
    }
}

impl From<Command> for u32 {
    fn from(cmd: Command) -> Self {
        cmd.opcode()
    }
}
