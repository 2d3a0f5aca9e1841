//! Caller memory boundary
//!
//! Data crosses between the caller and a device through these traits, the
//! way a driver goes through `copy_from_user` / `copy_to_user`. Plain byte
//! slices never fault; other implementations (mapped memory, test doubles)
//! may report a [`UserFault`], which the device turns into
//! [`crate::FifoError::InvalidBuffer`] without touching its state.

/// A copy between caller memory and a device failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFault;

/// Caller-owned bytes to be copied into a device
pub trait UserSource {
    /// Number of bytes the caller offers
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the first `dst.len()` bytes into `dst`
    ///
    /// `dst.len()` never exceeds `self.len()`.
    fn copy_to(&self, dst: &mut [u8]) -> Result<(), UserFault>;
}

/// Caller-owned destination for bytes copied out of a device
pub trait UserSink {
    /// Number of bytes the caller can accept
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `src` into the first `src.len()` bytes of the destination
    ///
    /// `src.len()` never exceeds `self.len()`.
    fn copy_from(&mut self, src: &[u8]) -> Result<(), UserFault>;
}

impl UserSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, dst: &mut [u8]) -> Result<(), UserFault> {
        let src = self.get(..dst.len()).ok_or(UserFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserSink for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_from(&mut self, src: &[u8]) -> Result<(), UserFault> {
        let dst = self.get_mut(..src.len()).ok_or(UserFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}
