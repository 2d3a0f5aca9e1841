//! FifoPool - owns the device instances
//!
//! A fixed set of devices is created when the pool is built and lives until
//! the pool and every handle on it are dropped. Devices are addressed by
//! minor number.

use std::sync::Arc;

use crate::config::{ConfigError, FifoConfig};
use crate::error::FifoError;
use crate::fifo::{FifoDevice, IoMode};
use crate::file::FifoFile;

/// Pool of independent FIFO devices
pub struct FifoPool {
    devices: Vec<Arc<FifoDevice>>,
    config: FifoConfig,
}

impl FifoPool {
    /// Create the devices described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the config has zero devices or zero capacity.
    pub fn new(config: FifoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: FifoConfig) -> Self {
        let devices = (0..config.devices)
            .map(|minor| {
                let device = FifoDevice::new(minor, config.capacity);
                log::info!("setup globalfifo{minor}, capacity {}", config.capacity);
                device
            })
            .collect();

        Self { devices, config }
    }

    #[must_use]
    pub fn config(&self) -> &FifoConfig {
        &self.config
    }

    /// Number of devices
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Get the device with the given minor number
    #[must_use]
    pub fn device(&self, minor: usize) -> Option<&Arc<FifoDevice>> {
        self.devices.get(minor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FifoDevice>> {
        self.devices.iter()
    }

    /// Open a handle on the device with the given minor number
    ///
    /// Multiple handles can be open on the same device; they share its
    /// buffer.
    ///
    /// # Errors
    ///
    /// [`FifoError::NoDevice`] if there is no such minor.
    pub fn open(&self, minor: usize, mode: IoMode) -> Result<FifoFile, FifoError> {
        self.device(minor)
            .map(|device| device.open(mode))
            .ok_or(FifoError::NoDevice(minor))
    }
}

impl Default for FifoPool {
    fn default() -> Self {
        Self::build(FifoConfig::default())
    }
}

impl std::fmt::Debug for FifoPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoPool")
            .field("devices", &self.devices.len())
            .field("capacity", &self.config.capacity)
            .finish()
    }
}
