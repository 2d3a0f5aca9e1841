//! Startup configuration for the device pool
//!
//! Both values are read once when the pool is built and never change
//! afterwards.

/// Bytes per device
pub const FIFO_SIZE: usize = 0x1000;

/// Devices per pool
pub const DEVICE_NUM: usize = 2;

/// Environment variable overriding [`FifoConfig::devices`]
pub const ENV_DEVICES: &str = "GLOBALFIFO_DEVICES";

/// Environment variable overriding [`FifoConfig::capacity`]
pub const ENV_CAPACITY: &str = "GLOBALFIFO_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: not a number: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be greater than 0")]
    Zero(&'static str),
}

/// Pool layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoConfig {
    /// Number of devices (minor numbers `0..devices`)
    pub devices: usize,
    /// Buffer capacity of each device in bytes
    pub capacity: usize,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            devices: DEVICE_NUM,
            capacity: FIFO_SIZE,
        }
    }
}

impl FifoConfig {
    /// Defaults overridden by `GLOBALFIFO_DEVICES` / `GLOBALFIFO_CAPACITY`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the variable names
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_DEVICES) {
            config.devices = parse(ENV_DEVICES, &value)?;
        }
        if let Some(value) = lookup(ENV_CAPACITY) {
            config.capacity = parse(ENV_CAPACITY, &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if either field is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices == 0 {
            return Err(ConfigError::Zero("devices"));
        }
        if self.capacity == 0 {
            return Err(ConfigError::Zero("capacity"));
        }
        Ok(())
    }
}

fn parse(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
}
