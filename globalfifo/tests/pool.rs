use globalfifo::{ConfigError, FifoConfig, FifoError, FifoPool, IoMode, DEVICE_NUM, FIFO_SIZE};

#[test]
fn test_default_pool_layout() {
    let pool = FifoPool::default();
    assert_eq!(pool.len(), DEVICE_NUM);
    assert_eq!(pool.len(), 2);
    for (minor, device) in pool.iter().enumerate() {
        assert_eq!(device.minor(), minor);
        assert_eq!(device.capacity(), FIFO_SIZE);
        assert!(device.is_empty());
    }
}

#[test]
fn test_devices_are_independent() {
    let pool = FifoPool::default();
    let mut first = pool.open(0, IoMode::NonBlocking).unwrap();
    let mut second = pool.open(1, IoMode::NonBlocking).unwrap();

    first.write(b"only in zero").unwrap();
    assert_eq!(second.read_vec(64), Err(FifoError::WouldBlock));

    second.write(b"one").unwrap();
    first.clear();
    assert_eq!(second.read_vec(64).unwrap(), b"one");
}

#[test]
fn test_opens_share_the_device() {
    let pool = FifoPool::default();
    let mut writer = pool.open(1, IoMode::Blocking).unwrap();
    let mut reader = pool.open(1, IoMode::NonBlocking).unwrap();

    writer.write(b"shared").unwrap();
    assert_eq!(reader.read_vec(3).unwrap(), b"sha");

    let mut late = pool.open(1, IoMode::NonBlocking).unwrap();
    assert_eq!(late.read_vec(16).unwrap(), b"red");
}

#[test]
fn test_open_unknown_minor() {
    let pool = FifoPool::default();
    let err = pool.open(2, IoMode::Blocking).unwrap_err();
    assert_eq!(err, FifoError::NoDevice(2));
    assert_eq!(err.errno(), 19);
    assert!(pool.device(2).is_none());
}

#[test]
fn test_custom_config() {
    let pool = FifoPool::new(FifoConfig {
        devices: 3,
        capacity: 8,
    })
    .unwrap();
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.config().capacity, 8);

    let mut file = pool.open(2, IoMode::NonBlocking).unwrap();
    assert_eq!(file.write(b"0123456789"), Ok(8));
}

#[test]
fn test_invalid_config_rejected() {
    let err = FifoPool::new(FifoConfig {
        devices: 2,
        capacity: 0,
    })
    .unwrap_err();
    assert_eq!(err, ConfigError::Zero("capacity"));
}
