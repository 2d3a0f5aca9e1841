use std::thread;
use std::time::Duration;

use globalfifo::{FifoDevice, FifoError, IoMode};

async fn wait_until(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_write_read_async() {
    let device = FifoDevice::new(0, 16);
    let mut file = device.open(IoMode::Blocking);

    assert_eq!(file.write_async(b"async").await, Ok(5));
    assert_eq!(file.read_async(16).await.unwrap(), b"async");
    assert_eq!(file.position(), 5);
}

#[tokio::test]
async fn test_read_async_waits_for_writer_thread() {
    let device = FifoDevice::new(0, 16);
    let mut reader = device.open(IoMode::Blocking);

    let writer_device = device.clone();
    let writer = thread::spawn(move || {
        while writer_device.blocked_readers() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        writer_device.open(IoMode::Blocking).write(b"late").unwrap()
    });

    assert_eq!(reader.read_async(16).await.unwrap(), b"late");
    assert_eq!(writer.join().unwrap(), 4);
}

#[tokio::test]
async fn test_nonblocking_async_fails_fast() {
    let device = FifoDevice::new(0, 4);
    let mut file = device.open(IoMode::NonBlocking);
    assert_eq!(file.read_async(4).await, Err(FifoError::WouldBlock));
}

#[tokio::test]
async fn test_dropped_read_is_interrupted() {
    let device = FifoDevice::new(0, 16);
    let mut reader = device.open(IoMode::Blocking);

    // Drop the read future once its blocking call is asleep
    tokio::select! {
        _ = reader.read_async(16) => panic!("read completed on an empty device"),
        () = wait_until(|| device.blocked_readers() == 1) => {}
    }

    // The blocking call was woken and gave up without consuming anything
    wait_until(|| device.blocked_readers() == 0).await;
    assert_eq!(reader.position(), 0);

    let mut writer = device.open(IoMode::Blocking);
    writer.write(b"kept").unwrap();
    assert_eq!(reader.read_async(16).await.unwrap(), b"kept");
}

#[tokio::test]
async fn test_rewound_reader_blocks_after_a_full_device_of_reads() {
    let device = FifoDevice::new(0, 8);
    let mut writer = device.open(IoMode::Blocking);
    let mut reader = device.open(IoMode::Blocking);

    writer.write(b"ABCDEFGH").unwrap();
    for expected in [b"ABCD", b"EFGH"] {
        reader.seek(0);
        assert_eq!(reader.read_async(4).await.unwrap(), expected);
    }

    // Without the rewind the cursor would sit at the end and read nothing
    reader.seek(0);
    tokio::select! {
        _ = reader.read_async(4) => panic!("read returned on an empty device"),
        () = wait_until(|| device.blocked_readers() == 1) => {}
    }
    wait_until(|| device.blocked_readers() == 0).await;

    writer.write(b"IJ").unwrap();
    reader.seek(0);
    assert_eq!(reader.read_async(4).await.unwrap(), b"IJ");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_write_all_async_through_small_device() {
    let device = FifoDevice::new(0, 4);
    let mut writer = device.open(IoMode::Blocking);
    let mut reader = device.open(IoMode::Blocking);

    let consumer = tokio::spawn(async move {
        let mut received = Vec::new();
        while received.len() < 26 {
            reader.seek(0);
            received.extend(reader.read_async(3).await.unwrap());
        }
        received
    });

    let data: Vec<u8> = (b'a'..=b'z').collect();
    assert_eq!(writer.write_all_async(&data).await, Ok(26));
    assert_eq!(consumer.await.unwrap(), data);
}

#[tokio::test]
async fn test_write_all_async_stops_past_end() {
    let device = FifoDevice::new(0, 4);
    let mut writer = device.open(IoMode::Blocking);
    writer.seek(5);
    assert_eq!(writer.write_all_async(b"ignored").await, Ok(0));
    assert!(device.is_empty());
}
