//! FIFO CLI Demo
//!
//! Writes stdin lines into `globalfifo0` while two readers consume it in
//! small chunks. Once input ends and the FIFO drains, the readers are
//! cancelled.
//!
//! Try `GLOBALFIFO_CAPACITY=8 RUST_LOG=debug cargo run --bin fifo_demo` to
//! watch the writer block on a full FIFO.

use std::time::Duration;

use globalfifo::{FifoConfig, FifoError, FifoFile, FifoPool, IoMode};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pool = FifoPool::new(FifoConfig::from_env()?)?;
    let device = pool.device(0).ok_or(FifoError::NoDevice(0))?.clone();

    let writer = pool.open(0, IoMode::Blocking)?;
    let reader1 = pool.open(0, IoMode::Blocking)?;
    let reader2 = pool.open(0, IoMode::Blocking)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let writer_task = tokio::spawn(write_lines(writer));
    let reader1_task = tokio::spawn(read_all("r1", reader1, shutdown_rx.clone()));
    let reader2_task = tokio::spawn(read_all("r2", reader2, shutdown_rx));

    writer_task.await?;
    while !device.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown_tx.send(true)?;

    let _ = tokio::join!(reader1_task, reader2_task);

    println!("All tasks completed");
    Ok(())
}

async fn write_lines(mut file: FifoFile) {
    println!("Enter text (empty line to quit):");

    let stdin = tokio::io::stdin();
    let reader = tokio::io::BufReader::new(stdin);
    let mut lines = tokio::io::AsyncBufReadExt::lines(reader);

    while let Ok(Some(line)) = lines.next_line().await {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }

        if let Err(e) = file.write_all_async(trimmed.as_bytes()).await {
            eprintln!("Write error: {e} (errno={})", e.errno());
            break;
        }
    }

    println!("Writer done");
}

async fn read_all(name: &str, mut file: FifoFile, mut shutdown: watch::Receiver<bool>) {
    loop {
        // Reads advance the cursor; rewind so it never runs past the device
        file.seek(0);
        tokio::select! {
            result = file.read_async(4) => match result {
                Ok(data) => println!("({name}): {}", String::from_utf8_lossy(&data)),
                Err(e) => {
                    eprintln!("({name}) Error: {e} (errno={})", e.errno());
                    break;
                }
            },
            _ = shutdown.changed() => {
                println!("({name}) cancelled");
                break;
            }
        }
    }
}
