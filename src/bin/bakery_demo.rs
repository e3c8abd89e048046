//! Contends a `BakeryLock<4>` from three workers and the main thread.
//!
//! Run with `cargo run --bin bakery_demo`, or add `--features tracing` to get
//! registration and acquire/release events on stderr (requires a subscriber).

use anyhow::{Context, Result};
use bakery::BakeryLock;
use std::thread;
use std::time::Duration;

const THREADS: usize = 4;

fn main() -> Result<()> {
    let lock = BakeryLock::<THREADS>::new();

    // Claim the main thread's slot before any worker can.
    lock.register().context("registering the main thread")?;

    let lock = &lock;
    thread::scope(|s| -> Result<()> {
        let workers: Vec<_> = (0..THREADS - 1)
            .map(|_| {
                s.spawn(move || -> Result<()> {
                    let guard = lock.lock()?;
                    println!("Acquired lock in thread (slot {})", guard.slot());
                    thread::sleep(Duration::from_millis(50));
                    println!("Releasing lock in thread (slot {})", guard.slot());
                    drop(guard);
                    Ok(())
                })
            })
            .collect();

        lock.acquire()?;
        println!("Acquired lock");
        thread::sleep(Duration::from_millis(10));
        println!("Releasing lock");
        lock.release();

        for worker in workers {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })?;

    for (thread_id, slot) in lock.dump() {
        println!("{thread_id:?}:{slot}");
    }

    let snapshot = lock.snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("serializing lock snapshot")?
    );

    Ok(())
}
