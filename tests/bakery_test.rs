use bakery::BakeryLock;
use std::cell::UnsafeCell;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A counter with no synchronization of its own; races would lose updates.
struct Unsynchronized(UnsafeCell<u64>);

// SAFETY: only touched inside the bakery critical section.
unsafe impl Sync for Unsynchronized {}

impl Unsynchronized {
    fn bump(&self) {
        unsafe {
            let value = std::ptr::read_volatile(self.0.get());
            thread::yield_now();
            std::ptr::write_volatile(self.0.get(), value + 1);
        }
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::yield_now();
    }
}

#[test]
fn test_mutual_exclusion_on_plain_counter() {
    const THREADS: usize = 4;
    const ITERS: u64 = 500;

    let lock = BakeryLock::<THREADS>::new();
    let counter = Unsynchronized(UnsafeCell::new(0));

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERS {
                    lock.acquire().unwrap();
                    counter.bump();
                    lock.release();
                }
            });
        }
    });

    assert_eq!(counter.0.into_inner(), THREADS as u64 * ITERS);
    assert!(lock.snapshot().is_quiescent());
}

#[test]
fn test_guard_and_with_lock_exclude_each_other() {
    let lock = BakeryLock::<3>::new();
    let counter = Unsynchronized(UnsafeCell::new(0));

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..300 {
                let _guard = lock.lock().unwrap();
                counter.bump();
            }
        });
        s.spawn(|| {
            for _ in 0..300 {
                lock.with_lock(|| counter.bump()).unwrap();
            }
        });
        for _ in 0..300 {
            lock.acquire().unwrap();
            counter.bump();
            lock.release();
        }
    });

    assert_eq!(counter.0.into_inner(), 900);
}

#[test]
fn test_no_deadlock_under_heavy_contention() {
    const THREADS: usize = 8;
    const ITERS: usize = 10_000;

    let lock = Arc::new(BakeryLock::<THREADS>::new());
    let (done_tx, done_rx) = mpsc::channel();

    let coordinator = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    let lock = Arc::clone(&lock);
                    thread::spawn(move || {
                        for _ in 0..ITERS {
                            lock.acquire().unwrap();
                            lock.release();
                        }
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }
            done_tx.send(()).unwrap();
        })
    };

    done_rx
        .recv_timeout(Duration::from_secs(300))
        .expect("bakery lock did not finish all acquisitions");
    coordinator.join().unwrap();
    assert_eq!(lock.registry().len(), THREADS);
}

#[test]
fn test_first_come_first_served() {
    let lock = BakeryLock::<3>::new();
    let holder = lock.register().unwrap();
    assert_eq!(holder.index(), 0);
    lock.acquire().unwrap();

    let order = Mutex::new(Vec::new());
    let lock = &lock;
    let order_ref = &order;

    let (early, late) = thread::scope(|s| {
        // The late thread registers first, so it owns the smaller slot id.
        let (late_slot_tx, late_slot_rx) = mpsc::channel();
        let (go_tx, go_rx) = mpsc::channel::<()>();
        s.spawn(move || {
            late_slot_tx.send(lock.register().unwrap()).unwrap();
            go_rx.recv().unwrap();
            let guard = lock.lock().unwrap();
            order_ref.lock().unwrap().push(guard.slot());
        });
        let late = late_slot_rx.recv().unwrap();
        assert_eq!(late.index(), 1);

        let (early_slot_tx, early_slot_rx) = mpsc::channel();
        s.spawn(move || {
            early_slot_tx.send(lock.register().unwrap()).unwrap();
            let guard = lock.lock().unwrap();
            order_ref.lock().unwrap().push(guard.slot());
        });
        let early = early_slot_rx.recv().unwrap();
        assert_eq!(early.index(), 2);

        // The early thread's doorway is complete before the late one starts.
        wait_until(|| lock.ticket(early) != 0 && !lock.is_choosing(early));
        go_tx.send(()).unwrap();
        wait_until(|| lock.ticket(late) != 0 && !lock.is_choosing(late));

        assert!(lock.ticket(early) < lock.ticket(late));
        assert_eq!(lock.snapshot().service_order(), vec![holder, early, late]);

        lock.release();
        (early, late)
    });

    assert_eq!(order.into_inner().unwrap(), vec![early, late]);
}

#[test]
fn test_capacity_exceeded_for_extra_thread() {
    let lock = BakeryLock::<3>::new();

    thread::scope(|s| {
        for _ in 0..3 {
            s.spawn(|| {
                lock.acquire().unwrap();
                lock.release();
            })
            .join()
            .unwrap();
        }
    });
    assert!(lock.registry().is_full());

    let err = lock.acquire().unwrap_err();
    assert_eq!(err.capacity(), 3);
    assert_eq!(err.to_string(), "bakery lock capacity of 3 threads exceeded");

    // The failed call leaves every slot untouched and consumes nothing.
    assert_eq!(lock.registry().len(), 3);
    assert!(lock.snapshot().is_quiescent());
    assert!(lock.lock().is_err());
    assert!(lock.with_lock(|| 1).is_err());
    assert!(lock.registry().current_slot().is_none());
}
