use bakery::{BakeryLock, ThreadRegistry};
use std::collections::HashSet;
use std::sync::Barrier;
use std::thread;

#[test]
fn test_same_thread_keeps_its_slot() {
    let registry = ThreadRegistry::<4>::new();
    assert!(registry.is_empty());
    assert!(registry.current_slot().is_none());

    let first = registry.slot_for_current_thread().unwrap();
    let second = registry.slot_for_current_thread().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.index(), 0);
    assert_eq!(registry.current_slot(), Some(first));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_racing_threads_get_distinct_dense_slots() {
    const THREADS: usize = 8;
    let registry = ThreadRegistry::<THREADS>::new();
    let barrier = Barrier::new(THREADS);
    let (registry_ref, barrier) = (&registry, &barrier);

    let slots: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(move || {
                    barrier.wait();
                    registry_ref.slot_for_current_thread().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let indices: HashSet<_> = slots.iter().map(|slot| slot.index()).collect();
    assert_eq!(indices, (0..THREADS).collect::<HashSet<_>>());
    assert!(registry.is_full());
}

#[test]
fn test_full_registry_rejects_newcomers_only() {
    let registry = ThreadRegistry::<2>::new();
    let mine = registry.slot_for_current_thread().unwrap();

    thread::scope(|s| {
        s.spawn(|| registry.slot_for_current_thread().unwrap())
            .join()
            .unwrap();
    });

    thread::scope(|s| {
        let err = s
            .spawn(|| registry.slot_for_current_thread().unwrap_err())
            .join()
            .unwrap();
        assert_eq!(err.capacity(), 2);
    });

    // Existing owners still resolve.
    assert_eq!(registry.slot_for_current_thread(), Ok(mine));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_dump_lists_threads_in_slot_order() {
    let lock = BakeryLock::<3>::new();
    let main_slot = lock.register().unwrap();

    let worker_id = thread::scope(|s| {
        s.spawn(|| {
            lock.register().unwrap();
            thread::current().id()
        })
        .join()
        .unwrap()
    });

    let dump = lock.dump();
    assert_eq!(dump.len(), 2);
    assert_eq!(dump[0], (thread::current().id(), main_slot));
    assert_eq!(dump[1].0, worker_id);
    assert_eq!(dump[1].1.index(), 1);
}

#[test]
fn test_registration_does_not_touch_lock_state() {
    let lock = BakeryLock::<2>::new();
    let slot = lock.register().unwrap();

    assert_eq!(lock.ticket(slot), 0);
    assert!(!lock.is_choosing(slot));
    assert_eq!(lock.snapshot().registered(), 1);
    assert!(lock.snapshot().is_quiescent());
}
