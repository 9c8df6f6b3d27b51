use std::cell::Cell;
use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use lazyprop::internal::{AtomicFlag, Flag, Lock, Storage};

fn assert_sync<T: Sync>() {}
fn assert_send<T: Send>() {}

/// A property laid out like the generator lays out a thread-safe property.
#[derive(Default)]
#[allow(non_snake_case)]
struct Shared {
    calls: AtomicUsize,
    _valueStorage: Storage<String>,
    _valueWritten: AtomicFlag,
    _valueMutex: Lock,
}

impl Shared {
    fn compute(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        "computed".into()
    }

    #[allow(non_snake_case)]
    fn Value(&self) -> &String {
        if !self._valueWritten.get() {
            let _guard = self._valueMutex.lock();
            if !self._valueWritten.get() {
                let value = self.compute();
                unsafe { self._valueStorage.put(value) };
                self._valueWritten.set();
            }
        }
        unsafe { self._valueStorage.get() }
    }
}

/// A property laid out like the generator lays out a plain property.
#[derive(Default)]
#[allow(non_snake_case)]
struct Local {
    calls: Cell<usize>,
    _valueStorage: Storage<u32>,
    _valueWritten: Flag,
}

impl Local {
    #[allow(non_snake_case)]
    fn Value(&self) -> &u32 {
        if !self._valueWritten.get() {
            self.calls.set(self.calls.get() + 1);
            unsafe { self._valueStorage.put(42) };
            self._valueWritten.set();
        }
        unsafe { self._valueStorage.get() }
    }
}

/// Test the auto traits of the primitives.
#[test]
fn test_auto_traits() {
    assert_sync::<Storage<String>>();
    assert_send::<Storage<String>>();
    assert_sync::<AtomicFlag>();
    assert_sync::<Lock>();
    assert_sync::<Shared>();
    assert_send::<Local>();
}

/// Test that the double-checked sequence computes exactly once.
#[test]
fn test_double_checked_locking() {
    let shared = Shared::default();
    let barrier = Barrier::new(8);
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                barrier.wait();
                assert_eq!(shared.Value(), "computed");
            });
        }
    });
    assert_eq!(shared.calls.load(Ordering::SeqCst), 1);
    assert_eq!(shared.Value(), "computed");
}

/// Test the plain sequence.
#[test]
fn test_single_threaded() {
    let local = Local::default();
    assert_eq!(*local.Value(), 42);
    assert_eq!(*local.Value(), 42);
    assert_eq!(local.calls.get(), 1);
}

/// Test that the lock is reentrant on one thread.
#[test]
fn test_lock_reentrant() {
    let lock = Lock::new();
    let _outer = lock.lock();
    let _inner = lock.lock();
    assert_eq!(format!("{lock:?}"), "Lock(..)");
}
