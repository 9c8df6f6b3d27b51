use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use lazyprop::{lazy_property, partial};

/// A sum that may be requested from many threads at once.
#[partial]
#[derive(Debug, Default)]
pub struct Calc {
    pub a: i32,
    pub b: i32,
    calls: AtomicUsize,
}

#[partial]
impl Calc {
    /// Create a calculator for `a + b`.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b, ..Default::default() }
    }

    /// How often the sum was computed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[lazy_property("Sum", thread_safe = true)]
    fn get_sum(&self) -> i32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which other threads may race for the lock.
        thread::sleep(Duration::from_millis(20));
        self.a + self.b
    }
}
