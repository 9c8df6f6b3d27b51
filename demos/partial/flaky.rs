use std::sync::atomic::{AtomicUsize, Ordering};

use crate::markers::{lazy_property, partial};

/// A value whose first computation fails.
#[partial]
#[derive(Debug, Default)]
pub struct Flaky {
    attempts: AtomicUsize,
}

#[partial]
impl Flaky {
    /// How often the computation was started.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    #[lazy_property("Value", thread_safe = true)]
    fn compute(&self) -> u64 {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first attempt fails");
        }
        42
    }
}
