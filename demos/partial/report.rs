use std::sync::atomic::{AtomicUsize, Ordering};

use crate::markers::{lazy_property, partial};

/// The name of the average property.
pub const AVERAGE: &str = "Average";

/// Whether the second total is guarded by a lock.
pub const SHARED: bool = true;

/// Statistics over a list of values.
#[partial]
#[derive(Debug, Default)]
pub struct Report {
    pub values: Vec<u32>,
    totals: AtomicUsize,
}

#[partial]
impl Report {
    /// Create a report.
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, ..Default::default() }
    }

    /// How often the values were summed up.
    pub fn totals(&self) -> usize {
        self.totals.load(Ordering::SeqCst)
    }

    /// Whether the average has been computed yet.
    pub fn has_average(&self) -> bool {
        self._avgWritten.get()
    }

    #[lazy_property("Total")]
    #[lazy_property("TotalAgain", thread_safe = SHARED)]
    fn total(&self) -> u32 {
        self.totals.fetch_add(1, Ordering::SeqCst);
        self.values.iter().sum()
    }

    #[lazy_property(AVERAGE, field_prefix = "_avg")]
    fn average(&self) -> u32 {
        match self.values.len() {
            0 => 0,
            len => self.values.iter().sum::<u32>() / len as u32,
        }
    }

    /// Markers that cannot be used are skipped without an error.
    #[lazy_property("Left", "Right")]
    #[lazy_property(42)]
    #[lazy_property("not an identifier")]
    pub fn unused(&self) -> u32 {
        0
    }
}
