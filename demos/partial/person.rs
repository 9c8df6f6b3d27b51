use std::cell::Cell;

use crate::markers::{lazy_property, partial};

/// A person whose full name is assembled once.
#[partial]
#[derive(Debug, Default)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    calls: Cell<usize>,
}

#[partial]
impl Person {
    /// Create a person.
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// How often the full name was assembled.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    #[lazy_property("FullName")]
    fn get_full_name(&self) -> String {
        self.calls.set(self.calls.get() + 1);
        format!("{} {}", self.first_name, self.last_name)
    }
}
