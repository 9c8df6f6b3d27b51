use crate::markers::{lazy_property, partial};

/// A generic container with a derived list.
#[partial]
#[derive(Debug, Default)]
pub struct Wrapper<T> {
    pub items: Vec<T>,
}

impl<T: Default> Wrapper<T> {
    /// Wrap a list of items.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, ..Default::default() }
    }
}

#[partial]
impl<T: Clone> Wrapper<T> {
    #[lazy_property("Doubled")]
    fn doubled(&self) -> Vec<T> {
        self.items.iter().chain(&self.items).cloned().collect()
    }
}
