//! Lazily computed, cached properties generated at build time.
//!
//! Annotate a zero-argument method inside a `#[partial]` impl block of a
//! `#[partial]` struct and let `lazyprop-build` generate the property from a
//! build script:
//!
//! ```ignore
//! use lazyprop::{lazy_property, partial};
//!
//! #[partial]
//! #[derive(Default)]
//! pub struct Person {
//!     pub first_name: String,
//!     pub last_name: String,
//! }
//!
//! #[partial]
//! impl Person {
//!     #[lazy_property("FullName")]
//!     fn get_full_name(&self) -> String {
//!         format!("{} {}", self.first_name, self.last_name)
//!     }
//! }
//! ```
//!
//! After generation, `person.FullName()` computes the name on first access and
//! returns the cached value on every further access. Pass `thread_safe = true`
//! to guard the first computation with a dedicated lock.

mod cell;

#[cfg(feature = "macros")]
pub use lazyprop_macros::{lazy_property, partial};

/// These are implementation details used by generated code. Do not rely on
/// them!
#[doc(hidden)]
pub mod internal {
    pub use crate::cell::{AtomicFlag, Flag, Lock, Storage};
}
