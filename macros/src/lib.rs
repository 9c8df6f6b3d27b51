extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("lazyprop: ", $fmt) $($tts)*)
        ))
    }
}

mod marker;

use proc_macro::TokenStream;
use syn::{Error, Result};

/// Expose a zero-argument method as a lazily computed, cached property.
///
/// The attribute itself does nothing. `lazyprop-build` picks it up from a
/// build script and generates the property into the method's `#[partial]`
/// type.
///
/// ```ignore
/// #[partial]
/// impl Person {
///     #[lazy_property("FullName")]
///     fn get_full_name(&self) -> String {
///         format!("{} {}", self.first_name, self.last_name)
///     }
///
///     #[lazy_property("Initials", thread_safe = true, field_prefix = "_ini")]
///     fn get_initials(&self) -> String {
///         self.first_name.chars().take(1).chain(self.last_name.chars().take(1)).collect()
///     }
/// }
/// ```
///
/// The first argument is the property name. The optional `thread_safe` flag
/// guards the first computation with a lock, and `field_prefix` overrides the
/// prefix of the generated backing fields, which defaults to an underscore
/// followed by the property name with a lower-cased first letter.
#[proc_macro_attribute]
pub fn lazy_property(_: TokenStream, stream: TokenStream) -> TokenStream {
    marker::expand_lazy_property(stream.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Mark a struct or an impl block as extensible by generated code.
///
/// Generated fields are merged into the struct and generated methods are
/// added in a separate impl block next to it.
///
/// ```ignore
/// #[partial]
/// #[derive(Default)]
/// pub struct Person {
///     pub first_name: String,
///     pub last_name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn partial(_: TokenStream, stream: TokenStream) -> TokenStream {
    marker::expand_partial(stream.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
