//! The marker attributes and their definition.

use crate::config::Config;
use crate::error::Result;
use crate::sink::OutputSink;

/// The attribute that turns a method into a property.
pub const LAZY_PROPERTY: &str = "lazy_property";

/// The attribute that makes structs and impl blocks extensible.
pub const PARTIAL: &str = "partial";

/// The named argument that enables locking.
pub const THREAD_SAFE: &str = "thread_safe";

/// The named argument that overrides the backing field prefix.
pub const FIELD_PREFIX: &str = "field_prefix";

/// The crate that defines the markers, usable directly as well.
pub const MACROS_CRATE: &str = "lazyprop_macros";

/// The key under which the marker definition is emitted.
pub const DEFINITION_KEY: &str = "lazyprop.markers.g.rs";

/// Whether a canonical path refers to the marker with the given name.
pub fn matches(krate: &str, canonical: &[String], name: &str) -> bool {
    match canonical {
        [first, last] => last == name && (first == krate || first == MACROS_CRATE),
        _ => false,
    }
}

/// Whether an external module exports the given marker name by glob.
pub fn exports(krate: &str, module: &[String], name: &str) -> bool {
    match module {
        [first] => (first == krate || first == MACROS_CRATE) && (name == LAZY_PROPERTY || name == PARTIAL),
        _ => false,
    }
}

/// The marker definition: a re-export of both markers from the runtime crate.
pub fn definition(config: &Config) -> syn::File {
    let krate = config.krate();
    syn::parse_quote! {
        #[allow(unused_imports)]
        pub use ::#krate::{lazy_property, partial};
    }
}

/// Emit the marker definition, if the configuration asks for it.
pub fn emit(config: &Config, sink: &mut dyn OutputSink) -> Result<()> {
    let Some(module) = config.marker_module() else {
        return Ok(());
    };

    tracing::debug!(module = %module, key = DEFINITION_KEY, "emitting marker definition");
    let text = crate::render(&definition(config));
    sink.add(DEFINITION_KEY, text)
}
