use crate::error::{Error, Result};
use crate::source::ModulePath;

/// The name of the runtime crate, unless configured otherwise.
pub const DEFAULT_CRATE: &str = "lazyprop";

/// Settings shared by every stage of a generation pass.
#[derive(Debug, Clone)]
pub struct Config {
    /// The runtime crate as it is named in the generated code.
    krate: syn::Ident,
    /// Where the marker definition is included, if anywhere.
    marker_module: Option<ModulePath>,
}

impl Config {
    /// Create a configuration for a runtime crate with the given name.
    ///
    /// Dashes are accepted and replaced with underscores, as Cargo does.
    pub fn new(krate: &str) -> Result<Self> {
        let normalized = krate.replace('-', "_");
        let krate = syn::parse_str::<syn::Ident>(&normalized)
            .map_err(|_| Error::CrateName(krate.into()))?;
        Ok(Self { krate, marker_module: None })
    }

    /// Emit the marker definition into the given module.
    pub fn with_marker_module(mut self, module: ModulePath) -> Self {
        self.marker_module = Some(module);
        self
    }

    /// The runtime crate's identifier.
    pub fn krate(&self) -> &syn::Ident {
        &self.krate
    }

    /// The module the marker definition is emitted into.
    pub fn marker_module(&self) -> Option<&ModulePath> {
        self.marker_module.as_ref()
    }

    /// The path of the runtime support used by generated code.
    pub fn runtime(&self) -> syn::Path {
        let krate = &self.krate;
        syn::parse_quote! { ::#krate::internal }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            krate: syn::Ident::new(DEFAULT_CRATE, proc_macro2::Span::call_site()),
            marker_module: None,
        }
    }
}
