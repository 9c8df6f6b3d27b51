//! Emitting backing fields and accessors.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse_quote;

use crate::config::Config;
use crate::resolve::{CandidateMethod, LazyPropertySpec};

/// The generated members of one method.
#[derive(Debug, Clone)]
pub struct Members {
    /// Backing fields, to be merged into the struct.
    pub fields: Vec<syn::Field>,
    /// The accessors, in an impl block of their own.
    pub block: syn::ItemImpl,
}

/// Produce the fields and accessors for every spec of a method.
///
/// Each spec gets its own storage, written flag and, if thread-safe, lock.
/// Specs of the same method do not share anything: every accessor invokes
/// the method on its own.
pub fn synthesize(method: &CandidateMethod, config: &Config) -> Members {
    let runtime = config.runtime();
    let krate = config.krate();

    let fields = method
        .specs
        .iter()
        .flat_map(|spec| create_fields(spec, &method.output, &runtime))
        .collect();

    let accessors = method.specs.iter().map(|spec| create_accessor(method, spec));

    let self_ty = &method.self_ty;
    let (impl_generics, _, where_clause) = method.generics.split_for_impl();
    let block = parse_quote! {
        #[::#krate::partial]
        impl #impl_generics #self_ty #where_clause {
            #(#accessors)*
        }
    };

    Members { fields, block }
}

/// Produce the backing fields of a property.
fn create_fields(spec: &LazyPropertySpec, ty: &syn::Type, runtime: &syn::Path) -> Vec<syn::Field> {
    let storage = spec.storage_field();
    let written = spec.written_field();
    let flag = if spec.thread_safe {
        quote! { AtomicFlag }
    } else {
        quote! { Flag }
    };
    let mutex = spec.mutex_field().map(|mutex| {
        quote! {
            #[doc(hidden)]
            #[allow(non_snake_case)]
            #mutex: #runtime::Lock,
        }
    });

    let fields: syn::FieldsNamed = parse_quote! {{
        #[doc(hidden)]
        #[allow(non_snake_case)]
        #storage: #runtime::Storage<#ty>,
        #[doc(hidden)]
        #[allow(non_snake_case)]
        #written: #runtime::#flag,
        #mutex
    }};

    fields.named.into_iter().collect()
}

/// Produce the accessor of a property.
fn create_accessor(method: &CandidateMethod, spec: &LazyPropertySpec) -> TokenStream {
    let name = spec.property_ident();
    let call = &method.method;
    let ty = &method.output;
    let storage = spec.storage_field();
    let written = spec.written_field();

    let doc = format!(
        " Computed by [`{call}`](Self::{call}) on first access and cached afterwards."
    );

    let compute = quote! {
        let value = self.#call();
        unsafe { self.#storage.put(value) };
        self.#written.set();
    };

    // The plain path relies on the written flag not being `Sync`. The locked
    // path re-checks the flag under the lock before computing.
    let body = match spec.mutex_field() {
        None => quote! {
            if !self.#written.get() {
                #compute
            }
        },
        Some(mutex) => quote! {
            if !self.#written.get() {
                let _guard = self.#mutex.lock();
                if !self.#written.get() {
                    #compute
                }
            }
        },
    };

    quote! {
        #[doc = #doc]
        #[allow(non_snake_case, unsafe_code)]
        pub fn #name(&self) -> &#ty {
            #body
            unsafe { self.#storage.get() }
        }
    }
}
