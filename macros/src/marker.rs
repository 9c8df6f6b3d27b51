use proc_macro2::TokenStream;
use quote::quote;

use super::*;

/// Pass a marked method through unchanged.
///
/// Arguments and signature are not inspected: a method that does not qualify
/// simply gets no property.
pub fn expand_lazy_property(stream: TokenStream) -> Result<TokenStream> {
    if syn::parse2::<syn::ImplItemFn>(stream.clone()).is_err() {
        bail!(stream, "`lazy_property` can only be applied to methods");
    }

    Ok(quote! { #stream })
}

/// Pass a partial struct or impl block through unchanged.
pub fn expand_partial(stream: TokenStream) -> Result<TokenStream> {
    let item = syn::parse2::<syn::Item>(stream.clone())?;
    match &item {
        syn::Item::Struct(_) | syn::Item::Impl(_) => {}
        _ => bail!(item, "`partial` can only be applied to structs and impl blocks"),
    }

    Ok(quote! { #stream })
}
