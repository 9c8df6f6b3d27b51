//! The cheap syntactic pre-selection of methods.
//!
//! Looks only at the method and its impl block, so most of the source tree
//! never reaches name resolution. It must never reject a method that
//! resolution would accept: markers may be imported under any name, so
//! attributes are not matched by name here.

use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;

/// Whether a method can become a property at all.
///
/// The method must carry at least one attribute, take nothing but `&self`,
/// return a value that can be stored in the struct and sit in an inherent
/// impl block that carries at least one attribute.
pub fn is_candidate(item: &syn::ItemImpl, method: &syn::ImplItemFn) -> bool {
    has_attributes(&method.attrs)
        && takes_no_parameters(&method.sig)
        && returns_value(&method.sig.output)
        && is_extensible(item)
}

/// Doc comments are attributes too, but never markers.
fn has_attributes(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| !attr.path().is_ident("doc"))
}

fn takes_no_parameters(sig: &syn::Signature) -> bool {
    if sig.asyncness.is_some() || sig.unsafety.is_some() || sig.variadic.is_some() {
        return false;
    }

    if sig
        .generics
        .params
        .iter()
        .any(|param| !matches!(param, syn::GenericParam::Lifetime(_)))
    {
        return false;
    }

    let mut inputs = sig.inputs.iter();
    let Some(syn::FnArg::Receiver(receiver)) = inputs.next() else {
        return false;
    };

    receiver.reference.is_some() && receiver.mutability.is_none() && inputs.next().is_none()
}

fn returns_value(output: &syn::ReturnType) -> bool {
    match output {
        syn::ReturnType::Default => false,
        syn::ReturnType::Type(_, ty) => is_value(ty) && is_storable(ty.to_token_stream()),
    }
}

/// `()` and `!` carry no value to cache.
fn is_value(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Tuple(tuple) => !tuple.elems.is_empty(),
        syn::Type::Never(_) => false,
        syn::Type::Paren(paren) => is_value(&paren.elem),
        syn::Type::Group(group) => is_value(&group.elem),
        _ => true,
    }
}

/// A field type cannot borrow from the struct, name `Self` or be opaque.
/// Only `'static` lifetimes are allowed, so elided references are rejected.
fn is_storable(tokens: TokenStream) -> bool {
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        match token {
            TokenTree::Group(group) => {
                if !is_storable(group.stream()) {
                    return false;
                }
            }
            TokenTree::Ident(ident) => {
                if ident == "Self" || ident == "impl" {
                    return false;
                }
            }
            TokenTree::Punct(punct) if punct.as_char() == '&' => {
                if !matches!(tokens.peek(), Some(TokenTree::Punct(next)) if next.as_char() == '\'') {
                    return false;
                }
            }
            TokenTree::Punct(punct) if punct.as_char() == '\'' => {
                if !matches!(tokens.next(), Some(TokenTree::Ident(name)) if name == "static") {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Whether the marker on the block really is `partial` is decided during
/// resolution.
fn is_extensible(item: &syn::ItemImpl) -> bool {
    item.trait_.is_none() && has_attributes(&item.attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(block: &str) -> Vec<String> {
        let item: syn::ItemImpl = syn::parse_str(block).unwrap();
        item.items
            .iter()
            .filter_map(|impl_item| match impl_item {
                syn::ImplItem::Fn(method) if is_candidate(&item, method) => {
                    Some(method.sig.ident.to_string())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_shape() {
        let found = check(
            "
            #[partial]
            impl Person {
                #[lazy_property(\"A\")] fn ok(&self) -> String { todo!() }
                #[lazy_property(\"A\")] fn lifetime<'a>(&'a self) -> u8 { 0 }
                #[lazy_property(\"A\")] fn param(&self, x: u8) -> u8 { x }
                #[lazy_property(\"A\")] fn no_receiver() -> u8 { 0 }
                #[lazy_property(\"A\")] fn by_value(self) -> u8 { 0 }
                #[lazy_property(\"A\")] fn by_mut(&mut self) -> u8 { 0 }
                #[lazy_property(\"A\")] fn unit(&self) {}
                #[lazy_property(\"A\")] fn explicit_unit(&self) -> () {}
                #[lazy_property(\"A\")] fn never(&self) -> ! { loop {} }
                #[lazy_property(\"A\")] fn generic<T: Default>(&self) -> T { T::default() }
                #[lazy_property(\"A\")] async fn future(&self) -> u8 { 0 }
                #[lazy_property(\"A\")] unsafe fn danger(&self) -> u8 { 0 }
                #[lazy_property(\"A\")] fn borrowed(&self) -> &str { \"\" }
                #[lazy_property(\"A\")] fn named<'a>(&'a self) -> &'a str { \"\" }
                #[lazy_property(\"A\")] fn nested<'a>(&'a self) -> Vec<&'a str> { vec![] }
                #[lazy_property(\"A\")] fn itself(&self) -> Self { todo!() }
                #[lazy_property(\"A\")] fn boxed(&self) -> Box<Self> { todo!() }
                #[lazy_property(\"A\")] fn opaque(&self) -> impl Display { 0 }
                #[lazy_property(\"A\")] fn fixed(&self) -> &'static str { \"\" }
                #[lazy_property(\"A\")] fn object(&self) -> Box<dyn Fn() + 'static> { todo!() }
                /// Only documented.
                fn documented(&self) -> u8 { 0 }
                fn bare(&self) -> u8 { 0 }
            }
            ",
        );
        assert_eq!(found, ["ok", "lifetime", "fixed", "object"]);
    }

    #[test]
    fn test_enclosing_block() {
        let method = "{ #[lazy_property(\"A\")] fn ok(&self) -> u8 { 0 } }";
        assert_eq!(check(&format!("#[partial] impl A {method}")), ["ok"]);
        assert_eq!(check(&format!("#[lazyprop::partial] impl<T> A<T> {method}")), ["ok"]);
        assert!(check(&format!("impl A {method}")).is_empty());
        assert_eq!(check(&format!("#[extensible] impl A {method}")), ["ok"]);
        assert!(check(&format!("/// Documented.\nimpl A {method}")).is_empty());
        assert!(check(&format!("#[partial] impl Trait for A {method}")).is_empty());
    }
}
