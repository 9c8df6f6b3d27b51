//! Confirming markers by name resolution and reading their arguments.

use syn::punctuated::Punctuated;

use crate::marker;
use crate::semantic::{Constant, SemanticModel};
use crate::source::{MethodNode, ModulePath};

/// A method whose markers survived resolution.
#[derive(Debug, Clone)]
pub struct CandidateMethod {
    /// The module of the struct the method extends.
    pub module: ModulePath,
    /// The struct the method extends.
    pub target: syn::Ident,
    /// The struct's own generic parameters.
    pub target_generics: syn::Generics,
    /// The generic parameters of the impl block.
    pub generics: syn::Generics,
    /// The impl block's self type, as written.
    pub self_ty: syn::Type,
    /// The method's name.
    pub method: syn::Ident,
    /// The method's return type, as written.
    pub output: syn::Type,
    /// One entry per valid marker, in source order.
    pub specs: Vec<LazyPropertySpec>,
}

/// One property to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyPropertySpec {
    /// The name of the generated accessor.
    pub property: String,
    /// Whether the first computation is guarded by a lock.
    pub thread_safe: bool,
    /// The prefix of the backing fields.
    pub field_prefix: String,
}

impl LazyPropertySpec {
    /// Create a spec with default settings. Returns `None` if the name is not
    /// a valid identifier.
    pub fn new(property: &str) -> Option<Self> {
        syn::parse_str::<syn::Ident>(property).ok()?;
        Some(Self {
            property: property.into(),
            thread_safe: false,
            field_prefix: default_prefix(property),
        })
    }

    /// The accessor's name.
    pub fn property_ident(&self) -> syn::Ident {
        quote::format_ident!("{}", self.property)
    }

    /// The field holding the cached value.
    pub fn storage_field(&self) -> syn::Ident {
        quote::format_ident!("{}Storage", self.field_prefix)
    }

    /// The field marking the value as computed.
    pub fn written_field(&self) -> syn::Ident {
        quote::format_ident!("{}Written", self.field_prefix)
    }

    /// The field holding the property's lock, if it has one.
    pub fn mutex_field(&self) -> Option<syn::Ident> {
        self.thread_safe
            .then(|| quote::format_ident!("{}Mutex", self.field_prefix))
    }

    /// Whether all derived field names are identifiers.
    fn has_valid_fields(&self) -> bool {
        syn::parse_str::<syn::Ident>(&format!("{}Storage", self.field_prefix)).is_ok()
    }
}

/// The default field prefix: an underscore and the property name with a
/// lower-cased first letter.
pub fn default_prefix(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("_{}{}", first.to_lowercase(), chars.as_str()),
        None => "_".into(),
    }
}

/// Confirm the markers of a candidate and read their arguments.
///
/// Returns `None` if no attribute of the method resolves to the marker or if
/// the impl block does not extend a partial struct of its own module. Markers
/// with unusable arguments are skipped, so the result may have no specs.
pub fn resolve(node: &MethodNode, model: &SemanticModel) -> Option<CandidateMethod> {
    let module = &node.module;
    let method = &node.method.sig.ident;

    let markers: Vec<&syn::Attribute> = node
        .method
        .attrs
        .iter()
        .filter(|attr| model.is_marker(module, attr.path(), marker::LAZY_PROPERTY))
        .collect();

    if markers.is_empty() {
        return None;
    }

    if !node.item.attrs.iter().any(|attr| model.is_marker(module, attr.path(), marker::PARTIAL)) {
        tracing::trace!(%module, %method, "impl block is not partial");
        return None;
    }

    let Some(symbol) = model.resolve_struct(module, &node.item.self_ty) else {
        tracing::trace!(%module, %method, "impl block does not extend a known struct");
        return None;
    };

    if !model.is_partial(symbol) || !symbol.has_named_fields() || symbol.module() != module {
        tracing::trace!(%module, %method, target = %symbol.ident(), "struct cannot be extended");
        return None;
    }

    let syn::ReturnType::Type(_, output) = &node.method.sig.output else {
        return None;
    };

    let specs = markers
        .into_iter()
        .filter_map(|attr| {
            let spec = parse_spec(attr, module, model);
            if spec.is_none() {
                tracing::trace!(%module, %method, "discarding malformed marker");
            }
            spec
        })
        .collect();

    Some(CandidateMethod {
        module: symbol.module().clone(),
        target: symbol.ident().clone(),
        target_generics: symbol.generics().clone(),
        generics: node.item.generics.clone(),
        self_ty: (*node.item.self_ty).clone(),
        method: method.clone(),
        output: (**output).clone(),
        specs,
    })
}

/// Read the arguments of one marker.
///
/// The marker needs exactly one positional argument, a constant string. Named
/// arguments of the wrong type or with unknown keys are ignored.
fn parse_spec(
    attr: &syn::Attribute,
    module: &ModulePath,
    model: &SemanticModel,
) -> Option<LazyPropertySpec> {
    let syn::Meta::List(list) = &attr.meta else {
        return None;
    };

    let args = list
        .parse_args_with(Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated)
        .ok()?;

    let mut positional = vec![];
    let mut named = vec![];
    for arg in &args {
        match arg {
            syn::Expr::Assign(assign) => named.push(assign),
            arg => positional.push(arg),
        }
    }

    let [name] = positional.as_slice() else {
        return None;
    };

    let Some(Constant::Str(name)) = model.evaluate(module, name) else {
        return None;
    };

    let mut spec = LazyPropertySpec::new(name.trim())?;
    for assign in named {
        let syn::Expr::Path(key) = assign.left.as_ref() else {
            continue;
        };
        let Some(key) = key.path.get_ident() else {
            continue;
        };

        match (key.to_string().as_str(), model.evaluate(module, &assign.right)) {
            (marker::THREAD_SAFE, Some(Constant::Bool(value))) => spec.thread_safe = value,
            (marker::FIELD_PREFIX, Some(Constant::Str(prefix))) => spec.field_prefix = prefix,
            _ => {}
        }
    }

    spec.has_valid_fields().then_some(spec)
}
