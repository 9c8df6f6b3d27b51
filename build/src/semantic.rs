//! Name resolution over a source snapshot.
//!
//! The model records, per module, which names `use` declarations bring into
//! scope and which structs, constants and modules are declared there. This is
//! enough to decide whether an attribute really refers to one of the markers,
//! which struct an impl block extends and which value a constant has. It does
//! not attempt to be a full Rust resolver: paths that leave the snapshot are
//! reported as written.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::Config;
use crate::marker;
use crate::source::{ModulePath, SourceSet};

/// How deep imports and constants are followed before giving up.
const MAX_DEPTH: usize = 32;

/// How many glob imports are followed in a row.
const GLOB_DEPTH: usize = 8;

/// Marks an import target that starts with a leading `::`.
const EXTERN: &str = "::";

/// A canonical path. In-crate paths start with `crate`, all others with the
/// name of an external crate.
pub type Canonical = Vec<String>;

/// The value of a constant expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Str(String),
    Bool(bool),
}

/// A struct declared in the snapshot.
#[derive(Debug, Clone)]
pub struct StructSymbol {
    module: ModulePath,
    item: syn::ItemStruct,
}

impl StructSymbol {
    /// The module the struct is declared in.
    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    /// The struct's name.
    pub fn ident(&self) -> &syn::Ident {
        &self.item.ident
    }

    /// The struct's generic parameters.
    pub fn generics(&self) -> &syn::Generics {
        &self.item.generics
    }

    /// Whether fields can be added to the struct by name.
    pub fn has_named_fields(&self) -> bool {
        matches!(self.item.fields, syn::Fields::Named(_))
    }
}

/// What a module declares and imports.
#[derive(Debug, Default)]
struct Scope {
    /// Names brought into scope by `use` and `extern crate`, mapped to the path
    /// they were imported from, as written.
    imports: FxHashMap<String, Vec<String>>,
    /// The paths of glob imports, as written.
    globs: Vec<Vec<String>>,
    /// Declared structs.
    structs: FxHashMap<String, StructSymbol>,
    /// Declared constants and their initializers.
    consts: FxHashMap<String, syn::Expr>,
    /// Declared child modules.
    modules: FxHashSet<String>,
}

impl Scope {
    /// Whether an item with this name is declared in the module.
    fn declares(&self, name: &str) -> bool {
        self.structs.contains_key(name)
            || self.consts.contains_key(name)
            || self.modules.contains(name)
    }
}

/// The symbol table of a source snapshot.
#[derive(Debug)]
pub struct SemanticModel {
    krate: String,
    scopes: FxHashMap<ModulePath, Scope>,
}

impl SemanticModel {
    /// Build the symbol table for all files of the snapshot.
    ///
    /// If the configuration names a marker module, the marker definition is
    /// part of the snapshot as well.
    pub fn build(sources: &SourceSet, config: &Config) -> Self {
        let mut model = Self {
            krate: config.krate().to_string(),
            scopes: FxHashMap::default(),
        };

        if let Some(module) = config.marker_module() {
            model.declare_module(module);
            model.collect(module, &marker::definition(config).items);
        }

        for file in sources.files() {
            model.declare_module(file.module());
            model.collect(file.module(), &file.syntax().items);
        }

        model
    }

    /// Register a module with its parent, so that paths through it resolve.
    fn declare_module(&mut self, module: &ModulePath) {
        if let Some(parent) = module.parent() {
            if let Some(name) = module.segments().last() {
                self.scopes.entry(parent).or_default().modules.insert(name.clone());
            }
        }
        self.scopes.entry(module.clone()).or_default();
    }

    /// Record the declarations of an item list.
    fn collect(&mut self, module: &ModulePath, items: &[syn::Item]) {
        for item in items {
            match item {
                syn::Item::Use(item) => {
                    let mut prefix = vec![];
                    if item.leading_colon.is_some() {
                        prefix.push(EXTERN.into());
                    }
                    let scope = self.scopes.entry(module.clone()).or_default();
                    collect_use(&item.tree, &mut prefix, scope);
                }
                syn::Item::ExternCrate(item) => {
                    let name = match &item.rename {
                        Some((_, rename)) => rename.to_string(),
                        None => item.ident.to_string(),
                    };
                    let target = vec![EXTERN.into(), item.ident.to_string()];
                    let scope = self.scopes.entry(module.clone()).or_default();
                    scope.imports.insert(name, target);
                }
                syn::Item::Struct(item) => {
                    let symbol = StructSymbol { module: module.clone(), item: item.clone() };
                    let scope = self.scopes.entry(module.clone()).or_default();
                    scope.structs.insert(item.ident.to_string(), symbol);
                }
                syn::Item::Const(item) => {
                    let scope = self.scopes.entry(module.clone()).or_default();
                    scope.consts.insert(item.ident.to_string(), (*item.expr).clone());
                }
                syn::Item::Mod(item) => {
                    let child = module.join(&item.ident.to_string());
                    self.declare_module(&child);
                    if let Some((_, content)) = &item.content {
                        self.collect(&child, content);
                    }
                }
                _ => {}
            }
        }
    }

    /// Resolve a path as written in the given module to its canonical form.
    pub fn resolve(&self, module: &ModulePath, path: &syn::Path) -> Option<Canonical> {
        let mut segments: Vec<String> =
            path.segments.iter().map(|segment| segment.ident.to_string()).collect();
        if path.leading_colon.is_some() {
            segments.insert(0, EXTERN.into());
        }
        self.resolve_in(module, &segments, 0)
    }

    /// Whether the path refers to the marker with the given name.
    pub fn is_marker(&self, module: &ModulePath, path: &syn::Path, name: &str) -> bool {
        self.resolve(module, path)
            .is_some_and(|canonical| marker::matches(&self.krate, &canonical, name))
    }

    /// Resolve the type of an impl block to a struct of the snapshot.
    pub fn resolve_struct(&self, module: &ModulePath, ty: &syn::Type) -> Option<&StructSymbol> {
        let syn::Type::Path(syn::TypePath { qself: None, path }) = ty else {
            return None;
        };
        let canonical = self.resolve(module, path)?;
        let (name, module) = self.split(&canonical)?;
        self.scopes.get(&module)?.structs.get(name)
    }

    /// Whether a struct carries the partial marker.
    pub fn is_partial(&self, symbol: &StructSymbol) -> bool {
        symbol
            .item
            .attrs
            .iter()
            .any(|attr| self.is_marker(&symbol.module, attr.path(), marker::PARTIAL))
    }

    /// Evaluate a constant expression: a string or boolean literal, or a path
    /// to a constant of the snapshot whose initializer is one.
    pub fn evaluate(&self, module: &ModulePath, expr: &syn::Expr) -> Option<Constant> {
        self.evaluate_in(module, expr, 0)
    }

    fn evaluate_in(&self, module: &ModulePath, expr: &syn::Expr, depth: usize) -> Option<Constant> {
        if depth > MAX_DEPTH {
            return None;
        }

        match expr {
            syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) => {
                Some(Constant::Str(lit.value()))
            }
            syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Bool(lit), .. }) => {
                Some(Constant::Bool(lit.value))
            }
            syn::Expr::Paren(expr) => self.evaluate_in(module, &expr.expr, depth + 1),
            syn::Expr::Group(expr) => self.evaluate_in(module, &expr.expr, depth + 1),
            syn::Expr::Path(syn::ExprPath { qself: None, path, .. }) => {
                let canonical = self.resolve(module, path)?;
                let (name, module) = self.split(&canonical)?;
                let init = self.scopes.get(&module)?.consts.get(name)?;
                self.evaluate_in(&module, init, depth + 1)
            }
            _ => None,
        }
    }

    /// Split an in-crate path into the item name and its module.
    fn split<'c>(&self, canonical: &'c [String]) -> Option<(&'c str, ModulePath)> {
        let (name, parents) = canonical.split_last()?;
        let (first, rest) = parents.split_first()?;
        if first != "crate" {
            return None;
        }
        let module = rest.iter().fold(ModulePath::root(), |module, segment| module.join(segment));
        Some((name, module))
    }

    fn resolve_in(&self, module: &ModulePath, segments: &[String], depth: usize) -> Option<Canonical> {
        if depth > MAX_DEPTH {
            return None;
        }

        let (first, rest) = segments.split_first()?;
        let mut base = match first.as_str() {
            EXTERN => return Some(rest.to_vec()),
            "crate" => ModulePath::root().segments().to_vec(),
            "self" => module.segments().to_vec(),
            "super" => module.parent()?.segments().to_vec(),
            name => return self.resolve_name(module, name, rest, depth),
        };

        // Leading `super` segments may be chained.
        let mut rest = rest;
        while let Some((segment, tail)) = rest.split_first() {
            if segment != "super" || base.len() <= 1 {
                break;
            }
            base.pop();
            rest = tail;
        }

        base.extend(rest.iter().cloned());
        self.canonicalize(base, depth + 1)
    }

    /// Resolve a path whose first segment is a plain name.
    fn resolve_name(
        &self,
        module: &ModulePath,
        name: &str,
        rest: &[String],
        depth: usize,
    ) -> Option<Canonical> {
        let scope = self.scopes.get(module);

        if let Some(target) = scope.and_then(|scope| scope.imports.get(name)) {
            let mut resolved = self.resolve_target(module, target, depth + 1)?;
            resolved.extend(rest.iter().cloned());
            return self.canonicalize(resolved, depth + 1);
        }

        if scope.is_some_and(|scope| scope.declares(name)) {
            let mut path = module.segments().to_vec();
            path.push(name.into());
            path.extend(rest.iter().cloned());
            return self.canonicalize(path, depth + 1);
        }

        if let Some(path) = self.resolve_glob(module, name, depth) {
            let mut path = path;
            path.extend(rest.iter().cloned());
            return self.canonicalize(path, depth + 1);
        }

        // A single unresolved name is not a path into a crate. Anything longer
        // starts with the name of an external crate.
        if rest.is_empty() {
            return None;
        }

        let mut path = vec![name.to_string()];
        path.extend(rest.iter().cloned());
        Some(path)
    }

    /// Resolve the path of a `use` declaration.
    ///
    /// Unlike paths in attributes, a single-segment import path that names
    /// nothing local refers to an external crate.
    fn resolve_target(&self, module: &ModulePath, target: &[String], depth: usize) -> Option<Canonical> {
        if let [name] = target {
            let local = self.scopes.get(module).is_some_and(|scope| {
                scope.declares(name)
                    || scope.imports.get(name).is_some_and(|other| other.as_slice() != target)
            });
            if !local {
                return Some(target.to_vec());
            }
        }
        self.resolve_in(module, target, depth)
    }

    /// Find a name brought into scope by one of the module's glob imports.
    fn resolve_glob(&self, module: &ModulePath, name: &str, depth: usize) -> Option<Canonical> {
        if depth > MAX_DEPTH {
            return None;
        }
        let scope = self.scopes.get(module)?;
        scope.globs.iter().find_map(|glob| {
            let mut base = self.resolve_target(module, glob, depth + 1)?;
            if !self.exports(&base, name, depth) {
                return None;
            }
            base.push(name.into());
            Some(base)
        })
    }

    /// Whether the module at the canonical path makes the name available.
    fn exports(&self, module: &[String], name: &str, depth: usize) -> bool {
        if module.first().map(String::as_str) != Some("crate") {
            return marker::exports(&self.krate, module, name);
        }

        let module = module[1..].iter().fold(ModulePath::root(), |module, segment| module.join(segment));
        self.scopes.get(&module).is_some_and(|scope| {
            scope.declares(name)
                || scope.imports.contains_key(name)
                || (depth < GLOB_DEPTH && self.resolve_glob(&module, name, depth + 1).is_some())
        })
    }

    /// Follow re-exports along an in-crate path.
    ///
    /// Walks down the known modules of the path. The first segment that is not
    /// a module names an item; if that item is itself an import, the path
    /// continues from the import's target.
    fn canonicalize(&self, path: Canonical, depth: usize) -> Option<Canonical> {
        if depth > MAX_DEPTH {
            return None;
        }

        if path.first().map(String::as_str) != Some("crate") {
            return Some(path);
        }

        let mut module = ModulePath::root();
        for (i, segment) in path.iter().enumerate().skip(1) {
            let Some(scope) = self.scopes.get(&module) else {
                return Some(path);
            };

            if scope.modules.contains(segment) {
                module = module.join(segment);
                continue;
            }

            let rest = &path[i + 1..];
            if let Some(target) = scope.imports.get(segment) {
                let mut resolved = self.resolve_target(&module, target, depth + 1)?;
                resolved.extend(rest.iter().cloned());
                return self.canonicalize(resolved, depth + 1);
            }

            if !scope.declares(segment) {
                if let Some(mut resolved) = self.resolve_glob(&module, segment, depth + 1) {
                    resolved.extend(rest.iter().cloned());
                    return self.canonicalize(resolved, depth + 1);
                }
            }

            break;
        }

        Some(path)
    }
}

/// Flatten a use tree into the scope's imports.
fn collect_use(tree: &syn::UseTree, prefix: &mut Vec<String>, scope: &mut Scope) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use(&path.tree, prefix, scope);
            prefix.pop();
        }
        syn::UseTree::Name(name) => {
            if name.ident == "self" {
                if let Some(last) = prefix.last() {
                    scope.imports.insert(last.clone(), prefix.clone());
                }
            } else {
                let mut target = prefix.clone();
                target.push(name.ident.to_string());
                scope.imports.insert(name.ident.to_string(), target);
            }
        }
        syn::UseTree::Rename(rename) => {
            let mut target = prefix.clone();
            if rename.ident != "self" {
                target.push(rename.ident.to_string());
            }
            if rename.rename != "_" {
                scope.imports.insert(rename.rename.to_string(), target);
            }
        }
        syn::UseTree::Glob(_) => scope.globs.push(prefix.clone()),
        syn::UseTree::Group(group) => {
            for tree in &group.items {
                collect_use(tree, prefix, scope);
            }
        }
    }
}
