use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// The path of a module within the crate, always starting at `crate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// The crate root.
    pub fn root() -> Self {
        Self(vec!["crate".into()])
    }

    /// The module a file is included as, derived from its name.
    ///
    /// `model.rs` becomes `crate::model`, `model/mod.rs` becomes
    /// `crate::model` and `lib.rs` or `main.rs` become the crate root.
    pub fn for_file(path: &Path) -> Result<Self> {
        let invalid = || Error::ModulePath(path.display().to_string());
        let stem = path.file_stem().and_then(|stem| stem.to_str()).ok_or_else(invalid)?;
        let name = match stem {
            "lib" | "main" => return Ok(Self::root()),
            "mod" => path
                .parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
                .ok_or_else(invalid)?,
            stem => stem,
        };
        Self::root().checked_join(name).ok_or_else(invalid)
    }

    /// The segments of the path, starting with `crate`.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The module that contains this one.
    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// A child module.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// A child module, if the name is a valid identifier.
    fn checked_join(&self, name: &str) -> Option<Self> {
        syn::parse_str::<syn::Ident>(name).ok()?;
        Some(self.join(name))
    }

    /// The path without `crate`, joined with dots, for use in file names.
    ///
    /// Empty for the crate root.
    pub fn dotted(&self) -> String {
        self.0[1..].join(".")
    }
}

impl FromStr for ModulePath {
    type Err = Error;

    /// Parse a path like `crate::model` or `model`.
    fn from_str(s: &str) -> Result<Self> {
        let mut segments = s.split("::").map(str::trim).peekable();
        if segments.peek() == Some(&"crate") {
            segments.next();
        }

        segments.try_fold(Self::root(), |module, segment| {
            module.checked_join(segment).ok_or_else(|| Error::ModulePath(s.into()))
        })
    }
}

impl Display for ModulePath {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

/// A parsed source file and the module it is compiled as.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    module: ModulePath,
    syntax: syn::File,
}

impl SourceFile {
    /// Parse source text.
    pub fn parse(path: impl Into<PathBuf>, module: ModulePath, text: &str) -> Result<Self> {
        let path = path.into();
        match syn::parse_file(text) {
            Ok(syntax) => Ok(Self { path, module, syntax }),
            Err(source) => Err(Error::Parse { path, source }),
        }
    }

    /// Read and parse a file.
    pub fn read(path: impl Into<PathBuf>, module: ModulePath) -> Result<Self> {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(text) => Self::parse(path, module, &text),
            Err(source) => Err(Error::Read { path, source }),
        }
    }

    /// Where the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The module the file's items belong to.
    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    /// The file's syntax tree.
    pub fn syntax(&self) -> &syn::File {
        &self.syntax
    }
}

/// A snapshot of all source files taking part in a generation pass.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Each module may only be defined by one file.
    pub fn push(&mut self, file: SourceFile) -> Result<()> {
        if self.files.iter().any(|other| other.module == file.module) {
            return Err(Error::DuplicateModule(file.module));
        }
        self.files.push(file);
        Ok(())
    }

    /// The files in the order they were added.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Iterate over every method of every impl block, including those in
    /// inline modules.
    pub fn methods(&self) -> Methods<'_> {
        Methods {
            files: self.files.iter(),
            modules: Vec::new(),
            block: None,
        }
    }
}

/// A method as found in the syntax tree, with the module it was found in.
#[derive(Debug, Clone)]
pub struct MethodNode<'a> {
    pub file: &'a SourceFile,
    pub module: ModulePath,
    pub item: &'a syn::ItemImpl,
    pub method: &'a syn::ImplItemFn,
}

/// Lazily walks the syntax trees of a [`SourceSet`].
pub struct Methods<'a> {
    files: std::slice::Iter<'a, SourceFile>,
    /// The item lists currently being walked, innermost last.
    modules: Vec<(&'a SourceFile, ModulePath, std::slice::Iter<'a, syn::Item>)>,
    /// The impl block currently being walked.
    block: Option<Block<'a>>,
}

struct Block<'a> {
    file: &'a SourceFile,
    module: ModulePath,
    item: &'a syn::ItemImpl,
    items: std::slice::Iter<'a, syn::ImplItem>,
}

impl<'a> Iterator for Methods<'a> {
    type Item = MethodNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(block) = &mut self.block {
                for impl_item in block.items.by_ref() {
                    if let syn::ImplItem::Fn(method) = impl_item {
                        return Some(MethodNode {
                            file: block.file,
                            module: block.module.clone(),
                            item: block.item,
                            method,
                        });
                    }
                }
                self.block = None;
            }

            if let Some((file, module, items)) = self.modules.last_mut() {
                match items.next() {
                    Some(syn::Item::Impl(item)) => {
                        self.block = Some(Block {
                            file: *file,
                            module: module.clone(),
                            item,
                            items: item.items.iter(),
                        });
                    }
                    Some(syn::Item::Mod(syn::ItemMod { ident, content: Some((_, content)), .. })) => {
                        let file = *file;
                        let child = module.join(&ident.to_string());
                        self.modules.push((file, child, content.iter()));
                    }
                    Some(_) => {}
                    None => {
                        self.modules.pop();
                    }
                }
                continue;
            }

            let file = self.files.next()?;
            self.modules.push((file, file.module.clone(), file.syntax.items.iter()));
        }
    }
}
