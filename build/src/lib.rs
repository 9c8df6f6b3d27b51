//! Build-time generation of `lazyprop` properties.
//!
//! Call the [`Builder`] from a build script, listing the source files that
//! contain `#[partial]` structs. Each file is written back to `OUT_DIR` with
//! the backing fields merged into its structs and the accessors appended, and
//! is then pulled into the crate with `include!`:
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     lazyprop_build::Builder::new()
//!         .file("partial/person.rs")
//!         .generate()
//!         .unwrap();
//! }
//!
//! // src/lib.rs
//! pub mod person {
//!     include!(concat!(env!("OUT_DIR"), "/person.rs"));
//! }
//! ```
//!
//! A generation pass runs in four stages: [`filter`] picks methods by shape,
//! [`resolve`] confirms their markers against the [`semantic`] model, [`synth`]
//! produces the members and [`Generator`] groups the result into one
//! [`GeneratedUnit`] per method.

pub mod filter;
pub mod marker;
pub mod resolve;
pub mod semantic;
pub mod synth;

mod config;
mod error;
mod generate;
mod merge;
mod sink;
mod source;

use std::env;
use std::path::PathBuf;

pub use crate::config::{Config, DEFAULT_CRATE};
pub use crate::error::{Error, Result};
pub use crate::generate::{GeneratedUnit, Generator};
pub use crate::merge::merge;
pub use crate::sink::{DirSink, MemorySink, OutputSink};
pub use crate::source::{MethodNode, Methods, ModulePath, SourceFile, SourceSet};

/// The first line of every generated file.
const HEADER: &str = "// @generated by lazyprop-build. Do not edit.";

/// Render a syntax tree as a generated file.
pub(crate) fn render(file: &syn::File) -> String {
    format!("{HEADER}\n\n{}", prettyplease::unparse(file))
}

/// Configures and runs generation from a build script.
#[derive(Debug, Clone)]
pub struct Builder {
    files: Vec<(PathBuf, Option<String>)>,
    out_dir: Option<PathBuf>,
    crate_name: String,
    marker_module: Option<String>,
    rerun_if_changed: bool,
}

impl Builder {
    /// Create a builder with default settings and no files.
    pub fn new() -> Self {
        Self {
            files: vec![],
            out_dir: None,
            crate_name: DEFAULT_CRATE.into(),
            marker_module: None,
            rerun_if_changed: true,
        }
    }

    /// Add a source file. Its module is derived from the file name, so
    /// `partial/person.rs` is expected to be included as `crate::person`.
    pub fn file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.files.push((path.into(), None));
        self
    }

    /// Add a source file that is included as the given module.
    pub fn file_in(&mut self, path: impl Into<PathBuf>, module: &str) -> &mut Self {
        self.files.push((path.into(), Some(module.into())));
        self
    }

    /// Write output here instead of `OUT_DIR`.
    pub fn out_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// The name the runtime crate is available under, if it was renamed.
    pub fn crate_name(&mut self, name: &str) -> &mut Self {
        self.crate_name = name.into();
        self
    }

    /// Emit the marker definition, to be included as the given module.
    ///
    /// Sources may then import the markers from that module.
    pub fn marker_module(&mut self, module: &str) -> &mut Self {
        self.marker_module = Some(module.into());
        self
    }

    /// Whether to tell Cargo to rerun the build script when a source changes.
    pub fn rerun_if_changed(&mut self, enabled: bool) -> &mut Self {
        self.rerun_if_changed = enabled;
        self
    }

    /// Read all sources, run a generation pass and write the results.
    ///
    /// Every unit is written under its key, next to one merged file per
    /// source named after its module (`person.rs`, `a.b.rs`, or `lib.rs` for
    /// the crate root).
    pub fn generate(&self) -> Result<Vec<GeneratedUnit>> {
        let mut config = Config::new(&self.crate_name)?;
        if let Some(module) = &self.marker_module {
            config = config.with_marker_module(module.parse()?);
        }

        let out_dir = match &self.out_dir {
            Some(dir) => dir.clone(),
            None => env::var_os("OUT_DIR").map(PathBuf::from).ok_or(Error::MissingOutDir)?,
        };

        let mut sources = SourceSet::new();
        for (path, module) in &self.files {
            let module = match module {
                Some(module) => module.parse()?,
                None => ModulePath::for_file(path)?,
            };
            if self.rerun_if_changed {
                println!("cargo:rerun-if-changed={}", path.display());
            }
            sources.push(SourceFile::read(path, module)?)?;
        }

        let mut sink = DirSink::new(out_dir)?;
        let units = Generator::new(&config).run(&sources, &mut sink)?;

        for source in sources.files() {
            let name = merged_name(source.module());
            sink.add(&name, render(&merge(source, &units)))?;
        }

        tracing::debug!(
            files = sources.files().len(),
            units = units.len(),
            out_dir = %sink.dir().display(),
            "generation finished"
        );

        Ok(units)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// The file name of a merged source.
fn merged_name(module: &ModulePath) -> String {
    match module.dotted() {
        dotted if dotted.is_empty() => "lib.rs".into(),
        dotted => format!("{dotted}.rs"),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serial_test::serial;

    use super::*;

    const PERSON: &str = "
        use lazyprop::{lazy_property, partial};

        #[partial]
        #[derive(Default)]
        pub struct Person {
            pub first_name: String,
        }

        #[partial]
        impl Person {
            #[lazy_property(\"Initial\")]
            fn get_initial(&self) -> char {
                self.first_name.chars().next().unwrap_or(' ')
            }
        }
    ";

    fn write_source(dir: &Path) -> PathBuf {
        let path = dir.join("person.rs");
        fs::write(&path, PERSON).unwrap();
        path
    }

    #[test]
    fn test_generate_into_dir() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let other = src.path().join("other");
        fs::create_dir(&other).unwrap();

        let units = Builder::new()
            .file(write_source(src.path()))
            .file_in(write_source(&other), "crate::other")
            .out_dir(out.path())
            .marker_module("crate::markers")
            .rerun_if_changed(false)
            .generate()
            .unwrap();

        assert_eq!(units.len(), 2);

        let mut written: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        written.sort();
        assert_eq!(
            written,
            [
                "lazyprop.markers.g.rs",
                "other.Person.get_initial.g.rs",
                "other.rs",
                "person.Person.get_initial.g.rs",
                "person.rs",
            ]
        );

        let merged = fs::read_to_string(out.path().join("person.rs")).unwrap();
        assert!(merged.starts_with(HEADER));
        assert!(merged.contains("_initialStorage: ::lazyprop::internal::Storage<char>"));
        assert!(merged.contains("pub fn Initial(&self) -> &char"));
    }

    #[test]
    fn test_merged_name() {
        assert_eq!(merged_name(&ModulePath::root()), "lib.rs");
        assert_eq!(merged_name(&"crate::a::b".parse().unwrap()), "a.b.rs");
    }

    #[test]
    fn test_invalid_configuration() {
        let out = tempfile::tempdir().unwrap();
        let result = Builder::new().crate_name("3d").out_dir(out.path()).generate();
        assert!(matches!(result, Err(Error::CrateName(_))));

        let result = Builder::new().marker_module("a::fn").out_dir(out.path()).generate();
        assert!(matches!(result, Err(Error::ModulePath(_))));

        let result = Builder::new()
            .file(out.path().join("missing.rs"))
            .out_dir(out.path())
            .rerun_if_changed(false)
            .generate();
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    #[serial]
    fn test_out_dir_from_environment() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let path = write_source(src.path());

        unsafe { env::set_var("OUT_DIR", out.path()) };
        let units = Builder::new().file(&path).rerun_if_changed(false).generate().unwrap();
        assert_eq!(units.len(), 1);
        assert!(out.path().join("person.rs").exists());

        unsafe { env::remove_var("OUT_DIR") };
        let result = Builder::new().file(&path).rerun_if_changed(false).generate();
        assert!(matches!(result, Err(Error::MissingOutDir)));
    }
}
