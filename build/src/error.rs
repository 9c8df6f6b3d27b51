//! Errors of a generation run.
//!
//! Problems with individual markers are never errors: a marker that cannot be
//! used produces no property. Only a broken environment fails the build.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::source::ModulePath;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read `{}`: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write `{}`: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to parse `{}`: {source}", path.display())]
    Parse { path: PathBuf, source: syn::Error },

    #[error("invalid module path `{0}`")]
    ModulePath(String),

    #[error("invalid crate name `{0}`")]
    CrateName(String),

    #[error("module `{0}` is defined by more than one source file")]
    DuplicateModule(ModulePath),

    #[error("OUT_DIR is not set and no output directory was configured")]
    MissingOutDir,
}
