//! Source distribution manifests.
//!
//! A manifest is a list of include/exclude directives (`include`,
//! `recursive-include`, `global-exclude`, `prune`, ...) evaluated in order
//! against the files of a source tree to decide which of them ship in a
//! release archive.

pub mod filelist;
pub mod parser;

pub use filelist::FileList;
pub use parser::{load_manifest, parse_manifest, Directive};

use log::info;
use std::path::Path;

/// Errors raised while reading or evaluating a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Evaluate the manifest at `manifest_path` against the tree at `root`
///
/// Returns the selected files as sorted `/`-separated relative paths.
pub fn select_files(manifest_path: &Path, root: &Path) -> Result<Vec<String>, ManifestError> {
    let directives = load_manifest(manifest_path)?;
    let mut list = FileList::from_dir(root)?;
    list.apply_all(&directives)?;

    let files: Vec<String> = list.files().into_iter().map(str::to_string).collect();
    info!("Manifest selected {} of {} files", files.len(), list.all_files().len());
    Ok(files)
}
