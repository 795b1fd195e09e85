//! Collaborators that feed the engine: run producers, the indexed file set,
//! and the outline panel.
//!
//! The engine only depends on the traits. The concrete types here are
//! simple reference implementations for Python-like sources so the binary
//! works end-to-end; their resolution quality is not part of the engine's
//! contract.

pub mod index;
pub mod lexer;
pub mod linker;
pub mod outline;

use crate::model::StyleRun;
use std::path::{Path, PathBuf};

pub use index::{DeclKind, Declaration, SourceIndex};
pub use lexer::LexicalStyler;
pub use linker::DeclarationLinker;
pub use outline::DeclarationOutline;

/// Anything that annotates a file's source with style runs.
///
/// Implementations must be pure with respect to `(path, source)`: the batch
/// driver calls them from several threads at once.
pub trait RunProducer: Sync {
    fn name(&self) -> &str;
    fn runs(&self, path: &Path, source: &str) -> Vec<StyleRun>;
}

/// The set of files an index has loaded.
pub trait SourceSet: Sync {
    /// Canonical paths, in a stable order.
    fn loaded_files(&self) -> Vec<PathBuf>;
}

/// Produces the navigation panel for a file as an HTML fragment.
pub trait Outliner: Sync {
    fn outline(&self, path: &Path) -> String;
}

/// Declaration sites become in-page destinations with this id. The `decl-`
/// prefix keeps it apart from the `line-N` ids of the line-number pass.
pub fn declaration_anchor(name: &str, line: usize) -> String {
    format!("decl-{}-{}", name, line)
}
