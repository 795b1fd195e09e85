//! Error taxonomy for the rendering engine.
//!
//! Producer contract violations and template mistakes are programming errors
//! and abort a batch. Reading a source file or writing a page can fail for
//! ordinary I/O reasons; those are recoverable per file.

use std::path::PathBuf;
use thiserror::Error;

/// A style run that breaks the offset invariant `start <= end <= len`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("style run starts after it ends: [{start}, {end})")]
    Inverted { start: usize, end: usize },

    #[error("style run ends at {end}, past the end of the source ({len} bytes)")]
    OutOfBounds { end: usize, len: usize },

    #[error("style run boundary {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no placeholder named `{0}`")]
    UnknownPlaceholder(String),

    #[error("no value supplied for placeholder `{0}`")]
    MissingValue(String),
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("{path} is not under the render root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Failure while producing one page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed style run for {path}")]
    Run {
        path: PathBuf,
        #[source]
        source: RunError,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Page(#[from] PageError),
}

impl RenderError {
    /// I/O failures skip the file; everything else is a bug upstream.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RenderError::Read { .. } | RenderError::Write { .. })
    }
}
