//! Declaration index over a set of Python-like source files.
//!
//! Loads every supported file under the given paths, records `def`, `class`
//! and module-level assignments, and answers name lookups. The index is
//! immutable once built, so the batch driver can share it across threads.

use super::lexer::{is_keyword, starts_line, tokenize, Token, TokenKind};
use super::{declaration_anchor, SourceSet};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions the index loads.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["py", "pyw"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Function,
    Class,
    Variable,
}

impl DeclKind {
    pub fn label(self) -> &'static str {
        match self {
            DeclKind::Function => "def",
            DeclKind::Class => "class",
            DeclKind::Variable => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub file: PathBuf,
    /// 1-based.
    pub line: usize,
    /// Byte range of the name in the file.
    pub start: usize,
    pub end: usize,
    /// Index of the enclosing `def`/`class`, if any.
    pub parent: Option<usize>,
}

impl Declaration {
    pub fn anchor(&self) -> String {
        declaration_anchor(&self.name, self.line)
    }
}

#[derive(Debug, Default)]
pub struct SourceIndex {
    files: Vec<PathBuf>,
    declarations: Vec<Declaration>,
    by_name: HashMap<String, Vec<usize>>,
    by_file: HashMap<PathBuf, Vec<usize>>,
}

impl SourceIndex {
    /// Load every supported file under `paths` (files or directories).
    ///
    /// A path that cannot be expanded is an error; a single file that cannot
    /// be read is logged and left out.
    pub fn build<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut files = Vec::new();
        for path in paths {
            files.extend(collect_sources(path.as_ref())?);
        }
        files.sort();
        files.dedup();

        let mut index = SourceIndex::default();
        for file in files {
            match fs::read_to_string(&file) {
                Ok(source) => index.add_file(file, &source),
                Err(e) => warn!(path = %file.display(), error = %e, "skipping unreadable file"),
            }
        }
        Ok(index)
    }

    /// Index one file's source. `path` should already be canonical.
    pub fn add_file(&mut self, path: PathBuf, source: &str) {
        let found = extract_declarations(&path, source, self.declarations.len());
        debug!(path = %path.display(), declarations = found.len(), "indexed");
        for decl in found {
            let id = self.declarations.len();
            self.by_name.entry(decl.name.clone()).or_default().push(id);
            self.by_file.entry(decl.file.clone()).or_default().push(id);
            self.declarations.push(decl);
        }
        self.files.push(path);
    }

    pub fn declaration(&self, id: usize) -> &Declaration {
        &self.declarations[id]
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Declarations in `path`, in source order.
    pub fn declarations_in(&self, path: &Path) -> impl Iterator<Item = (usize, &Declaration)> {
        self.by_file
            .get(path)
            .into_iter()
            .flatten()
            .map(move |&id| (id, &self.declarations[id]))
    }

    /// All declarations named `name`, in index order.
    pub fn lookup(&self, name: &str) -> impl Iterator<Item = &Declaration> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(move |&id| &self.declarations[id])
    }

    pub fn status_report(&self) -> String {
        let count = |kind: DeclKind| self.declarations.iter().filter(|d| d.kind == kind).count();
        format!(
            "Indexed {} files: {} classes, {} functions, {} variables",
            self.files.len(),
            count(DeclKind::Class),
            count(DeclKind::Function),
            count(DeclKind::Variable)
        )
    }
}

impl SourceSet for SourceIndex {
    fn loaded_files(&self) -> Vec<PathBuf> {
        self.files.clone()
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Canonical paths of supported files at or below `path`.
fn collect_sources(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()))?;
        return Ok(vec![canonical]);
    }

    let mut files = Vec::new();
    for ext in SUPPORTED_EXTENSIONS {
        let pattern = format!(
            "{}/**/*.{}",
            glob::Pattern::escape(&path.to_string_lossy()),
            ext
        );
        let matches = glob::glob(&pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?;
        for entry in matches {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable path");
                    continue;
                }
            };
            if entry.is_file() && is_supported(&entry) {
                files.push(
                    entry
                        .canonicalize()
                        .with_context(|| format!("failed to resolve {}", entry.display()))?,
                );
            }
        }
    }
    Ok(files)
}

/// Byte offsets at which each line starts.
fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_of(starts: &[usize], offset: usize) -> usize {
    starts.partition_point(|&s| s <= offset)
}

/// `def`/`class` names and module-level assignment targets.
///
/// `base` is the id the first returned declaration will get, so parent
/// links can point into the global table.
fn extract_declarations(path: &Path, source: &str, base: usize) -> Vec<Declaration> {
    let tokens: Vec<Token> = tokenize(source);
    let starts = line_starts(source);
    let mut found: Vec<Declaration> = Vec::new();
    // (indent column of the def/class keyword, declaration id)
    let mut scopes: Vec<(usize, usize)> = Vec::new();

    for (n, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Name || !starts_line(source, token.start) {
            continue;
        }
        let line = line_of(&starts, token.start);
        let indent = token.start - starts[line - 1];
        let text = token.text(source);

        let (kind, name_token) = match (text, tokens.get(n + 1)) {
            ("def", Some(next)) if next.kind == TokenKind::Name => (DeclKind::Function, *next),
            ("class", Some(next)) if next.kind == TokenKind::Name => (DeclKind::Class, *next),
            (_, Some(next))
                if indent == 0
                    && !is_keyword(text)
                    && next.kind == TokenKind::Operator
                    && next.text(source) == "=" =>
            {
                (DeclKind::Variable, *token)
            }
            _ => continue,
        };

        while scopes.last().is_some_and(|&(scope_indent, _)| scope_indent >= indent) {
            scopes.pop();
        }
        let id = base + found.len();
        found.push(Declaration {
            name: name_token.text(source).to_string(),
            kind,
            file: path.to_path_buf(),
            line: line_of(&starts, name_token.start),
            start: name_token.start,
            end: name_token.end,
            parent: scopes.last().map(|&(_, parent)| parent),
        });
        if kind != DeclKind::Variable {
            scopes.push((indent, id));
        }
    }
    found
}
