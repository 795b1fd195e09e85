//! Reference linker: identifier occurrences to declaration pages.

use super::index::{Declaration, SourceIndex};
use super::lexer::{is_constant, is_keyword, tokenize, TokenKind};
use super::RunProducer;
use crate::model::{LinkTarget, StyleRun};
use crate::page::PageAssembler;
use std::collections::HashMap;
use std::path::Path;

/// Declaration sites become anchors; references become links to the page
/// holding their declaration. Declarations outside the render root (library
/// dependencies) have no page, so references to them only get a tooltip.
pub struct DeclarationLinker<'a> {
    index: &'a SourceIndex,
    pages: PageAssembler,
}

impl<'a> DeclarationLinker<'a> {
    pub fn new(index: &'a SourceIndex, pages: PageAssembler) -> Self {
        Self { index, pages }
    }

    /// Same file before other files; attribute names (`x.name`) only match
    /// nested declarations, bare names prefer top-level ones.
    pub fn resolve(&self, name: &str, from: &Path, attribute: bool) -> Option<&'a Declaration> {
        let index = self.index;
        let level = |d: &&Declaration| d.parent.is_some() == attribute;
        index
            .lookup(name)
            .filter(level)
            .find(|d| d.file == from)
            .or_else(|| index.lookup(name).find(level))
            .or_else(|| {
                if attribute {
                    None
                } else {
                    index.lookup(name).find(|d| d.file == from)
                }
            })
    }

    fn tooltip(&self, decl: &Declaration) -> String {
        let file = decl
            .file
            .strip_prefix(self.pages.render_root())
            .unwrap_or(&decl.file);
        format!(
            "{} {} ({}:{})",
            decl.kind.label(),
            decl.name,
            file.display(),
            decl.line
        )
    }
}

impl RunProducer for DeclarationLinker<'_> {
    fn name(&self) -> &str {
        "linker"
    }

    fn runs(&self, path: &Path, source: &str) -> Vec<StyleRun> {
        let sites: HashMap<usize, &Declaration> = self
            .index
            .declarations_in(path)
            .map(|(_, decl)| (decl.start, decl))
            .collect();

        let mut runs = Vec::new();
        for token in tokenize(source) {
            if token.kind != TokenKind::Name {
                continue;
            }
            let name = token.text(source);
            if is_keyword(name) || is_constant(name) {
                continue;
            }

            if let Some(decl) = sites.get(&token.start) {
                if decl.name == name {
                    runs.push(StyleRun::anchor(token.start, token.end, decl.anchor()));
                    continue;
                }
            }

            let attribute = source[..token.start].ends_with('.');
            let Some(target) = self.resolve(name, path, attribute) else {
                continue;
            };
            let tooltip = self.tooltip(target);
            let run = match self.pages.output_path(&target.file) {
                Ok(page) => StyleRun::link(
                    token.start,
                    token.end,
                    LinkTarget::new(page, Some(target.anchor())),
                ),
                Err(_) => StyleRun::styled(token.start, token.end, "info"),
            };
            runs.push(run.with_tooltip(tooltip));
        }
        runs
    }
}
