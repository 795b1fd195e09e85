//! Data model for text annotations: producer-agnostic.
//!
//! A [`StyleRun`] marks a half-open byte range of one file's source with a
//! rendering treatment. Producers (the lexical styler, the linker) emit them
//! in any order and may overlap freely; the compositor turns the union into
//! a [`Composition`] the renderer can walk without crossing tags.

use crate::error::RunError;
use std::path::PathBuf;

/// Which family of treatment a run belongs to. Drives nesting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunCategory {
    Lexical,
    Link,
}

/// Destination of a hyperlink: another page plus an optional in-page anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTarget {
    /// Output path of the target page (not the target source file).
    pub page: PathBuf,
    pub fragment: Option<String>,
}

impl LinkTarget {
    pub fn new(page: impl Into<PathBuf>, fragment: Option<String>) -> Self {
        Self {
            page: page.into(),
            fragment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// CSS class such as `keyword`, `string`, `comment`.
    Style(String),
    /// Hyperlink to a declaration page.
    Link(LinkTarget),
    /// Named destination other pages can link to.
    Anchor(String),
}

impl RunKind {
    pub fn style(class: impl Into<String>) -> Self {
        RunKind::Style(class.into())
    }

    pub fn category(&self) -> RunCategory {
        match self {
            RunKind::Style(_) => RunCategory::Lexical,
            RunKind::Link(_) | RunKind::Anchor(_) => RunCategory::Link,
        }
    }
}

/// An annotation over `[start, end)` of a file's source text (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleRun {
    pub start: usize,
    pub end: usize,
    pub kind: RunKind,
    /// Human-readable hover text.
    pub tooltip: Option<String>,
}

impl StyleRun {
    pub fn new(start: usize, end: usize, kind: RunKind) -> Self {
        Self {
            start,
            end,
            kind,
            tooltip: None,
        }
    }

    pub fn styled(start: usize, end: usize, class: impl Into<String>) -> Self {
        Self::new(start, end, RunKind::style(class))
    }

    pub fn link(start: usize, end: usize, target: LinkTarget) -> Self {
        Self::new(start, end, RunKind::Link(target))
    }

    pub fn anchor(start: usize, end: usize, id: impl Into<String>) -> Self {
        Self::new(start, end, RunKind::Anchor(id.into()))
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn category(&self) -> RunCategory {
        self.kind.category()
    }

    /// Check the offset invariant against `source`. Malformed runs are never
    /// clamped: they point at a bug in whichever producer emitted them.
    pub fn validate(&self, source: &str) -> Result<(), RunError> {
        if self.start > self.end {
            return Err(RunError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > source.len() {
            return Err(RunError::OutOfBounds {
                end: self.end,
                len: source.len(),
            });
        }
        for offset in [self.start, self.end] {
            if !source.is_char_boundary(offset) {
                return Err(RunError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }
}

/// One tile of the source text with the runs that cover it, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedSpan {
    pub start: usize,
    pub end: usize,
    /// Indices into [`Composition::runs`], in nesting order.
    pub active: Vec<usize>,
    /// Zero-length runs that sit at `start`.
    pub markers: Vec<usize>,
}

impl ComposedSpan {
    pub fn is_plain(&self) -> bool {
        self.active.is_empty() && self.markers.is_empty()
    }
}

/// Output of the compositor: a tiling of `[0, len)` plus the run table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    /// De-duplicated runs in production order.
    pub runs: Vec<StyleRun>,
    pub spans: Vec<ComposedSpan>,
    /// Zero-length runs at end of file, with no span to attach to.
    pub trailing: Vec<usize>,
}

impl Composition {
    pub fn run(&self, index: usize) -> &StyleRun {
        &self.runs[index]
    }
}
