//! Markup renderer: composed spans to escaped, line-numbered HTML.

pub mod lineno;
pub mod markup;

use crate::model::{Composition, LinkTarget};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};

pub use lineno::add_line_numbers;
pub use markup::render_spans;

/// Characters escaped in a path segment of an href.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// Per-page state the renderer needs.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Output path of the page being rendered. Links are made relative to it.
    pub page: PathBuf,
}

impl RenderContext {
    pub fn new(page: impl Into<PathBuf>) -> Self {
        Self { page: page.into() }
    }

    /// Relative href from this page to `target`, fragment included.
    pub fn href(&self, target: &LinkTarget) -> String {
        let mut href = if target.page == self.page {
            String::new()
        } else {
            let from = self.page.parent().unwrap_or_else(|| Path::new(""));
            encode_path(&relative_path(from, &target.page))
        };
        match &target.fragment {
            Some(fragment) => {
                href.push('#');
                href.extend(utf8_percent_encode(fragment, SEGMENT));
            }
            None if href.is_empty() => {
                // Same page, no anchor: link to the page itself.
                if let Some(name) = self.page.file_name() {
                    href.extend(utf8_percent_encode(&name.to_string_lossy(), SEGMENT));
                }
            }
            None => {}
        }
        href
    }
}

/// Render a composed file body: styled markup, then line numbers.
pub fn render_body(source: &str, composition: &Composition, ctx: &RenderContext) -> String {
    add_line_numbers(&render_spans(source, composition, ctx))
}

/// Escape text for use in an HTML text node or a quoted attribute value.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

pub(crate) fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

/// Like [`escape_into`], but also keeps line breaks out of attribute values
/// so the line-number pass never splits inside a tag.
pub(crate) fn escape_attr_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => escape_into(out, c.encode_utf8(&mut [0; 4])),
        }
    }
}

/// Path from directory `from` to `to`, both absolute (or both relative to
/// the same base).
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for part in &to[common..] {
        rel.push(part.as_os_str());
    }
    rel
}

/// Join path components with `/`, percent-encoding each segment.
fn encode_path(path: &Path) -> String {
    let mut out = String::new();
    for (n, part) in path.components().enumerate() {
        if n > 0 {
            out.push('/');
        }
        let segment = part.as_os_str().to_string_lossy();
        out.extend(utf8_percent_encode(&segment, SEGMENT));
    }
    out
}
