//! Outline panel built from the declaration index.

use super::index::{Declaration, SourceIndex};
use super::Outliner;
use crate::render::escape_html;
use crate::render::lineno::line_id;
use std::path::Path;

pub struct DeclarationOutline<'a> {
    index: &'a SourceIndex,
}

impl<'a> DeclarationOutline<'a> {
    pub fn new(index: &'a SourceIndex) -> Self {
        Self { index }
    }

    fn write_level(&self, out: &mut String, decls: &[(usize, &Declaration)], parent: Option<usize>) {
        let children: Vec<&(usize, &Declaration)> =
            decls.iter().filter(|(_, d)| d.parent == parent).collect();
        if children.is_empty() {
            return;
        }

        out.push_str("<ul>\n");
        for (id, decl) in children {
            let line = escape_html(&line_id(decl.line));
            let anchor = escape_html(&decl.anchor());
            out.push_str(&format!(
                "<li><span class=\"keyword\">{}</span> <a href=\"#{}\" onclick=\"highlight('{}', '{}')\">{}</a>",
                decl.kind.label(),
                line,
                line,
                anchor,
                escape_html(&decl.name)
            ));
            self.write_level(out, decls, Some(*id));
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }
}

impl Outliner for DeclarationOutline<'_> {
    fn outline(&self, path: &Path) -> String {
        let decls: Vec<(usize, &Declaration)> = self.index.declarations_in(path).collect();
        let mut out = String::from("<div class=\"outline\">\n");
        if let Some(name) = path.file_name() {
            out.push_str(&format!("<b>{}</b>\n", escape_html(&name.to_string_lossy())));
        }
        self.write_level(&mut out, &decls, None);
        out.push_str("</div>\n");
        out
    }
}
