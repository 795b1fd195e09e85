//! Page assembler: one standalone HTML document per source file.

use crate::error::{PageError, RenderError};
use crate::template::{Slot, Template};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Suffix appended to the source file name (extension included).
pub const PAGE_SUFFIX: &str = ".html";

/// Class table shared by the styler, linker and line numbers.
pub const STYLESHEET: &str = "\
a {text-decoration: none; color: #2e8b57}
table, th, td { border: 1px solid lightgrey; padding: 5px; }
.builtin {color: #5b4eaf;}
.comment, .block-comment {color: #aaaaaa; font-style: italic;}
.constant {color: #888888;}
.decorator {color: #778899;}
.doc-string {color: #005000;}
.error {border-bottom: 1px solid red;}
.field-name {color: #2e8b57;}
.function {color: #880000;}
.identifier {color: #8b7765;}
.info {border-bottom: 1px dotted RoyalBlue;}
.keyword {color: #0000cd;}
.lineno {color: #aaaaaa;}
.number {color: #483d8b;}
.parameter {color: #2e8b57;}
.string {color: #4169e1;}
.type-name {color: #4682b4;}
.warning {border-bottom: 1px dotted orange;}
";

/// `highlight(id, ...)` clears the previous highlight set, then highlights
/// exactly the elements named.
pub const SCRIPT: &str = "\
var highlighted = [];
function highlight() {
    for (var i = 0; i < highlighted.length; i++) {
        var elm = document.getElementById(highlighted[i]);
        if (elm != null) {
            elm.style.backgroundColor = '';
        }
    }
    highlighted = [];
    for (var i = 0; i < arguments.length; i++) {
        var elm = document.getElementById(arguments[i]);
        if (elm != null) {
            elm.style.backgroundColor = 'gold';
        }
        highlighted.push(arguments[i]);
    }
}
";

const PAGE_TEMPLATE: &str = "\
<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>${title}</title>
<style type=\"text/css\">
${style}</style>
<script type=\"text/javascript\">
${script}</script>
</head>
<body>
<table width=\"100%\"><tr><td valign=\"top\">${outline}</td><td><pre>${body}</pre></td></tr></table>
</body>
</html>
";

static PAGE: LazyLock<Template> = LazyLock::new(|| Template::new(PAGE_TEMPLATE));

/// Where the page for `source` lands: `output_dir/<source relative to root>.html`.
pub fn output_path(render_root: &Path, output_dir: &Path, source: &Path) -> Result<PathBuf, PageError> {
    let outside = || PageError::OutsideRoot {
        path: source.to_path_buf(),
        root: render_root.to_path_buf(),
    };
    let relative = source.strip_prefix(render_root).map_err(|_| outside())?;
    let mut name = relative.file_name().ok_or_else(outside)?.to_os_string();
    name.push(PAGE_SUFFIX);

    let mut out = output_dir.join(relative);
    out.set_file_name(name);
    Ok(out)
}

/// A rendered document, ready to be written.
#[derive(Debug, Clone)]
pub struct Page {
    pub source: PathBuf,
    pub output: PathBuf,
    pub html: String,
}

impl Page {
    /// Write the page atomically, creating parent directories as needed.
    ///
    /// The document goes to a temporary file next to the destination and
    /// is renamed into place, so a failure leaves no partial page behind.
    pub fn write(&self) -> Result<(), RenderError> {
        let write_err = |source: std::io::Error| RenderError::Write {
            path: self.output.clone(),
            source,
        };
        let dir = self.output.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(self.html.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.output).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Builds pages for files under one render root.
#[derive(Debug, Clone)]
pub struct PageAssembler {
    render_root: PathBuf,
    output_dir: PathBuf,
}

impl PageAssembler {
    pub fn new(render_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            render_root: render_root.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn render_root(&self) -> &Path {
        &self.render_root
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_path(&self, source: &Path) -> Result<PathBuf, PageError> {
        output_path(&self.render_root, &self.output_dir, source)
    }

    /// Wrap a rendered body and outline fragment into a full document.
    pub fn assemble(&self, source: &Path, body: &str, outline: &str) -> Result<Page, RenderError> {
        let output = self.output_path(source)?;

        let mut values = HashMap::new();
        values.insert("title", Slot::Text(source.display().to_string()));
        values.insert("style", Slot::Markup(STYLESHEET.to_string()));
        values.insert("script", Slot::Markup(SCRIPT.to_string()));
        values.insert("outline", Slot::Markup(outline.to_string()));
        values.insert("body", Slot::Markup(body.to_string()));
        let html = PAGE.render(&values)?;

        Ok(Page {
            source: source.to_path_buf(),
            output,
            html,
        })
    }
}
