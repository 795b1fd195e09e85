//! `${name}` templates with centralized escaping.
//!
//! Uses the same placeholder syntax as prefix templates elsewhere in the
//! toolchain. Values are either plain text (escaped on substitution) or a
//! trusted markup fragment (inserted as-is).

use crate::error::TemplateError;
use crate::render::escape_html;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Value for one placeholder.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Escaped before insertion.
    Text(String),
    /// Inserted verbatim; the producer guarantees it is well-formed.
    Markup(String),
}

impl Slot {
    fn rendered(&self) -> String {
        match self {
            Slot::Text(text) => escape_html(text),
            Slot::Markup(markup) => markup.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    source: &'static str,
    names: Vec<String>,
}

impl Template {
    pub fn new(source: &'static str) -> Self {
        let mut names: Vec<String> = RE_PLACEHOLDER
            .captures_iter(source)
            .map(|caps| caps[1].to_string())
            .collect();
        names.sort();
        names.dedup();
        Self { source, names }
    }

    /// Placeholder names, sorted.
    pub fn placeholders(&self) -> &[String] {
        &self.names
    }

    /// Fill every placeholder. Supplying a value the template does not use,
    /// or leaving one unfilled, is an error.
    pub fn render(&self, values: &HashMap<&str, Slot>) -> Result<String, TemplateError> {
        if let Some(unknown) = values
            .keys()
            .find(|key| !self.names.iter().any(|name| name == *key))
        {
            return Err(TemplateError::UnknownPlaceholder(unknown.to_string()));
        }
        if let Some(missing) = self
            .names
            .iter()
            .find(|name| !values.contains_key(name.as_str()))
        {
            return Err(TemplateError::MissingValue(missing.clone()));
        }

        let mut out = String::with_capacity(self.source.len());
        let mut last = 0;
        for caps in RE_PLACEHOLDER.captures_iter(self.source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&self.source[last..whole.start()]);
            if let Some(slot) = values.get(name.as_str()) {
                out.push_str(&slot.rendered());
            }
            last = whole.end();
        }
        out.push_str(&self.source[last..]);
        Ok(out)
    }
}
