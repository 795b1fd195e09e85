//! Span walk with stack discipline.
//!
//! The open-element stack is reconciled against each span's ordered run
//! list: the shared prefix stays open, the rest of the stack closes in
//! reverse, and the span's remaining runs open in order. Tags therefore
//! nest properly however many runs overlap.

use super::{escape_attr_into, escape_into, RenderContext};
use crate::model::{Composition, RunKind, StyleRun};

/// Render the source text with every run of `composition` applied.
pub fn render_spans(source: &str, composition: &Composition, ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    let mut stack: Vec<usize> = Vec::new();

    for span in &composition.spans {
        let keep = stack
            .iter()
            .zip(span.active.iter())
            .take_while(|(open, wanted)| open == wanted)
            .count();

        while stack.len() > keep {
            if let Some(index) = stack.pop() {
                close_tag(&mut out, composition.run(index));
            }
        }
        for &index in &span.active[keep..] {
            open_tag(&mut out, composition.run(index), ctx);
            stack.push(index);
        }
        for &index in &span.markers {
            marker(&mut out, composition.run(index), ctx);
        }

        escape_into(&mut out, &source[span.start..span.end]);
    }

    while let Some(index) = stack.pop() {
        close_tag(&mut out, composition.run(index));
    }
    for &index in &composition.trailing {
        marker(&mut out, composition.run(index), ctx);
    }

    out
}

fn open_tag(out: &mut String, run: &StyleRun, ctx: &RenderContext) {
    match &run.kind {
        RunKind::Style(class) => {
            out.push_str("<span class=\"");
            escape_attr_into(out, class);
            out.push('"');
        }
        RunKind::Link(target) => {
            out.push_str("<a href=\"");
            escape_attr_into(out, &ctx.href(target));
            out.push('"');
        }
        RunKind::Anchor(id) => {
            out.push_str("<span id=\"");
            escape_attr_into(out, id);
            out.push('"');
        }
    }
    if let Some(tooltip) = &run.tooltip {
        out.push_str(" title=\"");
        escape_attr_into(out, tooltip);
        out.push('"');
    }
    out.push('>');
}

fn close_tag(out: &mut String, run: &StyleRun) {
    match run.kind {
        RunKind::Link(_) => out.push_str("</a>"),
        RunKind::Style(_) | RunKind::Anchor(_) => out.push_str("</span>"),
    }
}

/// Zero-width run: an empty element.
fn marker(out: &mut String, run: &StyleRun, ctx: &RenderContext) {
    open_tag(out, run, ctx);
    close_tag(out, run);
}
