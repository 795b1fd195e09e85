//! srcview: cross-referenced, syntax-highlighted static HTML for a source tree.
//!
//! Each source file becomes one standalone page: lexical highlighting plus
//! links from identifiers to their declarations, beside an outline panel.
//!
//! Pipeline per file:
//!
//! 1. **Produce**: every [`RunProducer`] annotates the source with [`StyleRun`]s
//! 2. **Compose**: [`compose`] merges overlapping runs into a tiling of spans
//! 3. **Render**: [`render::render_body`] emits escaped, line-numbered markup
//! 4. **Assemble**: [`PageAssembler`] wraps body and outline into a document
//! 5. **Write**: the [`BatchDriver`] writes pages under the output directory

pub mod batch;
pub mod compose;
pub mod config;
pub mod error;
pub mod model;
pub mod page;
pub mod progress;
pub mod providers;
pub mod render;
pub mod template;

pub use batch::{BatchDriver, BatchReport};
pub use compose::{compose, NestingPolicy};
pub use config::RenderConfig;
pub use error::{PageError, RenderError, RunError, TemplateError};
pub use model::{ComposedSpan, Composition, LinkTarget, RunCategory, RunKind, StyleRun};
pub use page::{Page, PageAssembler};
pub use providers::{Outliner, RunProducer, SourceSet};

use anyhow::Result;
use progress::time_string;
use providers::{DeclarationLinker, DeclarationOutline, LexicalStyler, SourceIndex};
use std::time::Instant;
use tracing::info;

/// Index the library root and target, then render every file under the
/// render root with the built-in styler, linker and outline.
pub fn generate(config: &RenderConfig) -> Result<BatchReport> {
    let started = Instant::now();
    info!("Building index");
    let index = SourceIndex::build(&[&config.library_root, &config.target])?;
    info!("{}", index.status_report());
    info!("Finished indexing in: {}", time_string(started.elapsed()));

    info!("Generating HTML");
    config::ensure_output_dir(&config.output_dir)?;

    let pages = PageAssembler::new(&config.render_root, &config.output_dir);
    let styler = LexicalStyler;
    let linker = DeclarationLinker::new(&index, pages.clone());
    let outline = DeclarationOutline::new(&index);

    let report = BatchDriver::new(&index, &outline, pages)
        .producer(&styler)
        .producer(&linker)
        .policy(config.policy)
        .jobs(config.jobs)
        .run()?;

    info!(
        "Wrote {} files to {}",
        report.written,
        config.output_dir.display()
    );
    if report.failed > 0 {
        info!("{} files could not be rendered", report.failed);
    }
    info!("Finished generating HTML in: {}", time_string(report.elapsed));
    Ok(report)
}
