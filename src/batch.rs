//! Batch driver: render every indexed file under the render root.
//!
//! Files are independent: the only shared state is the read-only
//! collaborators and the progress counter, so pages are produced on a rayon
//! pool. A file that cannot be read or written is logged and skipped; a
//! malformed style run aborts the batch.

use crate::compose::{compose, NestingPolicy};
use crate::error::RenderError;
use crate::page::{Page, PageAssembler};
use crate::progress::Progress;
use crate::providers::{Outliner, RunProducer, SourceSet};
use crate::render::{render_body, RenderContext};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Log a progress line every this many files.
const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: usize,
    pub failed: usize,
    /// Indexed as dependencies only.
    pub outside_root: usize,
    pub elapsed: Duration,
}

pub struct BatchDriver<'a> {
    files: &'a dyn SourceSet,
    producers: Vec<&'a dyn RunProducer>,
    outliner: &'a dyn Outliner,
    pages: PageAssembler,
    policy: NestingPolicy,
    jobs: usize,
}

impl<'a> BatchDriver<'a> {
    pub fn new(files: &'a dyn SourceSet, outliner: &'a dyn Outliner, pages: PageAssembler) -> Self {
        Self {
            files,
            producers: Vec::new(),
            outliner,
            pages,
            policy: NestingPolicy::default(),
            jobs: 0,
        }
    }

    /// Producers run in the order added; that order breaks nesting ties.
    pub fn producer(mut self, producer: &'a dyn RunProducer) -> Self {
        self.producers.push(producer);
        self
    }

    pub fn policy(mut self, policy: NestingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Read, annotate, compose, render and assemble one file.
    pub fn render_file(&self, path: &Path) -> Result<Page, RenderError> {
        let source = fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut runs = Vec::new();
        for producer in &self.producers {
            let produced = producer.runs(path, &source);
            debug!(path = %path.display(), producer = producer.name(), runs = produced.len());
            runs.extend(produced);
        }
        let composition = compose(&source, &runs, self.policy).map_err(|source| RenderError::Run {
            path: path.to_path_buf(),
            source,
        })?;

        let ctx = RenderContext::new(self.pages.output_path(path)?);
        let body = render_body(&source, &composition, &ctx);
        let outline = self.outliner.outline(path);
        self.pages.assemble(path, &body, &outline)
    }

    pub fn run(&self) -> Result<BatchReport> {
        let started = Instant::now();
        let root = self.pages.render_root();
        let (files, outside): (Vec<PathBuf>, Vec<PathBuf>) = self
            .files
            .loaded_files()
            .into_iter()
            .partition(|path| path.starts_with(root));
        for path in &outside {
            debug!(path = %path.display(), "dependency only, not rendered");
        }

        let progress = Progress::new(files.len(), PROGRESS_INTERVAL);
        let written = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .context("failed to start worker pool")?;
        pool.install(|| {
            files.par_iter().try_for_each(|path| {
                let result = self.render_file(path).and_then(|page| {
                    page.write()?;
                    debug!(path = %page.output.display(), "wrote page");
                    Ok(())
                });
                progress.tick();
                match result {
                    Ok(()) => {
                        written.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    }
                    Err(e) if e.is_recoverable() => {
                        let action = match e {
                            RenderError::Write { .. } => "write",
                            _ => "read",
                        };
                        warn!(path = %path.display(), error = %describe(&e), "Failed to {}", action);
                        failed.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            })
        })?;
        progress.end();

        Ok(BatchReport {
            written: written.into_inner(),
            failed: failed.into_inner(),
            outside_root: outside.len(),
            elapsed: started.elapsed(),
        })
    }
}

/// Error message with its cause chain, `outer: inner: ...`.
fn describe(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleRun;
    use tempfile::TempDir;

    struct Files(Vec<PathBuf>);

    impl SourceSet for Files {
        fn loaded_files(&self) -> Vec<PathBuf> {
            self.0.clone()
        }
    }

    struct NoOutline;

    impl Outliner for NoOutline {
        fn outline(&self, _path: &Path) -> String {
            String::new()
        }
    }

    /// Marks the whole file as a comment.
    struct WholeFile;

    impl RunProducer for WholeFile {
        fn name(&self) -> &str {
            "whole-file"
        }

        fn runs(&self, _path: &Path, source: &str) -> Vec<StyleRun> {
            vec![StyleRun::styled(0, source.len(), "comment")]
        }
    }

    /// Emits a run past the end of every file.
    struct Broken;

    impl RunProducer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn runs(&self, _path: &Path, source: &str) -> Vec<StyleRun> {
            vec![StyleRun::styled(0, source.len() + 1, "keyword")]
        }
    }

    #[test]
    fn renders_only_files_under_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("pkg/a.py"), "# a\n").unwrap();
        fs::write(dir.path().join("dep.py"), "# dep\n").unwrap();

        let files = Files(vec![root.join("pkg/a.py"), dir.path().join("dep.py")]);
        let out = dir.path().join("out");
        let report = BatchDriver::new(&files, &NoOutline, PageAssembler::new(&root, &out))
            .producer(&WholeFile)
            .jobs(2)
            .run()
            .unwrap();

        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.outside_root, 1);
        let html = fs::read_to_string(out.join("pkg/a.py.html")).unwrap();
        assert!(html.contains("<span class=\"comment\"># a\n</span>"));
        assert!(!html.contains("line-2"));
        assert!(!out.join("dep.py.html").exists());
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.py"), "x\n").unwrap();
        let files = Files(vec![dir.path().join("gone.py"), dir.path().join("ok.py")]);
        let out = dir.path().join("out");

        let report = BatchDriver::new(&files, &NoOutline, PageAssembler::new(dir.path(), &out))
            .producer(&WholeFile)
            .run()
            .unwrap();

        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 1);
        assert!(out.join("ok.py.html").exists());
        assert!(!out.join("gone.py.html").exists());
    }

    #[test]
    fn blocked_destination_is_skipped_without_leftovers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x\n").unwrap();
        fs::write(dir.path().join("b.py"), "y\n").unwrap();
        let out = dir.path().join("out");
        // A directory where the page should go makes the final rename fail.
        fs::create_dir_all(out.join("a.py.html")).unwrap();

        let files = Files(vec![dir.path().join("a.py"), dir.path().join("b.py")]);
        let report = BatchDriver::new(&files, &NoOutline, PageAssembler::new(dir.path(), &out))
            .producer(&WholeFile)
            .run()
            .unwrap();

        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 1);
        assert!(out.join("a.py.html").is_dir());
        assert!(out.join("b.py.html").is_file());
        let mut entries: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["a.py.html", "b.py.html"]);
    }

    #[test]
    fn malformed_run_aborts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x\n").unwrap();
        let files = Files(vec![dir.path().join("a.py")]);

        let err = BatchDriver::new(&files, &NoOutline, PageAssembler::new(dir.path(), dir.path().join("out")))
            .producer(&Broken)
            .run()
            .unwrap_err();
        let err = err.downcast::<RenderError>().unwrap();
        assert!(matches!(err, RenderError::Run { .. }));
    }

    #[test]
    fn describe_includes_causes() {
        let err = RenderError::Read {
            path: PathBuf::from("a.py"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(describe(&err), "failed to read a.py: no such file");
    }
}
