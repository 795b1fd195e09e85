//! Render configuration, validated before any indexing starts.

use crate::compose::NestingPolicy;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output directory used when none is given, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "html";

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Indexed for name resolution, never rendered.
    pub library_root: PathBuf,
    /// File or directory the user asked for.
    pub target: PathBuf,
    /// `target` if it is a directory, otherwise its parent. Canonical.
    pub render_root: PathBuf,
    /// Absolute.
    pub output_dir: PathBuf,
    pub policy: NestingPolicy,
    /// Worker threads; 0 picks the number of cores.
    pub jobs: usize,
}

impl RenderConfig {
    pub fn new(library_root: &Path, target: &Path, output_dir: Option<&Path>) -> Result<Self> {
        let target = check_readable(target)?;
        let library_root = check_readable(library_root)?;
        if !library_root.is_dir() {
            bail!("Not a directory: {}", library_root.display());
        }

        let render_root = if target.is_file() {
            target
                .parent()
                .map(Path::to_path_buf)
                .with_context(|| format!("{} has no parent directory", target.display()))?
        } else {
            target.clone()
        };

        let output_dir = output_dir.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR));
        let output_dir = if output_dir.is_absolute() {
            output_dir.to_path_buf()
        } else {
            std::env::current_dir()
                .context("failed to resolve the working directory")?
                .join(output_dir)
        };

        Ok(Self {
            library_root,
            target,
            render_root,
            output_dir,
            policy: NestingPolicy::default(),
            jobs: 0,
        })
    }

    pub fn with_policy(mut self, policy: NestingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }
}

/// Canonical form of `path`, or a configuration error if it cannot be read.
pub fn check_readable(path: &Path) -> Result<PathBuf> {
    let readable = if path.is_dir() {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    };
    if !readable {
        bail!("Path not found or not readable: {}", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("Path not found or not readable: {}", path.display()))
}

/// Create `dir` (and parents) if missing. Safe to call repeatedly.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    info!("Created directory: {}", dir.display());
    Ok(())
}
