//! srcview: render a static, cross-referenced HTML view of Python sources.
//!
//! `srcview <library-root> <file-or-dir> [output-dir]`
//!
//! The library root is indexed so names resolve, but only files under the
//! second argument are rendered.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use srcview::{NestingPolicy, RenderConfig};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "srcview",
    version,
    about = "Generate a cross-referenced, syntax-highlighted HTML view of source files"
)]
struct Cli {
    /// Root of the library the sources depend on (indexed, not rendered)
    library_root: PathBuf,

    /// File or directory to render
    file_or_dir: PathBuf,

    /// Output directory (default: ./html)
    output: Option<PathBuf>,

    /// Worker threads (default: number of cores)
    #[arg(short = 'j', long, default_value_t = 0)]
    jobs: usize,

    /// Nest links outside lexical highlights instead of inside them
    #[arg(long)]
    links_outermost: bool,

    /// Log per-file detail
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            usage();
            return Ok(());
        }
    };
    init_tracing(cli.verbose, cli.quiet);

    let policy = if cli.links_outermost {
        NestingPolicy::LinksOutermost
    } else {
        NestingPolicy::LinksInnermost
    };
    let config = RenderConfig::new(&cli.library_root, &cli.file_or_dir, cli.output.as_deref())?
        .with_policy(policy)
        .with_jobs(cli.jobs);

    srcview::generate(&config)?;
    Ok(())
}

fn usage() {
    eprintln!("Usage:  srcview <library-root> <file-or-dir> [output-dir]");
    eprintln!("  first arg specifies the root of the library the sources depend on");
    eprintln!("  second arg specifies the file or directory to generate pages for");
    eprintln!("  third arg specifies the output directory (default: ./html)");
    eprintln!("Example that renders just the email package:");
    eprintln!("  srcview ./Lib ./Lib/email");
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}
