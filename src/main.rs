// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use kemp_regress::analyzer::{CommitAnalyzer, WorkDirs};
use kemp_regress::batch::run_batch;
use kemp_regress::builder::KernelBuilder;
use kemp_regress::cli::Args;
use kemp_regress::comparator::DiffKemp;
use kemp_regress::config::{Config, FileConfig};
use kemp_regress::locator::GitChangeSource;
use kemp_regress::report::ReportWriter;
use std::io;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries only the report.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {pos} commits, current {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(200));
    bar
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let start_time = Instant::now();

    let file = match &args.config {
        Some(path) => FileConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => FileConfig::default(),
    };
    let config = Config::resolve(&args, file);

    let source = GitChangeSource::open(&config.repo)
        .with_context(|| format!("opening repository {}", config.repo.display()))?;
    let builder = KernelBuilder::new(&config.repo, &config.diffkemp, config.prepare.clone(), config.timeout)?;
    let comparator = DiffKemp::new(&config.diffkemp, config.timeout);
    let mut analyzer = CommitAnalyzer::new(source, builder, comparator, WorkDirs::new(&config.work_dir), config.low_confidence);

    let bar = progress_bar(args.quiet);
    let mut writer = ReportWriter::new(io::stdout().lock());
    let result = run_batch(io::stdin().lock(), &mut writer, |commit| analyzer.analyze(commit), &bar);
    bar.finish_and_clear();

    let summary = result.context("batch aborted")?;
    tracing::info!(
        total = summary.total,
        equal = summary.equal,
        not_equal = summary.not_equal,
        no_functions = summary.no_functions,
        failed = summary.failed,
        unknown = summary.unknown,
        "analysis finished in {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}
