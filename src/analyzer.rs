// src/analyzer.rs

use crate::builder::SnapshotBuilder;
use crate::cli::LowConfidence;
use crate::comparator::Comparator;
use crate::error::Result;
use crate::locator::ChangeSource;
use crate::model::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Per-run output directories, keyed by commit id
#[derive(Debug, Clone)]
pub struct WorkDirs {
    root: PathBuf,
}

impl WorkDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        WorkDirs { root: root.into() }
    }

    pub fn snapshot_dir(&self, commit: &str) -> PathBuf {
        self.root.join("snapshot").join(commit)
    }

    pub fn result_dir(&self, commit: &str) -> PathBuf {
        self.root.join("result").join(commit)
    }
}

/// Runs the whole pipeline for one commit at a time
pub struct CommitAnalyzer<S, B, C> {
    source: S,
    builder: B,
    comparator: C,
    dirs: WorkDirs,
    low_confidence: LowConfidence,
}

impl<S, B, C> CommitAnalyzer<S, B, C>
where
    S: ChangeSource,
    B: SnapshotBuilder,
    C: Comparator,
{
    pub fn new(source: S, builder: B, comparator: C, dirs: WorkDirs, low_confidence: LowConfidence) -> Self {
        CommitAnalyzer {
            source,
            builder,
            comparator,
            dirs,
            low_confidence,
        }
    }

    /// Analyzes one commit against its parent.
    ///
    /// An empty change set short-circuits to `NoFunctions` without building
    /// anything. Old and new snapshots are built one after the other because
    /// they share a working tree.
    pub fn analyze(&mut self, commit: &str) -> Result<ReportRow> {
        let change = self.source.resolve(commit)?;
        let ChangeSet { functions, confident } = change.change_set;

        if functions.is_empty() {
            info!(commit, "no functions changed");
            return Ok(ReportRow::new(commit, Outcome::NoFunctions));
        }
        if !confident && self.low_confidence == LowConfidence::Skip {
            warn!(commit, "skipping commit with unattributed hunks");
            return Ok(ReportRow::new(commit, Outcome::LowConfidenceSkipped { functions }));
        }

        let snapshot_dir = self.dirs.snapshot_dir(commit);
        let result_dir = self.dirs.result_dir(commit);
        prepare_dirs(&snapshot_dir, &result_dir)?;

        let old_dir = snapshot_dir.join("old");
        let new_dir = snapshot_dir.join("new");
        self.builder.build_snapshot(&change.old, &functions, &old_dir)?;
        self.builder.build_snapshot(&change.new, &functions, &new_dir)?;

        let equal_count = self.comparator.compare(&old_dir, &new_dir, &result_dir)?;
        let comparison = ComparisonResult {
            equal_count,
            total_count: functions.len(),
        };
        info!(commit, equal = equal_count, total = comparison.total_count, verdict = comparison.verdict().as_str(), "commit analyzed");

        Ok(ReportRow::new(
            commit,
            Outcome::Analyzed {
                functions,
                comparison,
                confident,
            },
        ))
    }
}

/// Clears any earlier result for this commit. Snapshot directories are kept
/// as they are; the builder writes over them.
fn prepare_dirs(snapshot_dir: &Path, result_dir: &Path) -> Result<()> {
    if result_dir.exists() {
        fs::remove_dir_all(result_dir)?;
    }
    fs::create_dir_all(snapshot_dir)?;
    if let Some(parent) = result_dir.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
