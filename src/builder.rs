// src/builder.rs

use crate::error::Result;
use crate::model::FunctionName;
use crate::process::{run_step, Step};
use git2::build::CheckoutBuilder;
use git2::Repository;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Produces a snapshot of the project at one commit, limited to a set of functions
pub trait SnapshotBuilder {
    /// Builds into `output_dir`. A failed build leaves whatever it produced
    /// in place for inspection.
    fn build_snapshot(&mut self, commit: &str, functions: &BTreeSet<FunctionName>, output_dir: &Path) -> Result<()>;
}

/// Builds kernel snapshots in place in a single working tree.
///
/// Owns the repository handle used for checkout, and `build_snapshot` takes
/// `&mut self`, so builds on one tree never overlap.
pub struct KernelBuilder {
    repo: Repository,
    repo_path: PathBuf,
    diffkemp: PathBuf,
    prepare: Vec<Step>,
    timeout: Option<Duration>,
}

impl KernelBuilder {
    pub fn new(repo_path: &Path, diffkemp: &Path, prepare: Vec<Step>, timeout: Option<Duration>) -> Result<Self> {
        Ok(KernelBuilder {
            repo: Repository::open(repo_path)?,
            repo_path: repo_path.to_path_buf(),
            diffkemp: diffkemp.to_path_buf(),
            prepare,
            timeout,
        })
    }

    /// Discards untracked and modified files and detaches HEAD at `commit`.
    fn checkout_clean(&self, commit: &str) -> Result<()> {
        let target = self.repo.revparse_single(commit)?.peel_to_commit()?;
        let mut opts = CheckoutBuilder::new();
        opts.force().remove_untracked(true).remove_ignored(true);
        self.repo.checkout_tree(target.as_object(), Some(&mut opts))?;
        self.repo.set_head_detached(target.id())?;
        debug!(commit = %target.id(), "working tree reset");
        Ok(())
    }

    fn build_step(&self, output_dir: &Path, function_list: &Path) -> Step {
        Step::new(self.diffkemp.to_string_lossy(), ["build-kernel"])
            .arg(&self.repo_path)
            .arg(output_dir)
            .arg(function_list)
    }
}

impl SnapshotBuilder for KernelBuilder {
    fn build_snapshot(&mut self, commit: &str, functions: &BTreeSet<FunctionName>, output_dir: &Path) -> Result<()> {
        info!(commit, functions = functions.len(), output = %output_dir.display(), "building snapshot");
        self.checkout_clean(commit)?;

        for step in &self.prepare {
            run_step(step, Some(&self.repo_path), self.timeout)?;
        }

        let function_list = write_function_list(functions)?;
        run_step(&self.build_step(output_dir, function_list.path()), None, self.timeout)?;
        Ok(())
    }
}

/// Writes one name per line, each newline-terminated. The file is removed
/// when the handle drops.
fn write_function_list(functions: &BTreeSet<FunctionName>) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().prefix("functions-").suffix(".list").tempfile()?;
    for name in functions {
        writeln!(file, "{}", name)?;
    }
    file.flush()?;
    Ok(file)
}
