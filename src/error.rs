// src/error.rs

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while analyzing a commit
#[derive(Error, Debug)]
pub enum Error {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("commit {0} has no parent to compare against")]
    RootCommit(String),

    #[error("`{step}` exited with {status}: {stderr}")]
    ProcessFailed {
        step: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{step}` timed out after {after:?}")]
    ProcessTimeout { step: String, after: Duration },

    #[error("failed to spawn `{step}`: {source}")]
    ProcessSpawn {
        step: String,
        #[source]
        source: std::io::Error,
    },

    /// The comparator ran but its report had no `Equal:` summary line.
    #[error("comparator output in {} has no `Equal:` summary line", result_dir.display())]
    MissingSummary { result_dir: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure came from an external collaborator that ran and
    /// failed: a child exiting non-zero or timing out, or the version-control
    /// lookup of an input commit.
    ///
    /// These are expected during long runs and become `FAIL` rows. A program
    /// that cannot be spawned at all is a setup mistake and, like every other
    /// kind, aborts the batch.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Error::Git(_)
                | Error::RootCommit(_)
                | Error::ProcessFailed { .. }
                | Error::ProcessTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
