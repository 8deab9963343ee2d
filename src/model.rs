// src/model.rs

use std::collections::BTreeSet;

/// A bare function identifier taken from a hunk header
pub type FunctionName = String;

/// The functions touched by one commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub functions: BTreeSet<FunctionName>,
    /// False if any hunk could not be attributed to a function
    pub confident: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// A commit resolved against its parent, ready for snapshot builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChange {
    /// Full id of the parent commit
    pub old: String,
    /// Full id of the commit itself
    pub new: String,
    pub change_set: ChangeSet,
}

/// Aggregate counts reported by one comparator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonResult {
    pub equal_count: usize,
    pub total_count: usize,
}

impl ComparisonResult {
    pub fn verdict(&self) -> Verdict {
        if self.equal_count == self.total_count {
            Verdict::Equal
        } else {
            Verdict::NotEqual
        }
    }
}

/// Final per-commit classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Equal,
    NotEqual,
    NoFunctions,
    Fail,
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Equal => "equal",
            Verdict::NotEqual => "not equal",
            Verdict::NoFunctions => "NO-FUNCTIONS",
            Verdict::Fail => "FAIL",
            Verdict::Unknown => "UNK",
        }
    }
}

/// What happened to one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Analyzed {
        functions: BTreeSet<FunctionName>,
        comparison: ComparisonResult,
        confident: bool,
    },
    NoFunctions,
    Failed,
    /// Extraction was not confident and the run was told not to build
    LowConfidenceSkipped { functions: BTreeSet<FunctionName> },
}

impl Outcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Analyzed { comparison, .. } => comparison.verdict(),
            Outcome::NoFunctions => Verdict::NoFunctions,
            Outcome::Failed => Verdict::Fail,
            Outcome::LowConfidenceSkipped { .. } => Verdict::Unknown,
        }
    }
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub commit: String,
    pub outcome: Outcome,
}

impl ReportRow {
    pub fn new(commit: impl Into<String>, outcome: Outcome) -> Self {
        ReportRow { commit: commit.into(), outcome }
    }

    pub fn failed(commit: impl Into<String>) -> Self {
        ReportRow::new(commit, Outcome::Failed)
    }

    pub fn verdict(&self) -> Verdict {
        self.outcome.verdict()
    }
}
