// src/batch.rs

use crate::error::Result;
use crate::model::{ReportRow, Verdict};
use crate::report::ReportWriter;
use indicatif::ProgressBar;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Verdict counts for a finished run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub equal: usize,
    pub not_equal: usize,
    pub no_functions: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl BatchSummary {
    fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Equal => self.equal += 1,
            Verdict::NotEqual => self.not_equal += 1,
            Verdict::NoFunctions => self.no_functions += 1,
            Verdict::Fail => self.failed += 1,
            Verdict::Unknown => self.unknown += 1,
        }
    }
}

/// Reads commit ids line by line and writes one report row per commit.
///
/// Blank lines and `#` comments are skipped. A commit failing in an external
/// tool becomes a `FAIL` row and the run goes on; any other error stops the
/// run after the rows written so far.
pub fn run_batch<R, W, F>(input: R, writer: &mut ReportWriter<W>, mut analyze: F, bar: &ProgressBar) -> Result<BatchSummary>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<ReportRow>,
{
    let mut summary = BatchSummary::default();
    writer.write_header()?;

    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let commit = line.trim();
        if commit.is_empty() {
            warn!(line = lineno + 1, "skipping blank input line");
            continue;
        }
        if commit.starts_with('#') {
            debug!(line = lineno + 1, "skipping comment");
            continue;
        }

        bar.set_message(commit.to_string());
        let row = match analyze(commit) {
            Ok(row) => row,
            Err(e) if e.is_external() => {
                warn!(commit, error = %e, "commit failed");
                ReportRow::failed(commit)
            }
            Err(e) => return Err(e),
        };

        summary.record(row.verdict());
        writer.write_row(&row)?;
        bar.inc(1);
    }

    debug!(?summary, "batch finished");
    Ok(summary)
}
