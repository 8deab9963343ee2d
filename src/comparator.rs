// src/comparator.rs

use crate::error::{Error, Result};
use crate::process::{run_step, Step};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

/// Compares two snapshots and reports how many functions stayed equal
pub trait Comparator {
    fn compare(&mut self, old: &Path, new: &Path, result_dir: &Path) -> Result<usize>;
}

/// Drives `diffkemp compare`
pub struct DiffKemp {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl DiffKemp {
    pub fn new(executable: &Path, timeout: Option<Duration>) -> Self {
        DiffKemp {
            executable: executable.to_path_buf(),
            timeout,
        }
    }

    fn compare_step(&self, old: &Path, new: &Path, result_dir: &Path) -> Step {
        Step::new(self.executable.to_string_lossy(), ["compare"])
            .arg(old)
            .arg(new)
            .arg("--report-stat")
            .arg("-o")
            .arg(result_dir)
    }
}

impl Comparator for DiffKemp {
    /// Returns the number of functions proven equal.
    fn compare(&mut self, old: &Path, new: &Path, result_dir: &Path) -> Result<usize> {
        let output = run_step(&self.compare_step(old, new, result_dir), None, self.timeout)?;
        let equal = parse_equal_count(&output.stdout).ok_or_else(|| Error::MissingSummary {
            result_dir: result_dir.to_path_buf(),
        })?;
        info!(equal, result = %result_dir.display(), "comparison finished");
        Ok(equal)
    }
}

/// Reads the first `Equal: N` line of a statistics report.
pub fn parse_equal_count(report: &str) -> Option<usize> {
    static EQUAL: OnceLock<Regex> = OnceLock::new();
    let re = EQUAL.get_or_init(|| Regex::new(r"(?m)^Equal:\s*(\d+)").expect("valid summary regex"));
    re.captures(report)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Statistics
----------
Total params: 2
Equal:        1 (50%)
Not equal:    1 (50%)
(empty diff): 0 (0%)
Unknown:      0 (0%)
Errors:       0 (0%)
";

    #[test]
    fn test_parse_equal_count_from_report() {
        assert_eq!(parse_equal_count(REPORT), Some(1));
    }

    #[test]
    fn test_parse_equal_count_first_match_wins() {
        assert_eq!(parse_equal_count("Equal: 3\nEqual: 7\n"), Some(3));
    }

    #[test]
    fn test_parse_equal_count_is_line_anchored_and_case_sensitive() {
        assert_eq!(parse_equal_count("Not Equal: 4\n"), None);
        assert_eq!(parse_equal_count("equal: 4\n"), None);
        assert_eq!(parse_equal_count("summary\n  Equal: 4\n"), None);
    }

    #[test]
    fn test_parse_equal_count_missing() {
        assert_eq!(parse_equal_count(""), None);
        assert_eq!(parse_equal_count("Errors: 2\n"), None);
    }

    #[test]
    fn test_compare_step_arguments() {
        let diffkemp = DiffKemp::new(Path::new("/opt/diffkemp/bin/diffkemp"), None);
        let step = diffkemp.compare_step(Path::new("snapshot/c/old"), Path::new("snapshot/c/new"), Path::new("result/c"));
        assert_eq!(
            step.to_string(),
            "/opt/diffkemp/bin/diffkemp compare snapshot/c/old snapshot/c/new --report-stat -o result/c"
        );
    }

    #[test]
    fn test_compare_without_summary_is_contract_violation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("fake-diffkemp");
        std::fs::write(&script, "#!/bin/sh\necho 'no statistics here'\n").expect("write script");
        make_executable(&script);

        let mut diffkemp = DiffKemp::new(&script, None);
        let err = diffkemp
            .compare(Path::new("old"), Path::new("new"), &dir.path().join("result"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingSummary { .. }));
        assert!(!err.is_external());
    }

    #[test]
    fn test_compare_reads_equal_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("fake-diffkemp");
        std::fs::write(&script, format!("#!/bin/sh\ncat <<'EOF'\n{}EOF\n", REPORT)).expect("write script");
        make_executable(&script);

        let mut diffkemp = DiffKemp::new(&script, None);
        let equal = diffkemp
            .compare(Path::new("old"), Path::new("new"), &dir.path().join("result"))
            .expect("compare failed");
        assert_eq!(equal, 1);
    }

    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).expect("chmod");
    }
}
