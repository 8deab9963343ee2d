// src/locator.rs

use crate::error::{Error, Result};
use crate::model::*;
use git2::{Commit, DiffOptions, Repository};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Resolves a commit id into the change it introduces over its parent
pub trait ChangeSource {
    fn resolve(&self, commit: &str) -> Result<ResolvedChange>;
}

/// Reads changes straight from a git repository
pub struct GitChangeSource {
    repo: Repository,
}

impl GitChangeSource {
    pub fn open(repo_path: &Path) -> Result<Self> {
        Ok(GitChangeSource { repo: Repository::open(repo_path)? })
    }
}

impl ChangeSource for GitChangeSource {
    fn resolve(&self, commit: &str) -> Result<ResolvedChange> {
        let new = self.repo.revparse_single(commit)?.peel_to_commit()?;
        if new.parent_count() == 0 {
            return Err(Error::RootCommit(commit.to_string()));
        }
        let old = new.parent(0)?;
        let change_set = locate_functions(&self.repo, &old, &new)?;

        Ok(ResolvedChange {
            old: old.id().to_string(),
            new: new.id().to_string(),
            change_set,
        })
    }
}

/// Collects the functions touched between `old` and `new`.
///
/// Each hunk header carries git's guess at the enclosing definition. A file
/// with any hunk that yields no function name is unmatched, and one unmatched
/// file makes the whole change set not confident. Names found in other hunks
/// are still returned.
pub fn locate_functions(repo: &Repository, old: &Commit, new: &Commit) -> Result<ChangeSet> {
    let mut diff_opts = DiffOptions::new();
    diff_opts.include_untracked(false);
    diff_opts.ignore_filemode(true);

    let old_tree = old.tree()?;
    let new_tree = new.tree()?;
    let diff = repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

    // path -> whether every hunk in that file named a function
    let mut files: BTreeMap<String, bool> = BTreeMap::new();
    let mut change_set = ChangeSet::default();

    diff.foreach(
        &mut |_, _| true,
        None,
        Some(&mut |delta, hunk| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let header = String::from_utf8_lossy(hunk.header());

            let matched = files.entry(path.clone()).or_insert(true);
            match function_in_header(&header) {
                Some(name) => {
                    debug!(file = %path, function = %name, "hunk attributed");
                    change_set.functions.insert(name);
                }
                None => {
                    debug!(file = %path, header = %header.trim_end(), "hunk has no function");
                    *matched = false;
                }
            }
            true
        }),
        None,
    )?;

    let unmatched: Vec<&str> = files
        .iter()
        .filter(|&(_, &matched)| !matched)
        .map(|(path, _)| path.as_str())
        .collect();
    change_set.confident = unmatched.is_empty();
    if !change_set.confident {
        warn!(commit = %new.id(), files = ?unmatched, "some hunks could not be attributed to a function");
    }

    Ok(change_set)
}

/// Extracts the function name from a unified diff hunk header such as
/// `@@ -10,3 +10,4 @@ int foo(int x) {`.
///
/// The name is the first identifier directly followed by `(` in the trailing
/// context after the second `@@`.
pub fn function_in_header(header: &str) -> Option<FunctionName> {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    static CALL: OnceLock<Regex> = OnceLock::new();
    let header_re = HEADER.get_or_init(|| Regex::new(r"^@@[^@]*@@(.*)$").expect("valid hunk header regex"));
    let call_re = CALL.get_or_init(|| Regex::new(r"\b([A-Za-z_]\w*)\(").expect("valid function regex"));

    let context = header_re.captures(header.trim_end())?.get(1)?.as_str();
    call_re
        .captures(context)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
}
