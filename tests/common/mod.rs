#![allow(dead_code)]

use anyhow::{Context, Result};
use git2::{Oid, Repository, Signature};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// A scratch repository with helpers for committing whole files
pub struct Scratch {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl Scratch {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let repo = Repository::init(dir.path())?;
        Ok(Scratch { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes the given files and commits them on top of HEAD.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        for (name, content) in files {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content).with_context(|| format!("write {}", name))?;
            index.add_path(Path::new(name))?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let sig = Signature::now("Test", "test@example.com")?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        Ok(self.repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
    }
}

pub const FOO_V1: &str = "\
int foo(int x) {
\tint a = 1;
\tint b = 2;
\tint c = 3;
\tint d = 4;
\treturn x + a;
}
";

pub const FOO_V2: &str = "\
int foo(int x) {
\tint a = 1;
\tint b = 2;
\tint c = 3;
\tint d = 4;
\treturn x + a + b;
}
";

/// Two functions far enough apart to land in separate hunks
pub fn two_functions(foo_ret: &str, bar_ret: &str) -> String {
    format!(
        "int foo(int x) {{\n\tint a = 1;\n\tint b = 2;\n\tint c = 3;\n\tint d = 4;\n\treturn {};\n}}\n\n\
         /* padding */\n/* padding */\n/* padding */\n/* padding */\n/* padding */\n/* padding */\n\n\
         int bar(int y) {{\n\tint a = 1;\n\tint b = 2;\n\tint c = 3;\n\tint d = 4;\n\treturn {};\n}}\n",
        foo_ret, bar_ret
    )
}

/// Writes an executable shell script
pub fn script(dir: &Path, name: &str, body: &str) -> Result<std::path::PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body))?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(path)
}

/// A stand-in for diffkemp: `build-kernel` copies the function list and the
/// checked-out `foo.c` into the snapshot; `compare` creates its `-o`
/// directory with a report in it and prints `Equal: <equal>` unless `equal`
/// is empty.
pub fn fake_diffkemp(dir: &Path, equal: &str) -> Result<std::path::PathBuf> {
    let summary = if equal.is_empty() {
        "echo 'Statistics'".to_string()
    } else {
        format!("echo 'Statistics'; echo 'Equal:        {}'", equal)
    };
    script(
        dir,
        "diffkemp",
        &format!(
            "case \"$1\" in\n\
             build-kernel) mkdir -p \"$3\" && cp \"$4\" \"$3/functions\" && cp \"$2/foo.c\" \"$3/foo.c\" ;;\n\
             compare) mkdir -p \"$6\" && echo report > \"$6/report.txt\" && {{ {}; }} ;;\n\
             *) exit 2 ;;\n\
             esac\n",
            summary
        ),
    )
}
