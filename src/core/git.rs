//! Subprocess wrapper around the system `git` binary.
//!
//! Every repository operation the tool needs goes through here: diffs,
//! patch application, plumbing for the stash pipeline. Diff output is
//! requested with colour disabled and `a/`/`b/` prefixes forced so the
//! parser sees a stable shape regardless of user configuration.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::core::RepoRoot;

/// Errors from running git.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitError {
    /// Spawning or talking to the child process failed.
    #[error("io error running git: {0}")]
    Io(#[from] std::io::Error),
    /// git exited non-zero.
    #[error("git {cmd} failed: {stderr}")]
    Failed {
        /// The subcommand and arguments that failed.
        cmd: String,
        /// Trimmed stderr from the child.
        stderr: String,
    },
    /// git produced output that is not UTF-8.
    #[error("invalid utf-8 in git output")]
    InvalidUtf8,
}

/// Which pair of trees/files a diff compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget {
    /// Index vs worktree (`git diff`): the unstaged changes.
    Worktree,
    /// HEAD vs index (`git diff --cached`): the staged changes.
    Cached,
    /// HEAD vs worktree (`git diff HEAD`): bypasses the index.
    Head,
}

/// Where a patch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyDest {
    /// Apply to the index (`git apply --cached`).
    Index,
    /// Apply to the worktree.
    Worktree,
}

/// A handle on one repository; all commands run at its root.
#[derive(Debug)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    /// Build a runner for the discovered repository.
    pub fn new(root: &RepoRoot) -> Self {
        Self {
            root: root.path().to_path_buf(),
        }
    }

    /// The repository root all commands run from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        self.run_inner(args, None, None)
    }

    fn run_inner(
        &self,
        args: &[&str],
        stdin: Option<&[u8]>,
        index_file: Option<&Path>,
    ) -> Result<String, GitError> {
        let output = self.spawn(args, stdin, index_file)?;
        if !output.status.success() {
            return Err(failed(args, &output.stderr));
        }
        String::from_utf8(output.stdout).map_err(|_| GitError::InvalidUtf8)
    }

    fn spawn(
        &self,
        args: &[&str],
        stdin: Option<&[u8]>,
        index_file: Option<&Path>,
    ) -> Result<std::process::Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(index) = index_file {
            cmd.env("GIT_INDEX_FILE", index);
        }
        match stdin {
            Some(_) => cmd.stdin(Stdio::piped()),
            None => cmd.stdin(Stdio::null()),
        };
        let mut child = cmd.spawn()?;
        if let Some(input) = stdin {
            use std::io::Write;
            let mut pipe = child.stdin.take().expect("stdin piped");
            pipe.write_all(input)?;
        }
        Ok(child.wait_with_output()?)
    }

    /// Produce a unified diff with the parser's expected shape.
    ///
    /// `unified` overrides the context width; `None` falls through to git's
    /// configured default. `paths` scopes the diff via a trailing `--`.
    pub fn diff(
        &self,
        target: DiffTarget,
        unified: Option<u32>,
        paths: &[String],
    ) -> Result<String, GitError> {
        let mut args = vec![
            "diff".to_string(),
            "--no-color".to_string(),
            "--no-ext-diff".to_string(),
            "--src-prefix=a/".to_string(),
            "--dst-prefix=b/".to_string(),
        ];
        match target {
            DiffTarget::Worktree => {}
            DiffTarget::Cached => args.push("--cached".to_string()),
            DiffTarget::Head => args.push("HEAD".to_string()),
        }
        if let Some(n) = unified {
            args.push(format!("-U{}", n));
        }
        if !paths.is_empty() {
            args.push("--".to_string());
            args.extend(paths.iter().cloned());
        }
        let borrowed: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&borrowed)
    }

    /// Synthetic unified diff of one untracked file against `/dev/null`.
    ///
    /// `git diff --no-index` exits 1 when the sides differ, which is the
    /// expected case here; only exit codes above 1 are failures.
    pub fn untracked_diff(&self, path: &str) -> Result<String, GitError> {
        let args = [
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            "--no-index",
            "--",
            "/dev/null",
            path,
        ];
        let output = self.spawn(&args, None, None)?;
        if !output.status.success() && output.status.code() != Some(1) {
            return Err(failed(&args, &output.stderr));
        }
        String::from_utf8(output.stdout).map_err(|_| GitError::InvalidUtf8)
    }

    /// Apply a patch from memory to the index or the worktree.
    ///
    /// Always passes `--unidiff-zero` so synthesized sub-hunk patches with
    /// arbitrary context widths apply. Non-zero exit means the patch was
    /// refused with no partial effect.
    pub fn apply(&self, patch: &[u8], dest: ApplyDest, reverse: bool) -> Result<(), GitError> {
        let mut args = vec!["apply", "--unidiff-zero"];
        if let ApplyDest::Index = dest {
            args.push("--cached");
        }
        if reverse {
            args.push("--reverse");
        }
        args.push("-");
        self.run_inner(&args, Some(patch), None).map(|_| ())
    }

    /// Apply a patch to a scratch index named by `GIT_INDEX_FILE`.
    pub fn apply_to_index_file(&self, index: &Path, patch: &[u8]) -> Result<(), GitError> {
        let args = ["apply", "--cached", "--unidiff-zero", "-"];
        self.run_inner(&args, Some(patch), Some(index)).map(|_| ())
    }

    /// Untracked files, excluding ignored ones. NUL-separated so no path
    /// unquoting is needed.
    pub fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        let out = self.run(&["ls-files", "--others", "--exclude-standard", "-z"])?;
        Ok(out
            .split('\0')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Resolve a revision spec to a trimmed object id.
    pub fn rev_parse(&self, spec: &str) -> Result<String, GitError> {
        Ok(self.run(&["rev-parse", "--verify", spec])?.trim().to_string())
    }

    /// Object id of `HEAD^{tree}`.
    pub fn head_tree(&self) -> Result<String, GitError> {
        self.rev_parse("HEAD^{tree}")
    }

    /// Current branch name, or None when HEAD is detached.
    pub fn current_branch(&self) -> Option<String> {
        match self.run(&["symbolic-ref", "--short", "-q", "HEAD"]) {
            Ok(out) => {
                let name = out.trim().to_string();
                if name.is_empty() {
                    None
                } else {
                    Some(name)
                }
            }
            Err(_) => None,
        }
    }

    /// Head commit's one-line summary (`<short-id> <subject>`), empty when
    /// there is no commit yet.
    pub fn head_summary(&self) -> String {
        self.run(&["log", "-1", "--format=%h %s"])
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Load a tree into a scratch index.
    pub fn read_tree(&self, index: &Path, treeish: &str) -> Result<(), GitError> {
        self.run_inner(&["read-tree", treeish], None, Some(index))
            .map(|_| ())
    }

    /// Write a tree from the process index, or from a scratch index when
    /// `index` is given.
    pub fn write_tree(&self, index: Option<&Path>) -> Result<String, GitError> {
        Ok(self
            .run_inner(&["write-tree"], None, index)?
            .trim()
            .to_string())
    }

    /// Create a commit object for a tree with the given parents.
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[&str],
        message: &str,
    ) -> Result<String, GitError> {
        let mut args = vec!["commit-tree", tree];
        for parent in parents {
            args.push("-p");
            args.push(parent);
        }
        args.push("-m");
        args.push(message);
        Ok(self.run(&args)?.trim().to_string())
    }

    /// Hash a worktree file into the object store, returning the blob id.
    pub fn hash_object_write(&self, path: &str) -> Result<String, GitError> {
        Ok(self
            .run(&["hash-object", "-w", "--", path])?
            .trim()
            .to_string())
    }

    /// Associate a blob + mode + path in a scratch index.
    pub fn update_index_blob(
        &self,
        index: &Path,
        mode: &str,
        blob: &str,
        path: &str,
    ) -> Result<(), GitError> {
        let cacheinfo = format!("{},{},{}", mode, blob, path);
        self.run_inner(
            &["update-index", "--add", "--cacheinfo", &cacheinfo],
            None,
            Some(index),
        )
        .map(|_| ())
    }

    /// Record a pre-built commit as a stash entry.
    pub fn stash_store(&self, message: &str, commit: &str) -> Result<(), GitError> {
        self.run(&["stash", "store", "--message", message, commit])
            .map(|_| ())
    }

    /// Pop the most recent stash entry, returning git's output for display.
    pub fn stash_pop(&self) -> Result<String, GitError> {
        self.run(&["stash", "pop"])
    }
}

fn failed(args: &[&str], stderr: &[u8]) -> GitError {
    GitError::Failed {
        cmd: args.join(" "),
        stderr: String::from_utf8_lossy(stderr).trim().to_string(),
    }
}
