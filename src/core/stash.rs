//! The two-diff stash pipeline.
//!
//! A stash entry is a commit with parents `(HEAD, index-snapshot[,
//! untracked-snapshot])` whose tree holds only the selected hunks. The
//! selection arrives index-relative; because the index may already differ
//! from HEAD, the pipeline re-queries a HEAD-relative diff, matches the
//! selection onto it, and builds the stash tree from that, leaving staged
//! changes untouched in both the index and the worktree.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{
    build_patch, touched_paths, ApplyDest, DiffMode, DiffTarget, Git, GitError, Hunk, LineSpec,
    MatchedHunk, PatchError,
};

/// Errors from the stash pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StashError {
    /// The selection could not be mapped onto the HEAD-relative diff.
    #[error("could not match selected hunks to HEAD-relative diff")]
    MatcherFailure,
    /// Patch synthesis failed.
    #[error(transparent)]
    Patch(#[from] PatchError),
    /// A git invocation failed.
    #[error(transparent)]
    Git(#[from] GitError),
    /// Scratch-index bookkeeping failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the pipeline produced.
#[derive(Debug)]
pub struct StashOutcome {
    /// The stash message recorded with the entry.
    pub message: String,
    /// Non-fatal cleanup problems; the stash entry itself is intact.
    pub warnings: Vec<String>,
}

/// A scratch index file handed to git via `GIT_INDEX_FILE`.
///
/// The file (and any leftover `.lock` sibling) is removed on every exit
/// path, including unwinding.
struct ScratchIndex {
    path: PathBuf,
}

impl ScratchIndex {
    fn create() -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("git-hunk-index-")
            .tempfile()?;
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        // git expects to create the index itself; hand it just the name.
        std::fs::remove_file(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchIndex {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let mut lock = self.path.clone().into_os_string();
        lock.push(".lock");
        let _ = std::fs::remove_file(PathBuf::from(lock));
    }
}

/// Run the stash pipeline over an index-relative selection.
///
/// On success the stash entry exists and the selected changes are gone
/// from the worktree; cleanup failures are reported as warnings rather
/// than rolled back, and the user can recover with a pop.
pub fn stash_hunks(
    git: &Git,
    matched: &[MatchedHunk<'_>],
    message: Option<&str>,
    unified: Option<u32>,
) -> Result<StashOutcome, StashError> {
    let (untracked, tracked): (Vec<&MatchedHunk<'_>>, Vec<&MatchedHunk<'_>>) =
        matched.iter().partition(|m| m.hunk.is_untracked);
    let tracked: Vec<MatchedHunk<'_>> = tracked.into_iter().cloned().collect();

    let head = git.rev_parse("HEAD")?;
    let branch = git
        .current_branch()
        .unwrap_or_else(|| "(no branch)".to_string());
    let summary = git.head_summary();

    // The index-relative patch is what gets reverse-applied to the worktree
    // at the very end.
    let tracked_patch = if tracked.is_empty() {
        None
    } else {
        Some(build_patch(&tracked)?)
    };

    let stash_tree = if tracked.is_empty() {
        git.head_tree()?
    } else {
        let paths = touched_paths(&tracked);
        let head_text = git.diff(DiffTarget::Head, unified, &paths)?;
        let head_hunks = crate::core::parse_diff(&head_text, DiffMode::HeadRelative);
        let head_matched = match_index_to_head(&tracked, &head_hunks)?;
        let head_patch = build_patch(&head_matched)?;

        let scratch = ScratchIndex::create()?;
        git.read_tree(scratch.path(), "HEAD")?;
        git.apply_to_index_file(scratch.path(), &head_patch)?;
        git.write_tree(Some(scratch.path()))?
    };

    let index_tree = git.write_tree(None)?;
    let index_commit = git.commit_tree(
        &index_tree,
        &[&head],
        &format!("index on {}: {}", branch, summary),
    )?;

    let untracked_commit = if untracked.is_empty() {
        None
    } else {
        let scratch = ScratchIndex::create()?;
        for m in &untracked {
            let path = m.hunk.file_path.as_ref();
            let blob = git.hash_object_write(path)?;
            let mode = file_mode(&git.root().join(path));
            git.update_index_blob(scratch.path(), mode, &blob, path)?;
        }
        let tree = git.write_tree(Some(scratch.path()))?;
        Some(git.commit_tree(
            &tree,
            &[&head],
            &format!("untracked files on {}: {}", branch, summary),
        )?)
    };

    let message = message.map(str::to_string).unwrap_or_else(|| {
        format!("git-hunk stash: {}", touched_paths(matched).join(", "))
    });

    let mut parents = vec![head.as_str(), index_commit.as_str()];
    if let Some(commit) = &untracked_commit {
        parents.push(commit);
    }
    let stash_commit = git.commit_tree(&stash_tree, &parents, &message)?;
    git.stash_store(&message, &stash_commit)?;

    // Worktree cleanup. The stash entry is never rolled back from here on.
    let mut warnings = Vec::new();
    if let Some(patch) = &tracked_patch {
        if let Err(e) = git.apply(patch, ApplyDest::Worktree, true) {
            warnings.push(format!(
                "failed to remove stashed changes from the worktree ({}); run 'git-hunk pop' to recover",
                e
            ));
        }
    }
    for m in &untracked {
        let full = git.root().join(m.hunk.file_path.as_ref());
        if let Err(e) = std::fs::remove_file(&full) {
            warnings.push(format!(
                "failed to remove stashed untracked file {}: {}",
                m.hunk.file_path, e
            ));
        }
    }

    Ok(StashOutcome { message, warnings })
}

#[cfg(unix)]
fn file_mode(path: &Path) -> &'static str {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) if meta.permissions().mode() & 0o111 != 0 => "100755",
        _ => "100644",
    }
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> &'static str {
    "100644"
}

/// Map an index-relative selection onto HEAD-relative hunks.
///
/// Fast path: every selected hash appears unchanged in the HEAD set (the
/// index is clean for those files), so the matching HEAD hunks are emitted
/// directly with no line spec. Slow path: for each HEAD hunk, collect the
/// worktree ranges of the *changed lines only* of overlapping selected
/// hunks; full containment selects the whole HEAD hunk, partial overlap
/// synthesizes a line spec over the HEAD hunk's intersecting body
/// positions. Restricting to changed lines keeps nearby staged-only edits
/// out of the stash.
pub fn match_index_to_head<'a>(
    selected: &[MatchedHunk<'_>],
    head_hunks: &'a [Hunk<'a>],
) -> Result<Vec<MatchedHunk<'a>>, StashError> {
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let all_present = selected.iter().all(|m| {
        head_hunks
            .iter()
            .any(|h| h.sha_hex == m.hunk.sha_hex)
    });
    if all_present {
        let mut out = Vec::new();
        for m in selected {
            let hunk = head_hunks
                .iter()
                .find(|h| h.sha_hex == m.hunk.sha_hex)
                .ok_or(StashError::MatcherFailure)?;
            out.push(MatchedHunk { hunk, spec: None });
        }
        return Ok(out);
    }

    let mut out = Vec::new();
    for head in head_hunks {
        let Some(head_range) = changed_worktree_range(head, None) else {
            continue;
        };
        let mut covering: Vec<(u32, u32)> = Vec::new();
        for m in selected {
            if m.hunk.file_path != head.file_path {
                continue;
            }
            if let Some(range) = changed_worktree_range(m.hunk, m.spec.as_ref()) {
                if range.0 <= head_range.1 && head_range.0 <= range.1 {
                    covering.push(range);
                }
            }
        }
        if covering.is_empty() {
            continue;
        }
        if covering
            .iter()
            .any(|r| r.0 <= head_range.0 && head_range.1 <= r.1)
        {
            out.push(MatchedHunk {
                hunk: head,
                spec: None,
            });
        } else if let Some(spec) = synthesize_spec(head, &covering) {
            out.push(MatchedHunk {
                hunk: head,
                spec: Some(spec),
            });
        }
    }

    if out.is_empty() {
        return Err(StashError::MatcherFailure);
    }
    Ok(out)
}

/// `[min, max]` worktree line touched by the hunk's `+`/`-` lines, walking
/// the body with a worktree cursor. `spec` restricts which changed lines
/// count. The worktree is the new side of both index-relative and
/// HEAD-relative diffs.
fn changed_worktree_range(hunk: &Hunk<'_>, spec: Option<&LineSpec>) -> Option<(u32, u32)> {
    let mut cursor = hunk.new_start;
    let mut change_index = 0u32;
    let mut lo: Option<u32> = None;
    let mut hi: Option<u32> = None;
    let touch = |line: u32, lo: &mut Option<u32>, hi: &mut Option<u32>| {
        *lo = Some(lo.map_or(line, |v| v.min(line)));
        *hi = Some(hi.map_or(line, |v| v.max(line)));
    };
    for line in hunk.body_lines() {
        match line.as_bytes().first() {
            Some(b'+') => {
                change_index += 1;
                if spec.map_or(true, |s| s.contains(change_index)) {
                    touch(cursor, &mut lo, &mut hi);
                }
                cursor += 1;
            }
            Some(b'-') => {
                change_index += 1;
                if spec.map_or(true, |s| s.contains(change_index)) {
                    touch(cursor, &mut lo, &mut hi);
                }
            }
            Some(b'\\') => {}
            _ => cursor += 1,
        }
    }
    lo.zip(hi)
}

/// Line spec over the HEAD hunk's changed body positions whose worktree
/// lines fall inside any covering range.
fn synthesize_spec(head: &Hunk<'_>, covering: &[(u32, u32)]) -> Option<LineSpec> {
    let inside = |line: u32| covering.iter().any(|&(lo, hi)| lo <= line && line <= hi);
    let mut cursor = head.new_start;
    let mut change_index = 0u32;
    let mut selected = Vec::new();
    for line in head.body_lines() {
        match line.as_bytes().first() {
            Some(b'+') => {
                change_index += 1;
                if inside(cursor) {
                    selected.push(change_index);
                }
                cursor += 1;
            }
            Some(b'-') => {
                change_index += 1;
                if inside(cursor) {
                    selected.push(change_index);
                }
            }
            Some(b'\\') => {}
            _ => cursor += 1,
        }
    }
    LineSpec::from_lines(&selected)
}
