//! Driving git to apply a selection, with before/after target captures.
//!
//! The orchestrator owns the transition itself; explaining the transition
//! (which input hashes became which target hashes) is delegated to the
//! result-group builder, fed with target-side diffs captured around the
//! apply. Capture failures degrade to unresolved groups; apply failures
//! are fatal and leave the repository untouched.

use thiserror::Error;

use crate::core::{
    build_patch, build_result_groups, parse_diff, touched_paths, ApplyDest, DiffMode, DiffTarget,
    Git, GitError, MatchedHunk, PatchError, ResultGroup,
};

/// Errors from the apply orchestrator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApplyError {
    /// git refused the patch; nothing was changed.
    #[error("patch did not apply cleanly; re-run 'list' and try again")]
    PatchRefused,
    /// Patch synthesis failed before anything ran.
    #[error(transparent)]
    Patch(#[from] PatchError),
    /// A git invocation other than the apply itself failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Outcome of an index apply: one result group per user intent.
#[derive(Debug)]
pub struct ApplyReport {
    /// Result groups in target order, unmatched inputs last.
    pub groups: Vec<ResultGroup>,
}

/// Apply the selection to the index.
///
/// `reverse: false` stages worktree-relative hunks; `reverse: true`
/// unstages head-relative hunks. The target side (staged set when staging,
/// unstaged set when unstaging) is diffed before and after, restricted to
/// the touched paths, to build the hash mapping.
pub fn apply_to_index(
    git: &Git,
    matched: &[MatchedHunk<'_>],
    reverse: bool,
    unified: Option<u32>,
) -> Result<ApplyReport, ApplyError> {
    let patch = build_patch(matched)?;
    let paths = touched_paths(matched);

    let (target, mode) = if reverse {
        (DiffTarget::Worktree, DiffMode::WorktreeRelative)
    } else {
        (DiffTarget::Cached, DiffMode::HeadRelative)
    };

    let before = git.diff(target, unified, &paths).ok();
    match git.apply(&patch, ApplyDest::Index, reverse) {
        Ok(()) => {}
        Err(GitError::Failed { .. }) => return Err(ApplyError::PatchRefused),
        Err(e) => return Err(e.into()),
    }
    let after = git.diff(target, unified, &paths).ok();

    let groups = match (before, after) {
        (Some(old_text), Some(new_text)) => {
            let old_target = parse_diff(&old_text, mode);
            let new_target = parse_diff(&new_text, mode);
            build_result_groups(matched, &old_target, &new_target)
        }
        // Capture failed: every input is applied-but-unresolved.
        _ => matched
            .iter()
            .map(|m| ResultGroup {
                file_path: m.hunk.file_path.to_string(),
                applied: vec![(m.hunk.short_sha().to_string(), m.spec.clone())],
                absorbed: Vec::new(),
                results: Vec::new(),
            })
            .collect(),
    };

    Ok(ApplyReport { groups })
}

/// Reverse-apply the selection to the worktree, discarding those changes.
pub fn reverse_from_worktree(git: &Git, matched: &[MatchedHunk<'_>]) -> Result<(), ApplyError> {
    let patch = build_patch(matched)?;
    match git.apply(&patch, ApplyDest::Worktree, true) {
        Ok(()) => Ok(()),
        Err(GitError::Failed { .. }) => Err(ApplyError::PatchRefused),
        Err(e) => Err(e.into()),
    }
}
