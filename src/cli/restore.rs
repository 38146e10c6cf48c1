//! The `restore` command: discard selected unstaged hunks.

use std::process::ExitCode;

use anyhow::{bail, Result};

use crate::cli::output::OutputCtx;
use crate::cli::{DiffScope, RestoreArgs, TrackFilter};
use crate::core::{resolve_selection, reverse_from_worktree, Git, RepoRoot};

/// Reverse-apply selected unstaged hunks to the worktree.
///
/// Untracked files are out of scope here: discarding them would delete
/// files git itself never touches on a restore.
pub fn run_restore(root: &RepoRoot, args: &RestoreArgs, out: &OutputCtx) -> Result<ExitCode> {
    let sel = &args.selection;
    let git = Git::new(root);
    let scope = DiffScope::load_unstaged(
        &git,
        sel.unified,
        sel.file.as_deref(),
        TrackFilter::TrackedOnly,
    )?;
    let store = scope.store();
    if store.is_empty() {
        bail!("no unstaged changes");
    }
    let matched = resolve_selection(&store, &sel.tokens()?, sel.file.as_deref(), sel.all)?;
    if matched.is_empty() {
        bail!("no unstaged changes");
    }

    if args.dry_run {
        for m in &matched {
            println!(
                "{}",
                out.verb_line("would-restore", &m.label(), &m.hunk.file_path)
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    reverse_from_worktree(&git, &matched)?;
    for m in &matched {
        println!("{}", out.verb_line("restored", &m.label(), &m.hunk.file_path));
    }
    Ok(ExitCode::SUCCESS)
}
