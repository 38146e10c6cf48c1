//! The `stash` and `pop` commands.

use std::process::ExitCode;

use anyhow::{bail, Result};

use crate::cli::output::OutputCtx;
use crate::cli::{DiffScope, StashArgs, TrackFilter};
use crate::core::{resolve_selection, stash_hunks, Git, RepoRoot};

/// Stash only the selected hunks, leaving the index intact.
pub fn run_stash(root: &RepoRoot, args: &StashArgs, out: &OutputCtx) -> Result<ExitCode> {
    let sel = &args.selection;
    let git = Git::new(root);
    let scope =
        DiffScope::load_unstaged(&git, sel.unified, sel.file.as_deref(), TrackFilter::All)?;
    let store = scope.store();
    if store.is_empty() {
        bail!("no unstaged changes");
    }
    let matched = resolve_selection(&store, &sel.tokens()?, sel.file.as_deref(), sel.all)?;
    if matched.is_empty() {
        bail!("no unstaged changes");
    }

    let outcome = stash_hunks(&git, &matched, args.message.as_deref(), sel.unified)?;
    for m in &matched {
        println!("{}", out.verb_line("stashed", &m.label(), &m.hunk.file_path));
    }
    if !out.porcelain {
        println!("Saved: {}", outcome.message);
    }
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(ExitCode::SUCCESS)
}

/// Pop the most recent stash entry, surfacing git's own output.
pub fn run_pop(root: &RepoRoot) -> Result<ExitCode> {
    let git = Git::new(root);
    let output = git.stash_pop()?;
    print!("{}", output);
    Ok(ExitCode::SUCCESS)
}
