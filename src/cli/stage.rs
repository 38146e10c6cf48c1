//! The `stage` and `unstage` commands.

use std::process::ExitCode;

use anyhow::{bail, Result};

use crate::cli::output::OutputCtx;
use crate::cli::{DiffScope, SelectionArgs, TrackFilter};
use crate::core::{apply_to_index, resolve_selection, Git, RepoRoot};

/// Apply selected unstaged hunks to the index.
pub fn run_stage(root: &RepoRoot, args: &SelectionArgs, out: &OutputCtx) -> Result<ExitCode> {
    let git = Git::new(root);
    let scope =
        DiffScope::load_unstaged(&git, args.unified, args.file.as_deref(), TrackFilter::All)?;
    let store = scope.store();
    if store.is_empty() {
        bail!("no unstaged changes");
    }
    let matched = resolve_selection(&store, &args.tokens()?, args.file.as_deref(), args.all)?;
    if matched.is_empty() {
        bail!("no unstaged changes");
    }

    let report = apply_to_index(&git, &matched, false, args.unified)?;
    for group in &report.groups {
        println!("{}", out.group_line("staged", group));
    }
    Ok(ExitCode::SUCCESS)
}

/// Reverse selected staged hunks out of the index.
pub fn run_unstage(root: &RepoRoot, args: &SelectionArgs, out: &OutputCtx) -> Result<ExitCode> {
    let git = Git::new(root);
    let scope = DiffScope::load_staged(&git, args.unified, args.file.as_deref())?;
    let store = scope.store();
    if store.is_empty() {
        bail!("no staged changes");
    }
    let matched = resolve_selection(&store, &args.tokens()?, args.file.as_deref(), args.all)?;
    if matched.is_empty() {
        bail!("no staged changes");
    }

    let report = apply_to_index(&git, &matched, true, args.unified)?;
    for group in &report.groups {
        println!("{}", out.group_line("unstaged", group));
    }
    Ok(ExitCode::SUCCESS)
}
