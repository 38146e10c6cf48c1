//! The `list` and `count` commands.

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::output::OutputCtx;
use crate::cli::{CountArgs, DiffScope, ListArgs, TrackFilter};
use crate::core::{Git, RepoRoot};

/// Enumerate hunks in scope, one metadata line per hunk.
pub fn run_list(root: &RepoRoot, args: &ListArgs, out: &OutputCtx) -> Result<ExitCode> {
    let git = Git::new(root);
    let filter = if args.tracked_only {
        TrackFilter::TrackedOnly
    } else if args.untracked_only {
        TrackFilter::UntrackedOnly
    } else {
        TrackFilter::All
    };
    let scope = if args.staged {
        DiffScope::load_staged(&git, args.unified, args.file.as_deref())?
    } else {
        DiffScope::load_unstaged(&git, args.unified, args.file.as_deref(), filter)?
    };
    let store = scope.store();

    for hunk in store.hunks() {
        println!("{}", out.hunk_line(hunk, store.mode()));
        if args.diff {
            // Raw @@ header and body, then a blank record separator.
            if !hunk.raw_lines.is_empty() {
                print!("{}", hunk.raw_lines);
                if !hunk.raw_lines.ends_with('\n') {
                    println!();
                }
            }
            println!();
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the number of hunks in scope. Always succeeds.
pub fn run_count(root: &RepoRoot, args: &CountArgs) -> Result<ExitCode> {
    let git = Git::new(root);
    let scope = if args.staged {
        DiffScope::load_staged(&git, args.unified, args.file.as_deref())?
    } else {
        DiffScope::load_unstaged(&git, args.unified, args.file.as_deref(), TrackFilter::All)?
    };
    println!("{}", scope.store().len());
    Ok(ExitCode::SUCCESS)
}
