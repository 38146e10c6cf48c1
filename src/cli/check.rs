//! The `check` command: verify that recorded hashes still resolve.

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::output::OutputCtx;
use crate::cli::{CheckArgs, DiffScope, TrackFilter};
use crate::core::{Git, LookupError, RepoRoot};

/// Resolve each token against the scoped store and report a status.
///
/// `ok`: exactly one hunk matches. `stale`: nothing matches. `ambiguous`:
/// several match. `unexpected`: a token of seven or more digits whose
/// seven-digit display prefix now resolves to different content (the
/// short id was reused). Exit 1 if anything is not `ok`.
pub fn run_check(root: &RepoRoot, args: &CheckArgs, out: &OutputCtx) -> Result<ExitCode> {
    let git = Git::new(root);
    let scope = if args.staged {
        DiffScope::load_staged(&git, args.unified, args.file.as_deref())?
    } else {
        DiffScope::load_unstaged(&git, args.unified, args.file.as_deref(), TrackFilter::All)?
    };
    let store = scope.store();
    let file = args.file.as_deref();

    let mut all_ok = true;
    for token in &args.hashes {
        match store.find_by_prefix(token, file) {
            Ok(hunk) => {
                println!("{}", out.check_line("ok", token, Some(hunk)));
            }
            Err(LookupError::Ambiguous(_)) => {
                all_ok = false;
                println!("{}", out.check_line("ambiguous", token, None));
            }
            Err(LookupError::NotFound(_)) => {
                all_ok = false;
                let reused = if token.len() >= 7 {
                    store.find_by_prefix(&token[..7], file).ok()
                } else {
                    None
                };
                match reused {
                    Some(hunk) => {
                        println!("{}", out.check_line("unexpected", token, Some(hunk)))
                    }
                    None => println!("{}", out.check_line("stale", token, None)),
                }
            }
            Err(e @ (LookupError::TooShort(_) | LookupError::NonHex(_))) => return Err(e.into()),
        }
    }

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
