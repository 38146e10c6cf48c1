//! git-hunk - stage, unstage, restore, and stash hunks by stable hash.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use git_hunk::cli::output::OutputCtx;
use git_hunk::cli::{
    run_check, run_count, run_list, run_pop, run_restore, run_stage, run_stash, run_unstage, Cli,
    Command,
};
use git_hunk::core::RepoRoot;

fn main() -> ExitCode {
    // Help and version are successes; every other parse problem is a
    // user-facing error and must exit 1, not clap's default 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let root = RepoRoot::discover(&cwd)?;
    let out = OutputCtx::new(cli.porcelain, cli.no_color);

    match &cli.command {
        Command::List(args) => run_list(&root, args, &out),
        Command::Count(args) => run_count(&root, args),
        Command::Stage(args) => run_stage(&root, args, &out),
        Command::Unstage(args) => run_unstage(&root, args, &out),
        Command::Restore(args) => run_restore(&root, args, &out),
        Command::Stash(args) => run_stash(&root, args, &out),
        Command::Pop => run_pop(&root),
        Command::Check(args) => run_check(&root, args, &out),
    }
}
