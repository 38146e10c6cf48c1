//! CLI command surface and implementations.

pub mod output;

mod check;
mod list;
mod restore;
mod stage;
mod stash;

pub use check::run_check;
pub use list::{run_count, run_list};
pub use restore::run_restore;
pub use stage::{run_stage, run_unstage};
pub use stash::{run_pop, run_stash};

use clap::{Args, Parser, Subcommand};

use crate::core::{
    parse_diff, parse_untracked_diff, DiffMode, DiffTarget, Git, GitError, HunkStore, SelectError,
    ShaArg,
};

/// Stage, unstage, restore, and stash individual git hunks by stable hash.
#[derive(Parser, Debug)]
#[command(name = "git-hunk", version, about)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Machine-readable tab-separated output
    #[arg(long, global = true)]
    pub porcelain: bool,

    /// Disable colour output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List hunks in the current diff, one stable hash per hunk
    List(ListArgs),
    /// Print the number of hunks in scope (always exits 0)
    Count(CountArgs),
    /// Apply selected unstaged hunks to the index
    Stage(SelectionArgs),
    /// Reverse selected staged hunks out of the index
    Unstage(SelectionArgs),
    /// Discard selected unstaged hunks from the worktree
    Restore(RestoreArgs),
    /// Stash only the selected hunks, preserving the index
    Stash(StashArgs),
    /// Pop the most recent stash entry
    Pop,
    /// Verify that recorded hashes still resolve
    Check(CheckArgs),
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// List staged hunks (index vs HEAD) instead of unstaged
    #[arg(long)]
    pub staged: bool,

    /// Restrict to hunks of exactly this path
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Context width passed to git diff
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<u32>,

    /// Print each hunk's diff body after its metadata line
    #[arg(long)]
    pub diff: bool,

    /// Skip untracked files
    #[arg(long, conflicts_with = "untracked_only")]
    pub tracked_only: bool,

    /// Show only untracked files
    #[arg(long)]
    pub untracked_only: bool,
}

/// Arguments for `count`.
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Count staged hunks instead of unstaged
    #[arg(long)]
    pub staged: bool,

    /// Restrict to hunks of exactly this path
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Context width passed to git diff
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<u32>,
}

/// Shared selection arguments for state-changing commands.
#[derive(Args, Debug)]
pub struct SelectionArgs {
    /// Hunk hashes, each optionally suffixed with `:ranges` to select
    /// specific changed lines (e.g. `1a2b3c4:1-3,5`)
    #[arg(value_name = "HASH[:LINES]")]
    pub hashes: Vec<String>,

    /// Select every hunk in scope
    #[arg(long)]
    pub all: bool,

    /// Restrict to hunks of exactly this path
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Context width passed to git diff
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<u32>,
}

impl SelectionArgs {
    /// Parse the hash tokens into selection arguments.
    pub fn tokens(&self) -> Result<Vec<ShaArg>, SelectError> {
        self.hashes.iter().map(|t| ShaArg::parse(t)).collect()
    }
}

/// Arguments for `restore`.
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Selection of hunks to discard.
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Report what would be discarded without touching the worktree
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `stash`.
#[derive(Args, Debug)]
pub struct StashArgs {
    /// Selection of hunks to stash.
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Stash message (defaults to the touched file list)
    #[arg(short = 'm', long = "message", value_name = "MSG")]
    pub message: Option<String>,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Hashes to verify
    #[arg(value_name = "HASH", required = true)]
    pub hashes: Vec<String>,

    /// Check against staged hunks instead of unstaged
    #[arg(long)]
    pub staged: bool,

    /// Restrict to hunks of exactly this path
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Context width passed to git diff
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<u32>,
}

/// Which kinds of files an unstaged scope includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrackFilter {
    /// Tracked changes plus untracked files.
    All,
    /// Tracked changes only.
    TrackedOnly,
    /// Untracked files only.
    UntrackedOnly,
}

/// Raw diff text for one command scope. The parsed hunks borrow from it.
#[derive(Debug)]
pub(crate) struct DiffScope {
    mode: DiffMode,
    diff_text: String,
    untracked_texts: Vec<String>,
}

impl DiffScope {
    /// Load the unstaged scope: index-vs-worktree plus synthetic diffs of
    /// untracked files.
    pub(crate) fn load_unstaged(
        git: &Git,
        unified: Option<u32>,
        file: Option<&str>,
        filter: TrackFilter,
    ) -> Result<Self, GitError> {
        let pathspec: Vec<String> = file.iter().map(|f| f.to_string()).collect();
        let diff_text = if filter == TrackFilter::UntrackedOnly {
            String::new()
        } else {
            git.diff(DiffTarget::Worktree, unified, &pathspec)?
        };
        let mut untracked_texts = Vec::new();
        if filter != TrackFilter::TrackedOnly {
            for path in git.untracked_files()? {
                if file.is_some() && file != Some(path.as_str()) {
                    continue;
                }
                untracked_texts.push(git.untracked_diff(&path)?);
            }
        }
        Ok(Self {
            mode: DiffMode::WorktreeRelative,
            diff_text,
            untracked_texts,
        })
    }

    /// Load the staged scope: index-vs-HEAD.
    pub(crate) fn load_staged(
        git: &Git,
        unified: Option<u32>,
        file: Option<&str>,
    ) -> Result<Self, GitError> {
        let pathspec: Vec<String> = file.iter().map(|f| f.to_string()).collect();
        Ok(Self {
            mode: DiffMode::HeadRelative,
            diff_text: git.diff(DiffTarget::Cached, unified, &pathspec)?,
            untracked_texts: Vec::new(),
        })
    }

    /// Parse the loaded texts into a store.
    pub(crate) fn store(&self) -> HunkStore<'_> {
        let mut store = HunkStore::new(self.mode);
        store.extend(parse_diff(&self.diff_text, self.mode));
        for text in &self.untracked_texts {
            store.extend(parse_untracked_diff(text));
        }
        store
    }
}
