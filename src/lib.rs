//! git-hunk - stage, unstage, restore, and stash individual git hunks.
//!
//! A non-interactive companion to git for scripts, agents, and CI: list
//! the hunks in the current diff, each labelled with a stable short hash,
//! then act on those hashes.

#![deny(missing_docs)]

pub mod cli;
pub mod core;
pub mod prelude;
