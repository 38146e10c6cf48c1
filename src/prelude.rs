//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use git_hunk::prelude::*;
//! ```

pub use crate::core::{
    DiffMode, DiffTarget, Git, Hunk, HunkStore, LineSpec, MatchedHunk, RepoError, RepoRoot,
    ResultGroup, ShaArg,
};
