//! Ordered in-memory hunk collection with hash-prefix lookup.

use thiserror::Error;

use crate::core::{DiffMode, Hunk};

/// Errors from hash-prefix lookup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// Prefix shorter than the four-hex-digit minimum.
    #[error("hash prefix too short (need at least 4 hex digits): {0}")]
    TooShort(String),
    /// Prefix contains non-hexadecimal characters.
    #[error("hash prefix is not hexadecimal: {0}")]
    NonHex(String),
    /// No hunk in scope matches the prefix.
    #[error("no hunk matches {0}")]
    NotFound(String),
    /// Two or more hunks match the prefix.
    #[error("hash prefix {0} is ambiguous, give more digits")]
    Ambiguous(String),
}

/// A flat, ordered collection of parsed hunks.
///
/// Hunks keep their diff order: file order first, ascending `old_start`
/// within a file. Lookup is a linear scan; selections are user-scale.
#[derive(Debug)]
pub struct HunkStore<'a> {
    hunks: Vec<Hunk<'a>>,
    mode: DiffMode,
}

impl<'a> HunkStore<'a> {
    /// Create an empty store for the given diff mode.
    pub fn new(mode: DiffMode) -> Self {
        Self { hunks: Vec::new(), mode }
    }

    /// Append parsed hunks, preserving their order.
    pub fn extend(&mut self, hunks: Vec<Hunk<'a>>) {
        self.hunks.extend(hunks);
    }

    /// The diff mode the stored hunks were parsed under.
    pub fn mode(&self) -> DiffMode {
        self.mode
    }

    /// All hunks in order.
    pub fn hunks(&self) -> &[Hunk<'a>] {
        &self.hunks
    }

    /// Whether the store holds no hunks.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Number of hunks in the store.
    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    /// Resolve a hash prefix to a single hunk.
    ///
    /// Requires at least 4 hex digits. `file` restricts matching to hunks
    /// whose path is exactly `file`.
    pub fn find_by_prefix(
        &self,
        prefix: &str,
        file: Option<&str>,
    ) -> Result<&Hunk<'a>, LookupError> {
        let normalized = prefix.to_ascii_lowercase();
        if normalized.len() < 4 {
            return Err(LookupError::TooShort(prefix.to_string()));
        }
        if normalized.len() > 40 || !normalized.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LookupError::NonHex(prefix.to_string()));
        }

        let mut found: Option<&Hunk<'a>> = None;
        for hunk in &self.hunks {
            if let Some(want) = file {
                if hunk.file_path != want {
                    continue;
                }
            }
            if hunk.sha_hex.starts_with(&normalized) {
                if found.is_some() {
                    return Err(LookupError::Ambiguous(prefix.to_string()));
                }
                found = Some(hunk);
            }
        }
        found.ok_or_else(|| LookupError::NotFound(prefix.to_string()))
    }
}
