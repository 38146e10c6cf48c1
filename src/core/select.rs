//! Selection tokens, sub-hunk line specs, and the resolver that turns both
//! into an ordered, deduplicated set of matched hunks.

use std::fmt;

use thiserror::Error;

use crate::core::{Hunk, HunkStore, LookupError};

/// Errors from token parsing and selection resolution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SelectError {
    /// Hash-prefix lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A `:ranges` suffix did not parse as 1-based line ranges.
    #[error("invalid line range in {0}")]
    BadLineSpec(String),
    /// Nothing was selected and no bulk flag was given.
    #[error("no hunks selected; pass hunk hashes or --all")]
    Empty,
}

/// A sub-hunk filter: 1-based closed ranges over a hunk's `+`/`-` body
/// lines.
///
/// Ranges are kept in the order the user supplied them. Two selections of
/// the same hunk concatenate their ranges verbatim, so ranges may be
/// unsorted or overlapping; [`LineSpec::contains`] tolerates both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    /// Closed `[start, end]` ranges over changed body lines.
    pub ranges: Vec<(u32, u32)>,
}

impl LineSpec {
    /// Parse `"1-3,5"` style range lists.
    pub fn parse(s: &str) -> Result<Self, SelectError> {
        let bad = || SelectError::BadLineSpec(s.to_string());
        let mut ranges = Vec::new();
        for part in s.split(',') {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (
                    a.parse::<u32>().map_err(|_| bad())?,
                    b.parse::<u32>().map_err(|_| bad())?,
                ),
                None => {
                    let n = part.parse::<u32>().map_err(|_| bad())?;
                    (n, n)
                }
            };
            if start == 0 || end < start {
                return Err(bad());
            }
            ranges.push((start, end));
        }
        if ranges.is_empty() {
            return Err(bad());
        }
        Ok(Self { ranges })
    }

    /// Whether the 1-based changed-line index is selected.
    pub fn contains(&self, line: u32) -> bool {
        self.ranges.iter().any(|&(s, e)| s <= line && line <= e)
    }

    /// Append another spec's ranges, preserving raw order.
    pub fn concat(&mut self, other: &LineSpec) {
        self.ranges.extend_from_slice(&other.ranges);
    }

    /// Build a spec from an ascending list of selected line indices,
    /// collapsing consecutive runs into ranges.
    pub fn from_lines(lines: &[u32]) -> Option<Self> {
        let mut ranges: Vec<(u32, u32)> = Vec::new();
        for &line in lines {
            match ranges.last_mut() {
                Some(last) if last.1 + 1 == line => last.1 = line,
                _ => ranges.push((line, line)),
            }
        }
        if ranges.is_empty() {
            None
        } else {
            Some(Self { ranges })
        }
    }
}

impl fmt::Display for LineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(s, e)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if s == e {
                write!(f, "{}", s)?;
            } else {
                write!(f, "{}-{}", s, e)?;
            }
        }
        Ok(())
    }
}

/// One user-supplied selection token: a hash prefix with an optional
/// sub-hunk line spec.
#[derive(Debug, Clone)]
pub struct ShaArg {
    /// Hex prefix of the target hunk's hash.
    pub prefix: String,
    /// Optional sub-hunk filter.
    pub spec: Option<LineSpec>,
}

impl ShaArg {
    /// Parse `<prefix>[:<ranges>]`.
    pub fn parse(token: &str) -> Result<Self, SelectError> {
        match token.split_once(':') {
            Some((prefix, ranges)) => Ok(Self {
                prefix: prefix.to_string(),
                spec: Some(LineSpec::parse(ranges)?),
            }),
            None => Ok(Self {
                prefix: token.to_string(),
                spec: None,
            }),
        }
    }
}

/// A selected hunk plus its optional sub-hunk filter.
#[derive(Debug, Clone)]
pub struct MatchedHunk<'a> {
    /// The resolved hunk.
    pub hunk: &'a Hunk<'a>,
    /// Sub-hunk filter, if the selection named specific lines.
    pub spec: Option<LineSpec>,
}

impl MatchedHunk<'_> {
    /// Display form: short sha, plus `:ranges` for sub-hunk selections.
    pub fn label(&self) -> String {
        match &self.spec {
            Some(spec) => format!("{}:{}", self.hunk.short_sha(), spec),
            None => self.hunk.short_sha().to_string(),
        }
    }
}

/// Resolve a selection against the store.
///
/// With no tokens, `all` (or a bare `file` filter) bulk-matches every hunk
/// in scope. Tokens resolving to the same hunk merge: a whole-hunk
/// selection wins over sub-hunk ones, and two sub-hunk selections
/// concatenate their ranges. The result is sorted by `(file_path,
/// old_start)`, the order the patch applier requires.
pub fn resolve_selection<'a>(
    store: &'a HunkStore<'a>,
    tokens: &[ShaArg],
    file: Option<&str>,
    all: bool,
) -> Result<Vec<MatchedHunk<'a>>, SelectError> {
    let mut matched: Vec<MatchedHunk<'a>> = Vec::new();

    if tokens.is_empty() {
        if !all && file.is_none() {
            return Err(SelectError::Empty);
        }
        for hunk in store.hunks() {
            if let Some(want) = file {
                if hunk.file_path != want {
                    continue;
                }
            }
            matched.push(MatchedHunk { hunk, spec: None });
        }
        sort_for_patch(&mut matched);
        return Ok(matched);
    }

    for token in tokens {
        let hunk = store.find_by_prefix(&token.prefix, file)?;
        if let Some(existing) = matched
            .iter_mut()
            .find(|m| m.hunk.sha_hex == hunk.sha_hex)
        {
            match &token.spec {
                // Whole-hunk selection subsumes any line spec.
                None => existing.spec = None,
                Some(theirs) => {
                    if let Some(mine) = &mut existing.spec {
                        mine.concat(theirs);
                    }
                }
            }
            continue;
        }
        matched.push(MatchedHunk {
            hunk,
            spec: token.spec.clone(),
        });
    }

    sort_for_patch(&mut matched);
    Ok(matched)
}

fn sort_for_patch(matched: &mut [MatchedHunk<'_>]) {
    matched.sort_by(|a, b| {
        a.hunk
            .file_path
            .cmp(&b.hunk.file_path)
            .then(a.hunk.old_start.cmp(&b.hunk.old_start))
    });
}

/// Unique file paths touched by a selection, in selection order.
pub fn touched_paths(matched: &[MatchedHunk<'_>]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for m in matched {
        if !paths.iter().any(|p| p == m.hunk.file_path.as_ref()) {
            paths.push(m.hunk.file_path.to_string());
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_diff, DiffMode};

    const TWO_FILE_DIFF: &str = "diff --git a/b.txt b/b.txt\n\
--- a/b.txt\n\
+++ b/b.txt\n\
@@ -4,1 +4,1 @@\n\
-p\n\
+q\n\
diff --git a/a.txt b/a.txt\n\
--- a/a.txt\n\
+++ b/a.txt\n\
@@ -1,1 +1,1 @@\n\
-x\n\
+y\n";

    fn build_store(text: &str) -> HunkStore<'_> {
        let mut s = HunkStore::new(DiffMode::WorktreeRelative);
        s.extend(parse_diff(text, DiffMode::WorktreeRelative));
        s
    }

    #[test]
    fn linespec_parse_and_contains() {
        let spec = LineSpec::parse("1-3,5").unwrap();
        assert!(spec.contains(1));
        assert!(spec.contains(3));
        assert!(!spec.contains(4));
        assert!(spec.contains(5));
        assert_eq!(spec.to_string(), "1-3,5");
    }

    #[test]
    fn linespec_rejects_garbage() {
        assert!(LineSpec::parse("").is_err());
        assert!(LineSpec::parse("0").is_err());
        assert!(LineSpec::parse("3-1").is_err());
        assert!(LineSpec::parse("a-b").is_err());
    }

    #[test]
    fn linespec_from_lines_collapses_runs() {
        let spec = LineSpec::from_lines(&[1, 2, 3, 7]).unwrap();
        assert_eq!(spec.ranges, vec![(1, 3), (7, 7)]);
        assert!(LineSpec::from_lines(&[]).is_none());
    }

    #[test]
    fn sha_arg_splits_on_colon() {
        let arg = ShaArg::parse("abcd123:2-4").unwrap();
        assert_eq!(arg.prefix, "abcd123");
        assert_eq!(arg.spec.unwrap().ranges, vec![(2, 4)]);
        assert!(ShaArg::parse("abcd123").unwrap().spec.is_none());
        assert!(ShaArg::parse("abcd123:").is_err());
    }

    #[test]
    fn resolution_sorts_by_file_then_old_start() {
        let store = build_store(TWO_FILE_DIFF);
        let tokens: Vec<ShaArg> = store
            .hunks()
            .iter()
            .map(|h| ShaArg::parse(h.short_sha()).unwrap())
            .collect();
        // Tokens arrive in diff order (b.txt first); output is path-sorted.
        let matched = resolve_selection(&store, &tokens, None, false).unwrap();
        assert_eq!(matched[0].hunk.file_path, "a.txt");
        assert_eq!(matched[1].hunk.file_path, "b.txt");
    }

    #[test]
    fn duplicate_selection_merges_to_whole_hunk() {
        let store = build_store(TWO_FILE_DIFF);
        let sha = store.hunks()[0].short_sha().to_string();
        let tokens = vec![
            ShaArg::parse(&format!("{sha}:1")).unwrap(),
            ShaArg::parse(&sha).unwrap(),
        ];
        let matched = resolve_selection(&store, &tokens, None, false).unwrap();
        assert_eq!(matched.len(), 1);
        assert!(matched[0].spec.is_none());
    }

    #[test]
    fn duplicate_sub_hunk_selections_concatenate_raw() {
        let store = build_store(TWO_FILE_DIFF);
        let sha = store.hunks()[0].short_sha().to_string();
        let tokens = vec![
            ShaArg::parse(&format!("{sha}:2")).unwrap(),
            ShaArg::parse(&format!("{sha}:1-2")).unwrap(),
        ];
        let matched = resolve_selection(&store, &tokens, None, false).unwrap();
        assert_eq!(matched.len(), 1);
        // Raw concatenation: unsorted and overlapping is allowed.
        assert_eq!(matched[0].spec.as_ref().unwrap().ranges, vec![(2, 2), (1, 2)]);
    }

    #[test]
    fn bulk_match_requires_all_or_file() {
        let store = build_store(TWO_FILE_DIFF);
        assert!(matches!(
            resolve_selection(&store, &[], None, false),
            Err(SelectError::Empty)
        ));
        let all = resolve_selection(&store, &[], None, true).unwrap();
        assert_eq!(all.len(), 2);
        let scoped = resolve_selection(&store, &[], Some("a.txt"), false).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].hunk.file_path, "a.txt");
    }

    #[test]
    fn touched_paths_dedupes_in_order() {
        let store = build_store(TWO_FILE_DIFF);
        let matched = resolve_selection(&store, &[], None, true).unwrap();
        assert_eq!(touched_paths(&matched), vec!["a.txt", "b.txt"]);
    }
}
