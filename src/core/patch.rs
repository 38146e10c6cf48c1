//! Combined-patch synthesis from a matched-hunk selection.
//!
//! Whole-hunk selections copy the parsed bytes verbatim; sub-hunk
//! selections rewrite the body line by line and synthesize a fresh `@@`
//! header. The output must round-trip through `git apply --unidiff-zero`.

use thiserror::Error;

use crate::core::{Hunk, LineSpec, MatchedHunk};

/// Errors from patch synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatchError {
    /// A line spec deselected every change in the hunk.
    #[error("no changes in selected lines of hunk {0}")]
    NoSelectedChanges(String),
}

/// Emit a combined unified patch for the selection.
///
/// The selection must already be in `(file_path, old_start)` order; each
/// file's patch header is emitted once, followed by its hunks.
pub fn build_patch(matched: &[MatchedHunk<'_>]) -> Result<Vec<u8>, PatchError> {
    let mut out = String::new();
    let mut current_file: Option<&str> = None;
    for m in matched {
        if current_file != Some(m.hunk.file_path.as_ref()) {
            out.push_str(&m.hunk.patch_header);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            current_file = Some(m.hunk.file_path.as_ref());
        }
        match &m.spec {
            None => {
                out.push_str(m.hunk.raw_lines);
                if !m.hunk.raw_lines.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Some(spec) => out.push_str(&rewrite_hunk(m.hunk, spec)?),
        }
    }
    Ok(out.into_bytes())
}

/// Rewrite one hunk body under a line spec.
///
/// Deselected removals demote to context (they still exist on both sides);
/// deselected additions are dropped; `\ No newline` markers survive only
/// behind a kept line. Counts are recomputed from what was actually
/// emitted.
fn rewrite_hunk(hunk: &Hunk<'_>, spec: &LineSpec) -> Result<String, PatchError> {
    let mut body = String::new();
    let mut old_count = 0u32;
    let mut new_count = 0u32;
    let mut changes = 0u32;
    let mut change_index = 0u32;
    let mut prev_kept = false;

    for line in hunk.body_lines() {
        match line.as_bytes().first() {
            Some(b'+') => {
                change_index += 1;
                if spec.contains(change_index) {
                    body.push_str(line);
                    body.push('\n');
                    new_count += 1;
                    changes += 1;
                    prev_kept = true;
                } else {
                    prev_kept = false;
                }
            }
            Some(b'-') => {
                change_index += 1;
                if spec.contains(change_index) {
                    body.push_str(line);
                    body.push('\n');
                    old_count += 1;
                    changes += 1;
                } else {
                    body.push(' ');
                    body.push_str(&line[1..]);
                    body.push('\n');
                    old_count += 1;
                    new_count += 1;
                }
                prev_kept = true;
            }
            Some(b'\\') => {
                if prev_kept {
                    body.push_str(line);
                    body.push('\n');
                }
            }
            _ => {
                body.push_str(line);
                body.push('\n');
                old_count += 1;
                new_count += 1;
                prev_kept = true;
            }
        }
    }

    if changes == 0 {
        return Err(PatchError::NoSelectedChanges(hunk.short_sha().to_string()));
    }

    let mut out = format!(
        "@@ -{},{} +{},{} @@",
        hunk.old_start, old_count, hunk.new_start, new_count
    );
    if !hunk.context.is_empty() {
        out.push(' ');
        out.push_str(hunk.context);
    }
    out.push('\n');
    out.push_str(&body);
    Ok(out)
}
