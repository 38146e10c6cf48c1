//! Mapping applied selections to their resulting target-side hashes.
//!
//! After a successful apply, the caller is told which input hashes produced
//! which new target-side hashes, and which pre-existing target hashes were
//! absorbed along the way.

use std::collections::HashSet;

use crate::core::{Hunk, LineSpec, MatchedHunk};

/// One reported outcome line.
#[derive(Debug, Clone)]
pub struct ResultGroup {
    /// File the group belongs to.
    pub file_path: String,
    /// Applied input hashes, in order, with their optional line specs.
    pub applied: Vec<(String, Option<LineSpec>)>,
    /// Pre-existing target hashes merged into the result.
    pub absorbed: Vec<String>,
    /// Resulting target hashes. Empty when the result could not be
    /// resolved; more than one when a sub-hunk split occurred.
    pub results: Vec<String>,
}

/// Closed-range overlap over `(start, count)` pairs.
///
/// A count of zero (pure insertion or deletion) spans one line for
/// intersection purposes. Symmetric by construction.
pub fn ranges_overlap(s1: u32, c1: u32, s2: u32, c2: u32) -> bool {
    let e1 = s1 + c1.max(1) - 1;
    let e2 = s2 + c2.max(1) - 1;
    s1 <= e2 && s2 <= e1
}

/// Build result groups from the selection and the target-side hunk lists
/// captured before (`old_target`) and after (`new_target`) the apply.
///
/// Hunks are matched `O(inputs x outputs)`: byte-identical `diff_lines`
/// first (whole-hunk inputs only), then `(new_start, new_count)` overlap;
/// consumed target hunks attach by `(old_start, old_count)` overlap.
/// Orphan groups left by a sub-hunk split fold into the first group for
/// the same file that has applied inputs, so the user sees one line per
/// intent with a list of result hashes.
pub fn build_result_groups(
    inputs: &[MatchedHunk<'_>],
    old_target: &[Hunk<'_>],
    new_target: &[Hunk<'_>],
) -> Vec<ResultGroup> {
    let old_shas: HashSet<&str> = old_target.iter().map(|h| h.sha_hex.as_str()).collect();
    let new_shas: HashSet<&str> = new_target.iter().map(|h| h.sha_hex.as_str()).collect();

    let consumed: Vec<&Hunk<'_>> = old_target
        .iter()
        .filter(|h| !new_shas.contains(h.sha_hex.as_str()))
        .collect();
    let created: Vec<&Hunk<'_>> = new_target
        .iter()
        .filter(|h| !old_shas.contains(h.sha_hex.as_str()))
        .collect();

    let mut input_used = vec![false; inputs.len()];
    let mut consumed_used = vec![false; consumed.len()];
    let mut groups: Vec<ResultGroup> = Vec::new();

    for made in &created {
        let mut group = ResultGroup {
            file_path: made.file_path.to_string(),
            applied: Vec::new(),
            absorbed: Vec::new(),
            results: vec![made.short_sha().to_string()],
        };
        // Identity first: unrelated hunks can share line ranges, bytes
        // cannot lie.
        let hit = inputs
            .iter()
            .enumerate()
            .find(|(i, input)| {
                !input_used[*i]
                    && input.hunk.file_path == made.file_path
                    && input.spec.is_none()
                    && input.hunk.diff_lines == made.diff_lines
            })
            .or_else(|| {
                inputs.iter().enumerate().find(|(i, input)| {
                    !input_used[*i]
                        && input.hunk.file_path == made.file_path
                        && ranges_overlap(
                            input.hunk.new_start,
                            input.hunk.new_count,
                            made.new_start,
                            made.new_count,
                        )
                })
            });
        if let Some((i, input)) = hit {
            input_used[i] = true;
            group
                .applied
                .push((input.hunk.short_sha().to_string(), input.spec.clone()));
        }
        for (j, old) in consumed.iter().enumerate() {
            if consumed_used[j] || old.file_path != made.file_path {
                continue;
            }
            if ranges_overlap(old.old_start, old.old_count, made.old_start, made.old_count) {
                consumed_used[j] = true;
                group.absorbed.push(old.short_sha().to_string());
            }
        }
        groups.push(group);
    }

    // Inputs that matched nothing: applied, but result unknown.
    for (i, input) in inputs.iter().enumerate() {
        if !input_used[i] {
            groups.push(ResultGroup {
                file_path: input.hunk.file_path.to_string(),
                applied: vec![(input.hunk.short_sha().to_string(), input.spec.clone())],
                absorbed: Vec::new(),
                results: Vec::new(),
            });
        }
    }

    // A sub-hunk split leaves later fragments in groups with results but no
    // applied inputs; fold those into the intent that produced them.
    let mut i = 0;
    while i < groups.len() {
        if groups[i].applied.is_empty() && !groups[i].results.is_empty() {
            let target = groups
                .iter()
                .position(|g| g.file_path == groups[i].file_path && !g.applied.is_empty());
            if let Some(mut j) = target {
                let orphan = groups.remove(i);
                if j > i {
                    j -= 1;
                }
                groups[j].results.extend(orphan.results);
                groups[j].absorbed.extend(orphan.absorbed);
                continue;
            }
        }
        i += 1;
    }

    groups
}
